//! # Client Binary Entry Point
//!
//! Submits the contact form from the command line, applying the same local
//! rules as the page before anything is sent.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- --config config/client.toml \
//!   --name "Ada" --email ada@example.com \
//!   --message "Hello! I'd like to talk about a project next week." \
//!   --token "<token from the CAPTCHA widget>"
//! ```

use anyhow::bail;
use clap::Parser;
use log::info;
use std::time::Duration;

use portfolio_contact::client::{ClientConfig, ContactClient, ContactForm};
use portfolio_contact::common::logging::init_logger;

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    #[arg(short, long, default_value = "config/client.toml")]
    config: String,

    /// Overrides the endpoint from the configuration file
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,

    /// CAPTCHA token obtained from the verification widget
    #[arg(long, default_value = "")]
    token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = ClientConfig::from_file(&args.config)?;

    let endpoint = args.endpoint.unwrap_or(config.client.endpoint);
    let client = ContactClient::new(endpoint, Duration::from_secs(config.client.timeout_secs))?;
    info!("📡 Contact endpoint: {}", client.endpoint());
    let form = ContactForm::new(client);

    form.set_name(args.name);
    form.set_email(args.email);
    form.set_message(args.message);
    if !args.token.is_empty() {
        form.captcha_completed(args.token);
    }

    let outcome = form.submit().await;
    println!("{}", outcome.message());

    if !outcome.is_sent() {
        bail!("submission not sent");
    }
    Ok(())
}
