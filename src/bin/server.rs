//! # Server Binary Entry Point
//!
//! Thin wrapper that loads configuration and runs the contact server.
//!
//! ## Usage
//!
//! ```bash
//! RECAPTCHA_SECRET_KEY=... RESEND_API_KEY=... \
//!   cargo run --bin server -- --config config/server.toml
//! ```

use clap::Parser;
use log::info;

use portfolio_contact::common::logging::init_logger;
use portfolio_contact::server::middleware::serve;
use portfolio_contact::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let config = ServerConfig::from_file(&args.config)?;
    config.validate()?;

    info!(
        "Loaded {} (notifications to {}, min score {})",
        args.config, config.email.to, config.verification.min_score
    );

    serve(config).await
}
