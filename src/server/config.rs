//! # Server Configuration
//!
//! Loaded from a TOML file, then overlaid with secrets from the deployment
//! environment:
//!
//! | Variable               | Overrides                 |
//! |------------------------|---------------------------|
//! | `RECAPTCHA_SECRET_KEY` | `verification.secret`     |
//! | `RESEND_API_KEY`       | `email.api_key`           |
//! | `CONTACT_TO_EMAIL`     | `email.to`                |
//! | `CONTACT_BIND_ADDRESS` | `server.bind_address`     |
//!
//! # Example TOML
//!
//! ```toml
//! [server]
//! bind_address = "127.0.0.1:3000"
//! static_dir = "frontend/build"
//!
//! [verification]
//! min_score = 0.5
//! timeout_secs = 10
//!
//! [email]
//! from = "Portfolio Contact <onboarding@resend.dev>"
//! to = "owner@example.com"
//! timeout_secs = 10
//!
//! [retry]
//! max_attempts = 1
//! backoff_ms = 250
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;
use crate::common::config::{env_var, load_config};
use crate::common::validation::is_valid_email;

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_FROM: &str = "Portfolio Contact <onboarding@resend.dev>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: ServerInfo,
    #[serde(default)]
    pub verification: VerificationConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Listen address (e.g., "127.0.0.1:3000")
    pub bind_address: String,
    /// Pre-built frontend served at `/` when present
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Origins allowed to call the API cross-origin; empty allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Server-held secret; normally supplied through `RECAPTCHA_SECRET_KEY`
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    /// Normally supplied through `RESEND_API_KEY`
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_from")]
    pub from: String,
    /// Site owner's mailbox
    #[serde(default)]
    pub to: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

fn default_email_api_url() -> String {
    DEFAULT_EMAIL_API_URL.to_string()
}

fn default_from() -> String {
    DEFAULT_FROM.to_string()
}

fn default_min_score() -> f64 {
    0.5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            verify_url: default_verify_url(),
            secret: String::new(),
            min_score: default_min_score(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads the TOML file at `path` and applies environment overrides.
    pub fn from_file(path: &str) -> Result<Self> {
        let mut config: ServerConfig = load_config(path)?;
        config.apply_overrides(env_var);
        Ok(config)
    }

    /// Overlays values from `lookup` (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("RECAPTCHA_SECRET_KEY") {
            self.verification.secret = secret;
        }
        if let Some(api_key) = lookup("RESEND_API_KEY") {
            self.email.api_key = api_key;
        }
        if let Some(to) = lookup("CONTACT_TO_EMAIL") {
            self.email.to = to;
        }
        if let Some(address) = lookup("CONTACT_BIND_ADDRESS") {
            self.server.bind_address = address;
        }
    }

    /// Rejects configurations that could never deliver a message.
    pub fn validate(&self) -> Result<()> {
        if self.verification.secret.is_empty() {
            bail!("verification secret is not set (RECAPTCHA_SECRET_KEY)");
        }
        if self.email.api_key.is_empty() {
            bail!("email API key is not set (RESEND_API_KEY)");
        }
        if !is_valid_email(&self.email.to) {
            bail!("destination mailbox '{}' is not a valid address", self.email.to);
        }
        if !(0.0..=1.0).contains(&self.verification.min_score) {
            bail!(
                "verification.min_score must be within 0.0..=1.0, got {}",
                self.verification.min_score
            );
        }
        if self.verification.timeout_secs == 0 || self.email.timeout_secs == 0 {
            bail!("outbound timeouts must be at least one second");
        }
        Ok(())
    }
}
