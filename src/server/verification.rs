//! # CAPTCHA Verification
//!
//! Checks a client-supplied proof token against the external verification
//! service (reCAPTCHA `siteverify` compatible).
//!
//! ## Contract
//!
//! - The token and the server-held secret are sent as a form-encoded POST
//! - A token is accepted only when the service reports `success: true` and,
//!   when a `score` is returned, the score meets the configured minimum
//! - Transport failures and timeouts surface as [`VerifyError`]; the caller
//!   treats them as a failed verification (fail closed)
//!
//! The [`CaptchaVerifier`] trait is the seam tests use to substitute a fake.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::config::VerificationConfig;
use super::retry::{RetryPolicy, Transient};

/// Outcome of a verification call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted { score: Option<f64> },
    Rejected { reason: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification service timed out")]
    Timeout,

    #[error("verification service unreachable: {0}")]
    Transport(String),

    #[error("verification service returned status {0}")]
    Status(u16),

    #[error("verification response could not be decoded: {0}")]
    Decode(String),
}

impl Transient for VerifyError {
    fn is_transient(&self) -> bool {
        match self {
            VerifyError::Timeout | VerifyError::Transport(_) => true,
            VerifyError::Status(status) => *status >= 500,
            VerifyError::Decode(_) => false,
        }
    }
}

/// Verifies a single-use CAPTCHA token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError>;
}

/// Body returned by the `siteverify` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

impl SiteVerifyResponse {
    /// Applies the acceptance rule: success, and a returned score at or above `min_score`.
    pub fn verdict(&self, min_score: f64) -> Verdict {
        if !self.success {
            let reason = if self.error_codes.is_empty() {
                "service reported failure".to_string()
            } else {
                self.error_codes.join(", ")
            };
            return Verdict::Rejected { reason };
        }

        match self.score {
            Some(score) if score < min_score => Verdict::Rejected {
                reason: format!("score {score} below threshold {min_score}"),
            },
            score => Verdict::Accepted { score },
        }
    }
}

/// [`CaptchaVerifier`] backed by the reCAPTCHA HTTP API.
pub struct RecaptchaVerifier {
    http: reqwest::Client,
    verify_url: String,
    secret: String,
    min_score: f64,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RecaptchaVerifier {
    pub fn new(http: reqwest::Client, config: &VerificationConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            verify_url: config.verify_url.clone(),
            secret: config.secret.clone(),
            min_score: config.min_score,
            timeout: Duration::from_secs(config.timeout_secs),
            retry,
        }
    }

    async fn call(&self, token: &str) -> Result<SiteVerifyResponse, VerifyError> {
        let response = self
            .http
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        response
            .json::<SiteVerifyResponse>()
            .await
            .map_err(|e| VerifyError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError> {
        let response = self
            .retry
            .run(
                "reCAPTCHA verification",
                self.timeout,
                || VerifyError::Timeout,
                || self.call(token),
            )
            .await?;

        debug!(
            "siteverify: success={} score={:?} action={:?} hostname={:?}",
            response.success, response.score, response.action, response.hostname
        );

        Ok(response.verdict(self.min_score))
    }
}
