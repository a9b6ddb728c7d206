//! # Client Core
//!
//! This module contains the minimal core client that posts one submission to
//! the contact endpoint and reports what the server said.
//!
//! ## Responsibility
//!
//! The [`ContactClient`] struct does one thing:
//! - Send a [`SubmissionRequest`] as JSON to the configured endpoint
//! - Turn the response into `Ok(())` or a [`SubmitError`] carrying the
//!   server-supplied message
//!
//! It never retries. Field validation, duplicate-submit protection and
//! form reset are handled by the [`ContactForm`](super::middleware::ContactForm).

use async_trait::async_trait;
use log::{debug, error};
use std::time::Duration;
use thiserror::Error;

use crate::common::messages::{ErrorResponse, SubmissionRequest};

/// Message shown when the server gave no usable error text.
pub const FALLBACK_ERROR: &str = "Failed to send message";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("server responded with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("request failed: {0}")]
    Network(String),
}

impl SubmitError {
    /// Text to show the user: the server's `error` field, or the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => FALLBACK_ERROR.to_string(),
        }
    }
}

/// Sends a submission somewhere. Implemented over HTTP by [`ContactClient`].
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn post(&self, request: &SubmissionRequest) -> Result<(), SubmitError>;
}

/// HTTP client for the `/api/contact` endpoint.
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ContactClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the contact endpoint (e.g., "http://127.0.0.1:3000/api/contact")
    /// * `timeout` - Upper bound for the whole request
    ///
    /// # Errors
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionTransport for ContactClient {
    async fn post(&self, request: &SubmissionRequest) -> Result<(), SubmitError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Could not reach {}: {}", self.endpoint, e);
                SubmitError::Network(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.error);

        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
