//! # Server Core - Contact Submission Pipeline
//!
//! The core server component does ONE thing: take a decoded submission and
//! either deliver exactly one email to the site owner or explain why not.
//!
//! ## Pipeline
//!
//! ```text
//! token present? -> verify token -> validate fields -> compose -> send
//! ```
//!
//! Each step short-circuits with a [`ContactError`]. Nothing is retried here
//! (the adapters apply their own [`RetryPolicy`](super::retry::RetryPolicy))
//! and nothing is remembered between submissions, so posting the same valid
//! payload twice sends two emails.
//!
//! HTTP concerns (routing, body decoding, status codes) live in the
//! [`middleware`](super::middleware) layer.

use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ContactError;
use super::mailer::{EmailMessage, Mailer};
use super::verification::{CaptchaVerifier, Verdict};
use crate::common::messages::SubmissionRequest;

/// Core contact service holding the injected external collaborators.
pub struct ContactService {
    verifier: Arc<dyn CaptchaVerifier>,
    mailer: Arc<dyn Mailer>,
    /// Sender shown on the notification (e.g., "Portfolio Contact <onboarding@resend.dev>")
    from: String,
    /// Site owner's mailbox; never taken from the request
    to: String,
}

impl ContactService {
    /// Create a new contact service.
    ///
    /// # Arguments
    /// - `verifier`: CAPTCHA verification collaborator
    /// - `mailer`: Email dispatch collaborator
    /// - `from`: Sender address for notifications
    /// - `to`: Destination mailbox
    ///
    /// # Example
    /// ```ignore
    /// let service = ContactService::new(verifier, mailer, DEFAULT_FROM, "me@example.com");
    /// ```
    pub fn new(
        verifier: Arc<dyn CaptchaVerifier>,
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            mailer,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Run one submission through the pipeline.
    ///
    /// # Arguments
    /// - `request_id`: Correlates the log lines of this submission
    /// - `request`: Decoded submission as posted by the client
    ///
    /// # Returns
    /// - `Ok(())`: The email service accepted exactly one notification
    /// - `Err(ContactError)`: The first failing step; no email was sent
    pub async fn submit(
        &self,
        request_id: Uuid,
        request: SubmissionRequest,
    ) -> Result<(), ContactError> {
        let token = request.verification_token.trim();
        if token.is_empty() {
            warn!("[{}] Rejected: no verification token", request_id);
            return Err(ContactError::VerificationFailed);
        }

        match self.verifier.verify(token).await {
            Ok(Verdict::Accepted { score }) => {
                info!("[{}] Token verified (score: {:?})", request_id, score);
            }
            Ok(Verdict::Rejected { reason }) => {
                warn!("[{}] Rejected: token failed verification ({})", request_id, reason);
                return Err(ContactError::VerificationFailed);
            }
            Err(e) => {
                error!("[{}] ❌ Verification service error: {}", request_id, e);
                return Err(ContactError::VerificationFailed);
            }
        }

        let submission = request.validate().map_err(|e| {
            warn!("[{}] Rejected: {}", request_id, e);
            ContactError::from(e)
        })?;

        let email = EmailMessage::notification(&submission, &self.from, &self.to);

        if let Err(e) = self.mailer.send(&email).await {
            error!("[{}] ❌ Email dispatch failed: {}", request_id, e);
            return Err(ContactError::Dispatch(e));
        }

        info!(
            "[{}] ✅ Message from {} <{}> delivered",
            request_id, submission.name, submission.email
        );
        Ok(())
    }
}
