//! # Client Middleware
//!
//! This module contains the form layer that sits between user input and the
//! [`SubmissionTransport`].
//!
//! ## Responsibilities
//!
//! The [`ContactForm`] struct owns everything the page does around a submit:
//! - **Field state**: name, email, message and the CAPTCHA token
//! - **Local validation**: blocks the submit and reports the first failing
//!   field; no network call is made
//! - **Duplicate protection**: only one request may be in flight; a submit
//!   while one is pending is refused
//! - **Outcome handling**: on success clears every field and the single-use
//!   token; on failure keeps the fields so the user can correct and resend
//!
//! There is no automatic retry. A failed submission needs a new submit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = ContactClient::new(config.client.endpoint.clone(), timeout)?;
//! let form = ContactForm::new(client);
//!
//! form.set_name("Ada");
//! form.set_email("ada@x.com");
//! form.set_message("...");
//! form.captcha_completed("token-from-widget");
//!
//! let outcome = form.submit().await;
//! println!("{}", outcome.message());
//! ```

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::client::SubmissionTransport;
use crate::common::config::load_config;
use crate::common::messages::SubmissionRequest;
use crate::common::validation::{is_valid_email, meets_min_length, Field};

pub const SUCCESS_MESSAGE: &str = "Message sent successfully!";
pub const BUSY_MESSAGE: &str = "A submission is already in progress";

const REQUIRED: &str = "Required";
const INVALID_EMAIL: &str = "Invalid email";
const MESSAGE_TOO_SHORT: &str = "Minimum 30 characters";
const CAPTCHA_REQUIRED: &str = "Please complete the CAPTCHA";
const CAPTCHA_ERRORED: &str = "CAPTCHA verification failed";

/// Client configuration loaded from TOML file.
///
/// # Example TOML
///
/// ```toml
/// [client]
/// endpoint = "http://127.0.0.1:3000/api/contact"
/// timeout_secs = 15
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Full URL of the contact endpoint
    pub endpoint: String,
    /// Upper bound for one submission request (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl ClientConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}

/// Inline error attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: Field,
    pub message: &'static str,
}

/// Result of one [`ContactForm::submit`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the submission; the form was cleared
    Sent,
    /// Local validation failed; nothing was sent
    Invalid(FormError),
    /// The server rejected the submission or could not be reached
    Failed(String),
    /// Another submission is still in flight
    Busy,
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent)
    }

    /// Notification text for the user.
    pub fn message(&self) -> String {
        match self {
            Outcome::Sent => SUCCESS_MESSAGE.to_string(),
            Outcome::Invalid(error) => format!("{}: {}", error.field, error.message),
            Outcome::Failed(message) => message.clone(),
            Outcome::Busy => BUSY_MESSAGE.to_string(),
        }
    }
}

/// Clears the in-flight flag however the submit ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Contact form state plus the submit workflow.
///
/// All methods take `&self` so the form can be shared (e.g. behind an `Arc`)
/// between the code reacting to input and the code driving the submit.
pub struct ContactForm<T: SubmissionTransport> {
    transport: T,
    values: Mutex<SubmissionRequest>,
    field_error: Mutex<Option<FormError>>,
    submitting: AtomicBool,
}

impl<T: SubmissionTransport> ContactForm<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            values: Mutex::new(SubmissionRequest::default()),
            field_error: Mutex::new(None),
            submitting: AtomicBool::new(false),
        }
    }

    fn values(&self) -> MutexGuard<'_, SubmissionRequest> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_field_error(&self, error: Option<FormError>) {
        *self
            .field_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = error;
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.values().name = name.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.values().email = email.into();
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.values().message = message.into();
    }

    /// The CAPTCHA widget produced a token. Any inline CAPTCHA error is dropped.
    pub fn captcha_completed(&self, token: impl Into<String>) {
        self.values().verification_token = token.into();

        let mut field_error = self
            .field_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if matches!(&*field_error, Some(error) if error.field == Field::VerificationToken) {
            *field_error = None;
        }
    }

    /// The token expired before it was used.
    pub fn captcha_expired(&self) {
        self.values().verification_token.clear();
    }

    /// The CAPTCHA widget itself failed.
    pub fn captcha_errored(&self) {
        self.values().verification_token.clear();
        self.set_field_error(Some(FormError {
            field: Field::VerificationToken,
            message: CAPTCHA_ERRORED,
        }));
    }

    /// Snapshot of the current field values.
    pub fn snapshot(&self) -> SubmissionRequest {
        self.values().clone()
    }

    /// Inline error currently displayed, if any.
    pub fn field_error(&self) -> Option<FormError> {
        self.field_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// True while a request is in flight (the submit control is disabled).
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Applies the local rules in field order and returns the first failure.
    pub fn validate(&self) -> Result<SubmissionRequest, FormError> {
        let values = self.snapshot();
        let error = |field, message| Err(FormError { field, message });

        if values.name.trim().is_empty() {
            return error(Field::Name, REQUIRED);
        }
        if values.email.trim().is_empty() {
            return error(Field::Email, REQUIRED);
        }
        if !is_valid_email(values.email.trim()) {
            return error(Field::Email, INVALID_EMAIL);
        }
        if values.message.trim().is_empty() {
            return error(Field::Message, REQUIRED);
        }
        if !meets_min_length(&values.message) {
            return error(Field::Message, MESSAGE_TOO_SHORT);
        }
        if values.verification_token.trim().is_empty() {
            return error(Field::VerificationToken, CAPTCHA_REQUIRED);
        }

        Ok(values)
    }

    /// Validates and, if valid, sends exactly one request.
    ///
    /// # Returns
    ///
    /// * `Outcome::Sent` - Server accepted; all fields and the token are cleared
    /// * `Outcome::Invalid` - A local rule failed; no request was made
    /// * `Outcome::Failed` - Server or network error; fields are left intact
    /// * `Outcome::Busy` - Another submit is still pending
    ///
    /// After a server-side failure the kept token has usually been consumed,
    /// so the caller must run the CAPTCHA again before resubmitting.
    pub async fn submit(&self) -> Outcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Outcome::Busy;
        }
        let _in_flight = InFlight(&self.submitting);

        let request = match self.validate() {
            Ok(request) => request,
            Err(error) => {
                self.set_field_error(Some(error.clone()));
                return Outcome::Invalid(error);
            }
        };
        self.set_field_error(None);

        info!("Sending message...");

        match self.transport.post(&request).await {
            Ok(()) => {
                *self.values() = SubmissionRequest::default();
                info!("✅ {}", SUCCESS_MESSAGE);
                Outcome::Sent
            }
            Err(e) => {
                warn!("❌ Submission failed: {}", e);
                Outcome::Failed(e.user_message())
            }
        }
    }
}
