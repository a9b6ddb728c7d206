//! # Field Validation
//!
//! Rules shared by the contact form and the submission handler. The handler
//! is the authoritative check; the form applies the same rules so a browser
//! user sees the error before anything leaves the machine.
//!
//! Validation is a step that returns a tagged result: either a
//! [`ValidSubmission`] holding the trimmed fields, or the first
//! [`FieldError`] found.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use super::messages::SubmissionRequest;

/// Minimum message length in characters, counted after trimming.
pub const MIN_MESSAGE_CHARS: usize = 30;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Returns true when `email` has the shape `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
        .is_match(email)
}

/// Returns true when the trimmed message has at least [`MIN_MESSAGE_CHARS`] characters.
pub fn meets_min_length(message: &str) -> bool {
    message.trim().chars().count() >= MIN_MESSAGE_CHARS
}

/// Form fields in the order they appear on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
    VerificationToken,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
            Field::VerificationToken => "recaptchaToken",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(Field),

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("message has {actual} characters, at least {min} required")]
    MessageTooShort { min: usize, actual: usize },
}

/// Fields that passed validation, trimmed. Line breaks inside the message are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SubmissionRequest {
    /// Validates name, email and message against the schema.
    ///
    /// The verification token is not checked here; it is consumed by the
    /// verification step before the fields are looked at.
    ///
    /// # Order
    /// 1. All of `name`, `email`, `message` must be non-empty after trimming
    /// 2. `email` must match the address pattern
    /// 3. `message` must have at least [`MIN_MESSAGE_CHARS`] characters
    pub fn validate(&self) -> Result<ValidSubmission, FieldError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        for (field, value) in [
            (Field::Name, name),
            (Field::Email, email),
            (Field::Message, message),
        ] {
            if value.is_empty() {
                return Err(FieldError::Missing(field));
            }
        }

        if !is_valid_email(email) {
            return Err(FieldError::InvalidEmail);
        }

        if !meets_min_length(message) {
            return Err(FieldError::MessageTooShort {
                min: MIN_MESSAGE_CHARS,
                actual: message.chars().count(),
            });
        }

        Ok(ValidSubmission {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}
