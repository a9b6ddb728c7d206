//! # Wire Messages
//!
//! Defines the JSON bodies exchanged between the contact form and the
//! submission endpoint:
//! - [`SubmissionRequest`]: the four form fields posted by the client
//! - [`SuccessResponse`]: acknowledgment returned when the email went out
//! - [`ErrorResponse`]: single human-readable error string for every failure
//!
//! Field names follow the browser form (`recaptchaToken`), with
//! `verificationToken` accepted as an alias for non-browser clients.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// REQUEST
// ============================================================================

/// **Submission Request**
///
/// Transient entity built by the client from user input and consumed exactly
/// once by the handler. Never persisted.
///
/// # Fields
/// - `name`: Sender name (required)
/// - `email`: Sender address, must look like `local@domain.tld` (required)
/// - `message`: Message body, at least 30 characters (required)
/// - `verification_token`: Single-use CAPTCHA proof token (required)
///
/// Absent or `null` fields decode as empty strings so that a missing field is
/// reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(
        rename = "recaptchaToken",
        alias = "verificationToken",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub verification_token: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Body of a `2xx` response: `{ "success": true }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of every `4xx`/`5xx` response: `{ "error": "<message>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
