use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::mailer::MailError;
use crate::common::messages::ErrorResponse;
use crate::common::validation::FieldError;

/// Every way a submission can fail, with the message shown to the end user.
///
/// Causes that only matter to the operator (upstream status codes, transport
/// errors) are logged where they occur and never rendered into the response.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Invalid request body")]
    MalformedPayload(String),

    #[error("reCAPTCHA validation failed. Please try again.")]
    VerificationFailed,

    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Message must be at least {min} characters")]
    MessageTooShort { min: usize },

    #[error("Internal server error. Please try again later.")]
    Dispatch(#[from] MailError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<FieldError> for ContactError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::Missing(_) => ContactError::MissingFields,
            FieldError::InvalidEmail => ContactError::InvalidEmail,
            FieldError::MessageTooShort { min, .. } => ContactError::MessageTooShort { min },
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}
