//! # Client Components
//!
//! The client is split into two main components:
//!
//! ## Core Client ([`client`])
//! Posts one submission to the contact endpoint and reports the server's answer.
//!
//! ## Client Middleware ([`middleware`])
//! Manages everything around a submit:
//! - Field state and the CAPTCHA token
//! - Local validation (first failing field wins)
//! - One request in flight at a time
//! - Clearing the form on success, keeping it on failure

pub mod client;
pub mod middleware;

// Re-export for convenience
pub use client::{ContactClient, SubmissionTransport, SubmitError};
pub use middleware::{ClientConfig, ContactForm, Outcome};
