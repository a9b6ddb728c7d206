//! # Email Dispatch
//!
//! Composes the owner notification for a validated submission and hands it to
//! the external email service (Resend-compatible HTTP API).
//!
//! The destination mailbox always comes from server configuration; nothing
//! the client sends can change where the email goes. The sender's address is
//! only used as `reply_to`.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::config::EmailConfig;
use super::retry::{RetryPolicy, Transient};
use crate::common::validation::ValidSubmission;

/// A fully composed email, serialized as the email service's JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl EmailMessage {
    /// Builds the notification sent to the site owner.
    ///
    /// - Subject: `New message from {name} ({email})`
    /// - Text body: name, email and message, line breaks kept as-is
    /// - HTML body: same content, HTML-escaped, line breaks rendered as `<br>`
    pub fn notification(submission: &ValidSubmission, from: &str, to: &str) -> Self {
        let ValidSubmission {
            name,
            email,
            message,
        } = submission;

        let text = format!("Name: {name}\nEmail: {email}\n\nMessage:\n{message}\n");

        let html_message = message
            .lines()
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br>");
        let html = format!(
            "<h1>New Contact Form Submission</h1>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <div>{}</div>\n",
            escape_html(name),
            escape_html(email),
            html_message
        );

        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("New message from {name} ({email})"),
            text,
            html,
            reply_to: Some(email.clone()),
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email service timed out")]
    Timeout,

    #[error("email service unreachable: {0}")]
    Transport(String),

    #[error("email service rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl Transient for MailError {
    fn is_transient(&self) -> bool {
        match self {
            MailError::Timeout | MailError::Transport(_) => true,
            MailError::Rejected { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// Delivers a composed message to its mailbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// [`Mailer`] backed by the Resend `POST /emails` API.
pub struct ResendMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ResendMailer {
    pub fn new(http: reqwest::Client, config: &EmailConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            retry,
        }
    }

    async fn call(&self, message: &EmailMessage) -> Result<Option<String>, MailError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // The id is informational; an unexpected body is not a failed send.
        Ok(response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.id))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let id = self
            .retry
            .run(
                "email dispatch",
                self.timeout,
                || MailError::Timeout,
                || self.call(message),
            )
            .await?;

        info!(
            "📧 Email accepted by service (id: {})",
            id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(message: &str) -> ValidSubmission {
        ValidSubmission {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_notification_subject_and_addresses() {
        let email = EmailMessage::notification(
            &submission(&"A".repeat(30)),
            "Portfolio Contact <onboarding@resend.dev>",
            "owner@example.com",
        );

        assert_eq!(email.subject, "New message from Ada (ada@x.com)");
        assert_eq!(email.from, "Portfolio Contact <onboarding@resend.dev>");
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.reply_to.as_deref(), Some("ada@x.com"));
    }

    #[test]
    fn test_text_body_keeps_line_breaks() {
        let email = EmailMessage::notification(
            &submission("first line\nsecond line"),
            "from@x.com",
            "to@x.com",
        );

        assert!(email.text.contains("Name: Ada"));
        assert!(email.text.contains("Email: ada@x.com"));
        assert!(email.text.contains("first line\nsecond line"));
    }

    #[test]
    fn test_html_body_breaks_and_escapes() {
        let email = EmailMessage::notification(
            &submission("<script>alert('x')</script>\nbye & thanks"),
            "from@x.com",
            "to@x.com",
        );

        assert!(email.html.contains("<p><strong>Name:</strong> Ada</p>"));
        assert!(email
            .html
            .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;<br>bye &amp; thanks"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn test_serialized_body_matches_email_api() {
        let email = EmailMessage::notification(&submission("hello"), "from@x.com", "to@x.com");
        let value = serde_json::to_value(&email).unwrap();

        for key in ["from", "to", "subject", "text", "html", "reply_to"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let rejected = |status| MailError::Rejected {
            status,
            body: String::new(),
        };

        assert!(!rejected(422).is_transient());
        assert!(!rejected(401).is_transient());
        assert!(rejected(429).is_transient());
        assert!(rejected(502).is_transient());
        assert!(MailError::Timeout.is_transient());
    }
}
