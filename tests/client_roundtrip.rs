mod support;

use std::time::Duration;

use portfolio_contact::client::{ContactClient, ContactForm, Outcome};
use portfolio_contact::SubmissionRequest;

use support::{spawn_app, FakeMailer, FakeVerdict, FakeVerifier};

fn form_for(endpoint: String) -> ContactForm<ContactClient> {
    let client = ContactClient::new(endpoint, Duration::from_secs(5)).unwrap();
    ContactForm::new(client)
}

fn fill(form: &ContactForm<ContactClient>, email: &str) {
    form.set_name("Ada");
    form.set_email(email);
    form.set_message("Hello! I would love to chat about your last project.");
    form.captcha_completed("tok1");
}

#[tokio::test]
async fn successful_submit_clears_form() {
    let mailer = FakeMailer::working();
    let addr = spawn_app(FakeVerifier::new(FakeVerdict::Accept(Some(0.9))), mailer.clone()).await;
    let form = form_for(format!("http://{addr}/api/contact"));
    fill(&form, "ada@x.com");

    let outcome = form.submit().await;

    assert_eq!(outcome, Outcome::Sent);
    assert_eq!(form.snapshot(), SubmissionRequest::default());
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn server_rejection_shows_server_message() {
    let mailer = FakeMailer::working();
    let addr = spawn_app(FakeVerifier::new(FakeVerdict::Reject), mailer.clone()).await;
    let form = form_for(format!("http://{addr}/api/contact"));
    fill(&form, "ada@x.com");
    let before = form.snapshot();

    let outcome = form.submit().await;

    assert_eq!(
        outcome,
        Outcome::Failed("reCAPTCHA validation failed. Please try again.".to_string())
    );
    assert_eq!(form.snapshot(), before);
    assert!(!form.is_submitting());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn downstream_failure_shows_generic_message() {
    let addr = spawn_app(
        FakeVerifier::new(FakeVerdict::Accept(Some(0.9))),
        FakeMailer::broken(),
    )
    .await;
    let form = form_for(format!("http://{addr}/api/contact"));
    fill(&form, "ada@x.com");

    let outcome = form.submit().await;

    assert_eq!(
        outcome.message(),
        "Internal server error. Please try again later."
    );
}

#[tokio::test]
async fn unreachable_server_uses_fallback() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let form = form_for(format!("http://{addr}/api/contact"));
    fill(&form, "ada@x.com");

    let outcome = form.submit().await;

    assert_eq!(outcome, Outcome::Failed("Failed to send message".to_string()));
    assert_eq!(form.snapshot().name, "Ada");
}

#[tokio::test]
async fn locally_invalid_form_never_reaches_server() {
    let verifier = FakeVerifier::new(FakeVerdict::Accept(Some(0.9)));
    let addr = spawn_app(verifier.clone(), FakeMailer::working()).await;
    let form = form_for(format!("http://{addr}/api/contact"));
    fill(&form, "not-an-email");

    let outcome = form.submit().await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert_eq!(outcome.message(), "email: Invalid email");
    assert_eq!(verifier.calls(), 0);
}
