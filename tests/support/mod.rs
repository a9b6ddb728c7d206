#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use portfolio_contact::server::config::ServerInfo;
use portfolio_contact::server::mailer::{EmailMessage, MailError, Mailer};
use portfolio_contact::server::verification::{CaptchaVerifier, Verdict, VerifyError};
use portfolio_contact::server::{build_router, AppState, ContactService};

pub const OWNER: &str = "owner@example.com";
pub const FROM: &str = "Portfolio Contact <onboarding@resend.dev>";

#[derive(Debug, Clone, Copy)]
pub enum FakeVerdict {
    Accept(Option<f64>),
    Reject,
    Outage,
}

/// Verification fake that records every token it is asked about.
pub struct FakeVerifier {
    verdict: FakeVerdict,
    tokens: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn new(verdict: FakeVerdict) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptchaVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError> {
        self.tokens.lock().unwrap().push(token.to_string());
        match self.verdict {
            FakeVerdict::Accept(score) => Ok(Verdict::Accepted { score }),
            FakeVerdict::Reject => Ok(Verdict::Rejected {
                reason: "invalid-input-response".to_string(),
            }),
            FakeVerdict::Outage => Err(VerifyError::Transport("connection refused".to_string())),
        }
    }
}

/// Mail fake that keeps every message it is handed.
pub struct FakeMailer {
    fail: bool,
    attempts: AtomicU32,
    sent: Mutex<Vec<EmailMessage>>,
}

impl FakeMailer {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            attempts: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            attempts: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MailError::Rejected {
                status: 403,
                body: "domain not verified".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn server_info(static_dir: Option<&str>, allowed_origins: &[&str]) -> ServerInfo {
    ServerInfo {
        bind_address: "127.0.0.1:0".to_string(),
        static_dir: static_dir.map(str::to_string),
        allowed_origins: allowed_origins.iter().map(|o| o.to_string()).collect(),
    }
}

/// Starts the contact app on an ephemeral port with the given fakes.
pub async fn spawn_app(verifier: Arc<FakeVerifier>, mailer: Arc<FakeMailer>) -> SocketAddr {
    spawn_app_with(verifier, mailer, &server_info(None, &[])).await
}

/// Same as [`spawn_app`] with an explicit `[server]` section.
pub async fn spawn_app_with(
    verifier: Arc<FakeVerifier>,
    mailer: Arc<FakeMailer>,
    info: &ServerInfo,
) -> SocketAddr {
    let service = ContactService::new(verifier, mailer, FROM, OWNER);
    let app = build_router(AppState::new(service), info);

    spawn_router(app).await
}

/// Serves any router on an ephemeral port.
pub async fn spawn_router(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    addr
}

pub fn valid_payload() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada",
        "email": "ada@x.com",
        "message": "A".repeat(30),
        "recaptchaToken": "tok1"
    })
}
