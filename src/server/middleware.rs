//! # Server Middleware - HTTP Surface
//!
//! Wraps the [`ContactService`] core in an axum application:
//!
//! ## Routes
//!
//! | Method | Path           | Purpose                                   |
//! |--------|----------------|-------------------------------------------|
//! | POST   | `/api/contact` | Submit the contact form                   |
//! | GET    | `/api/health`  | Liveness probe                            |
//! | GET    | `/*`           | Static portfolio frontend (if configured) |
//!
//! ## Responsibilities
//! - Decode the JSON body; any undecodable body is a `400`
//! - Tag each submission with a request id for the logs
//! - Map [`ContactError`] to `{ "error": ... }` with `400`/`500`
//! - Build the real collaborators from configuration and run the listener
//!   until Ctrl+C / SIGTERM

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use uuid::Uuid;

use super::config::{ServerConfig, ServerInfo};
use super::error::ContactError;
use super::mailer::ResendMailer;
use super::server::ContactService;
use super::verification::RecaptchaVerifier;
use crate::common::messages::{SubmissionRequest, SuccessResponse};

/// Shared handler state. Immutable; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContactService>,
}

impl AppState {
    pub fn new(service: ContactService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Builds the application router.
///
/// # Arguments
/// - `state`: Handler state holding the contact service
/// - `info`: `[server]` section (static directory, CORS origins)
pub fn build_router(state: AppState, info: &ServerInfo) -> Router {
    let api = Router::new()
        .route("/api/contact", post(contact_handler))
        .route("/api/health", get(health_check))
        .with_state(state);

    let app = match info.static_dir.as_deref() {
        Some(dir) if Path::new(dir).is_dir() => {
            info!("Serving frontend from {}", dir);
            api.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            warn!("Static directory {} not found, serving API only", dir);
            api
        }
        None => api,
    };

    app.layer(cors_layer(&info.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| warn!("Ignoring invalid CORS origin {}: {}", origin, e))
                .ok()
        })
        .collect();

    cors.allow_origin(origins)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "portfolio-contact"
    }))
}

async fn contact_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ContactError> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|rejection| {
        let cause = rejection.body_text();
        warn!("[{}] Malformed payload: {}", request_id, cause);
        ContactError::MalformedPayload(cause)
    })?;

    info!("[{}] 📨 Contact submission received", request_id);

    state.service.submit(request_id, request).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Builds the production collaborators from `config`.
pub fn build_service(config: &ServerConfig) -> Result<ContactService> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("portfolio-contact/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;

    let verifier = RecaptchaVerifier::new(http.clone(), &config.verification, config.retry);
    let mailer = ResendMailer::new(http, &config.email, config.retry);

    Ok(ContactService::new(
        Arc::new(verifier),
        Arc::new(mailer),
        config.email.from.clone(),
        config.email.to.clone(),
    ))
}

/// Runs the contact server until a shutdown signal arrives.
pub async fn serve(config: ServerConfig) -> Result<()> {
    info!("🚀 Initializing contact server...");

    let service = build_service(&config)?;
    let app = build_router(AppState::new(service), &config.server);

    let address = &config.server.bind_address;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("🌐 Contact server running on http://{}", address);
    info!("📡 API endpoint: http://{}/api/contact", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
