pub mod config;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod retry;
pub mod server;
pub mod verification;

pub use config::ServerConfig;
pub use error::ContactError;
pub use middleware::{build_router, AppState};
pub use server::ContactService;
