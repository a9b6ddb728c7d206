pub mod client;
pub mod common;
pub mod server;

pub use common::messages::SubmissionRequest;
pub use server::ContactService;
