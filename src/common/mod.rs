//! # Common Components
//!
//! Shared utilities and data structures used by both client and server components.
//!
//! ## Modules
//!
//! - [`messages`]: JSON bodies exchanged between the contact form and the endpoint
//! - [`validation`]: Field rules applied on both sides of the wire
//! - [`config`]: Configuration parsing utilities
//! - [`logging`]: Logger setup shared by the binaries

pub mod config;
pub mod logging;
pub mod messages;
pub mod validation;
