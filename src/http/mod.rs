//! HTTP server module.
//!
//! The server includes:
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Static file serving from the configured public directory

mod server;
mod shutdown;
pub mod static_files;

pub use server::{start_server, ServerError};
