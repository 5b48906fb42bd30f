//! Execution modes
//!
//! - Server mode (HTTP server, default)
//! - CLI mode (one-shot commands)

pub mod cli;
pub mod server;

pub use server::{MAX_PAYLOAD_BYTES, configure_app, run_server};
