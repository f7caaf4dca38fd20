//! Admin HTTP API using Axum.
//!
//! Provides endpoints for:
//! - Profile dumps (/debug/pprof/, cmdline, profile, symbol, trace, named profiles)
//! - Log level changes (/log-level)
//! - Sampling rates (/block-profile-rate, /mutex-profile-fraction)

mod error;
mod handlers;
mod server;
mod validate;

pub use error::AdminError;
pub use server::{
    run, AdminState, DebugServer, ServerHandle, ServerState, DEFAULT_READY_TIMEOUT,
};
pub use validate::{validate_and_normalize, TlsConnectionInfo};
