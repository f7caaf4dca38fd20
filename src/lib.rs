//! Embeddable diagnostics endpoint.
//!
//! A host process starts a small HTTP server that exposes profiling dumps
//! under `/debug/pprof/` and live operational controls:
//!
//! - `/log-level` - change the minimum level of a [`sink::ReconfigurableSink`]
//! - `/block-profile-rate` - set the block-profile sampling rate
//! - `/mutex-profile-fraction` - set the mutex-profile sampling fraction
//!
//! ```no_run
//! # async fn demo() -> std::io::Result<()> {
//! use std::sync::Arc;
//! use debugserver::sink::LevelSink;
//!
//! let sink = Arc::new(LevelSink::silent(std::io::stderr()));
//! let handle = debugserver::run("127.0.0.1:17017", sink).await?;
//! // ...
//! handle.stop();
//! handle.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod bootstrap;
pub mod config;
pub mod level;
pub mod profiler;
pub mod sink;
pub mod telemetry;

pub use admin::{run, AdminError, DebugServer, ServerHandle, ServerState};
pub use config::{add_flags, block_profile_rate, debug_address, BLOCK_PROFILE_RATE_FLAG, DEBUG_FLAG};
pub use level::LogLevel;
