//! Runtime profiler capability.
//!
//! The admin server never profiles anything itself. Dump routes and the two
//! sampling-rate routes forward to a [`Profiler`], which tests can replace
//! with a fake.

mod runtime;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use runtime::RuntimeProfiler;

/// Default CPU profile duration.
pub const DEFAULT_PROFILE_DURATION: Duration = Duration::from_secs(30);

/// Default execution trace duration.
pub const DEFAULT_TRACE_DURATION: Duration = Duration::from_secs(1);

/// What to dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRequest {
    /// Listing of available profiles.
    Index,
    /// Command line of the running process.
    Cmdline,
    /// CPU profile collected over `duration`.
    Cpu { duration: Duration },
    /// Symbol lookup for program counters. Empty means "report table size".
    Symbol { addresses: Vec<u64> },
    /// Execution trace collected over `duration`.
    Trace { duration: Duration },
    /// A named profile such as `heap` or `threads`.
    Named { name: String },
}

/// Profile dump ready to be written to a response.
#[derive(Debug, Clone)]
pub struct Profile {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Profile {
    /// Plain-text profile.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }
}

/// Profiler errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("profile unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Process-wide profiling capability.
#[async_trait]
pub trait Profiler: Send + Sync + 'static {
    /// Produce a profile dump.
    async fn dump(&self, request: ProfileRequest) -> Result<Profile, ProfileError>;

    /// Set the block-profile sampling rate. Callers pass 0 to disable.
    fn set_block_profile_rate(&self, rate: i64);

    /// Set the mutex-profile sampling fraction. Callers pass 0 to disable.
    fn set_mutex_profile_fraction(&self, fraction: i64);
}

/// Shared profiler handle as stored in the admin route table.
pub type SharedProfiler = Arc<dyn Profiler>;
