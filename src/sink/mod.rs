//! Reconfigurable log sinks.
//!
//! The admin server only ever changes the minimum level of a sink; it never
//! sees how the sink formats or buffers output.

mod writer;

use std::sync::Arc;

use crate::level::LogLevel;

pub use writer::LevelSink;

/// A log sink whose minimum level can be changed while the process runs.
///
/// Implementations must tolerate concurrent calls; the last write wins.
pub trait ReconfigurableSink: Send + Sync + 'static {
    /// Set the minimum level the sink lets through.
    fn set_min_level(&self, level: LogLevel);
}

impl<T: ReconfigurableSink + ?Sized> ReconfigurableSink for Arc<T> {
    fn set_min_level(&self, level: LogLevel) {
        (**self).set_min_level(level)
    }
}

/// Shared sink handle as stored in the admin route table.
pub type SharedSink = Arc<dyn ReconfigurableSink>;
