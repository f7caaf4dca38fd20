//! Writer-backed sink with an atomic minimum level.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use crate::level::LogLevel;

use super::ReconfigurableSink;

/// Minimum level value that lets nothing through.
const SILENT: u8 = LogLevel::Fatal.ordinal() + 1;

/// Sink that writes `level: message` lines to `W` when the line's level is at
/// or above the current minimum.
pub struct LevelSink<W> {
    min_level: AtomicU8,
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> LevelSink<W> {
    /// Create a sink that lets through `min_level` and above.
    pub fn new(writer: W, min_level: LogLevel) -> Self {
        Self {
            min_level: AtomicU8::new(min_level.ordinal()),
            writer: Mutex::new(writer),
        }
    }

    /// Create a sink that drops everything until a level is set.
    pub fn silent(writer: W) -> Self {
        Self {
            min_level: AtomicU8::new(SILENT),
            writer: Mutex::new(writer),
        }
    }

    /// Current minimum level, `None` while silent.
    pub fn min_level(&self) -> Option<LogLevel> {
        LogLevel::from_ordinal(self.min_level.load(Ordering::Acquire))
    }

    /// Whether a line at `level` would be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.ordinal() >= self.min_level.load(Ordering::Acquire)
    }

    /// Write `message` at `level`. Lines below the minimum are dropped.
    pub fn log(&self, level: LogLevel, message: &[u8]) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(level.name().as_bytes())?;
        writer.write_all(b": ")?;
        writer.write_all(message)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send + 'static> ReconfigurableSink for LevelSink<W> {
    fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level.ordinal(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_sink_drops_everything() {
        let sink = LevelSink::silent(Vec::new());
        assert_eq!(sink.min_level(), None);

        for level in LogLevel::ALL {
            sink.log(level, b"dropped").unwrap();
        }
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_min_level_filters() {
        let sink = LevelSink::new(Vec::new(), LogLevel::Warn);

        sink.log(LogLevel::Info, b"quiet").unwrap();
        sink.log(LogLevel::Warn, b"loud").unwrap();
        sink.log(LogLevel::Fatal, b"louder").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "warn: loud\nfatal: louder\n");
    }

    #[test]
    fn test_set_min_level_takes_effect() {
        let sink = LevelSink::silent(Vec::new());

        sink.set_min_level(LogLevel::Debug);
        assert_eq!(sink.min_level(), Some(LogLevel::Debug));
        assert!(sink.enabled(LogLevel::Debug));

        sink.set_min_level(LogLevel::Fatal);
        assert!(!sink.enabled(LogLevel::Error));
        assert!(sink.enabled(LogLevel::Fatal));

        // idempotent
        sink.set_min_level(LogLevel::Fatal);
        assert_eq!(sink.min_level(), Some(LogLevel::Fatal));
    }
}
