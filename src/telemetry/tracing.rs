use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
    Registry,
};

use crate::level::LogLevel;
use crate::sink::ReconfigurableSink;

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name
    pub service_name: String,

    /// Initial log level, any `/log-level` token
    pub log_level: String,

    /// JSON log format
    pub json_logs: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "debugserver".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Map a level onto the tracing filter that lets it through.
///
/// tracing has no fatal level, so `Fatal` turns output off.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Fatal => LevelFilter::OFF,
    }
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::default().add_directive(level_filter(level).into())
}

/// Sink over the process-wide tracing filter.
///
/// Setting a level replaces the whole filter, including any per-target
/// directives that came from `RUST_LOG`.
#[derive(Clone)]
pub struct TracingSink {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl TracingSink {
    pub fn new(handle: reload::Handle<EnvFilter, Registry>) -> Self {
        Self { handle }
    }

    /// Current filter, rendered as directives.
    pub fn current_filter(&self) -> Option<String> {
        self.handle.with_current(|filter| filter.to_string()).ok()
    }
}

impl ReconfigurableSink for TracingSink {
    fn set_min_level(&self, level: LogLevel) {
        if let Err(e) = self.handle.reload(env_filter(level)) {
            warn!(error = %e, level = %level, "failed to reload log filter");
        }
    }
}

/// Initialize tracing with a reloadable filter.
///
/// `RUST_LOG` wins over the configured level at startup. The returned sink
/// is what `/log-level` reconfigures.
pub fn init_tracing(config: &TracingConfig) -> Result<TracingSink> {
    let level: LogLevel = config
        .log_level
        .parse()
        .with_context(|| format!("invalid log level: {}", config.log_level))?;

    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy();
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry().with(filter);

    // Add format layer (JSON or pretty)
    if config.json_logs {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true);
        subscriber
            .with(fmt_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;
    } else {
        let fmt_layer = fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true);
        subscriber
            .with(fmt_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;
    }

    info!(
        service = %config.service_name,
        log_level = %level,
        json_logs = config.json_logs,
        "tracing initialized"
    );

    Ok(TracingSink::new(handle))
}
