use serde::Deserialize;
use std::time::Duration;

/// Root configuration for the debug server binary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Admin server configuration
    #[serde(default)]
    pub admin: AdminConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Initial profiler sampling rates
    #[serde(default)]
    pub profiling: ProfilingConfig,
}

/// Admin server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// `host:port` to serve on; empty disables the server
    #[serde(default)]
    pub address: String,

    /// How long to wait for the listener to bind
    #[serde(default = "default_ready_timeout", with = "humantime_serde")]
    pub ready_timeout: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            ready_timeout: default_ready_timeout(),
        }
    }
}

fn default_ready_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Initial log level (debug, info, warn, error, fatal or a short form)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable structured JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Profiler sampling rates applied at startup (0 = disabled)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilingConfig {
    #[serde(default)]
    pub block_profile_rate: i64,

    #[serde(default)]
    pub mutex_profile_fraction: i64,
}

/// Humantime serde support module
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
