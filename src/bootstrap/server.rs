use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::admin::DebugServer;
use crate::config::Config;
use crate::profiler::{Profiler, RuntimeProfiler};
use crate::sink::{ReconfigurableSink, SharedSink};

use super::shutdown::wait_for_signal;

/// Host process wrapper around the debug server.
///
/// Applies the configured sampling rates, starts the debug server when an
/// address is configured, and stops it on SIGINT/SIGTERM.
pub struct Server {
    /// Configuration
    config: Config,

    /// Sink reconfigured by `/log-level`
    sink: SharedSink,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, sink: impl ReconfigurableSink) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
        }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let span = info_span!("debugserver", version = env!("CARGO_PKG_VERSION"));
        self.serve().instrument(span).await
    }

    async fn serve(self) -> Result<()> {
        let profiler = RuntimeProfiler::new();
        profiler.set_block_profile_rate(self.config.profiling.block_profile_rate);
        profiler.set_mutex_profile_fraction(self.config.profiling.mutex_profile_fraction);

        info!(
            block_profile_rate = RuntimeProfiler::block_profile_rate(),
            mutex_profile_fraction = RuntimeProfiler::mutex_profile_fraction(),
            "profiler sampling configured"
        );

        let address = self.config.admin.address.clone();
        if address.is_empty() {
            info!("no debug address configured, debug server disabled");
            return Ok(());
        }

        let handle = DebugServer::new(address.clone(), self.sink)
            .with_profiler(profiler)
            .with_ready_timeout(self.config.admin.ready_timeout)
            .run()
            .await
            .with_context(|| format!("failed to start debug server on {address}"))?;

        info!(address = %handle.local_addr(), "debug server started");

        wait_for_signal()
            .await
            .context("failed to install signal handlers")?;

        handle.shutdown().await.context("debug server failed")?;

        info!("debug server stopped");
        Ok(())
    }
}
