use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;
use tracing::info;

use debugserver::bootstrap::Server;
use debugserver::config::{add_flags, block_profile_rate, debug_address, Config};
use debugserver::telemetry::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(name = "debugserver")]
#[command(author, version, about = "Diagnostics endpoint with live log-level and profiling controls")]
struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Validate config and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = add_flags(Args::command()).get_matches();
    let args = Args::from_arg_matches(&matches)?;

    // Load configuration first (to get log settings)
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let debug_addr = debug_address(&matches);
    if !debug_addr.is_empty() {
        config.admin.address = debug_addr;
    }
    if let Some(rate) = block_profile_rate(&matches) {
        config.profiling.block_profile_rate = rate;
    }

    let tracing_config = TracingConfig {
        service_name: "debugserver".to_string(),
        log_level: config.telemetry.log_level.clone(),
        json_logs: config.telemetry.json_logs,
    };

    let sink = init_tracing(&tracing_config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        address = %config.admin.address,
        "starting debugserver"
    );

    // Validate only mode
    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    Server::new(config, sink).run().await
}
