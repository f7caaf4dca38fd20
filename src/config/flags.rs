//! Command-line flags for the debug server address and block profiling.

use clap::{Arg, ArgMatches, Command};

/// Name of the flag holding the debug server address.
pub const DEBUG_FLAG: &str = "debugAddr";

/// Name of the flag holding the block profile sampling rate.
pub const BLOCK_PROFILE_RATE_FLAG: &str = "blockProfileRate";

/// Register `--debugAddr` and `--blockProfileRate` on `cmd`.
pub fn add_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new(DEBUG_FLAG)
            .long(DEBUG_FLAG)
            .value_name("HOST:PORT")
            .help("host:port for serving pprof debugging info")
            .default_value(""),
    )
    .arg(
        Arg::new(BLOCK_PROFILE_RATE_FLAG)
            .long(BLOCK_PROFILE_RATE_FLAG)
            .value_name("NANOS")
            .help("sample an average of one blocking event per rate nanoseconds spent blocked")
            .value_parser(clap::value_parser!(i64))
            .allow_negative_numbers(true),
    )
}

/// Value of `--debugAddr`, or `""` when unset or never registered.
pub fn debug_address(matches: &ArgMatches) -> String {
    matches
        .try_get_one::<String>(DEBUG_FLAG)
        .ok()
        .flatten()
        .cloned()
        .unwrap_or_default()
}

/// Value of `--blockProfileRate`, or `None` when unset or never registered.
pub fn block_profile_rate(matches: &ArgMatches) -> Option<i64> {
    matches
        .try_get_one::<i64>(BLOCK_PROFILE_RATE_FLAG)
        .ok()
        .flatten()
        .copied()
}
