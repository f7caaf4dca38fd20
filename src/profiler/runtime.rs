//! Built-in profiler backed by process statistics.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sysinfo::{Pid, System};
use tracing::debug;

use super::{Profile, ProfileError, ProfileRequest, Profiler};

static BLOCK_PROFILE_RATE: AtomicI64 = AtomicI64::new(0);
static MUTEX_PROFILE_FRACTION: AtomicI64 = AtomicI64::new(0);

/// Interval between samples in an execution trace.
const TRACE_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Named profiles and their one-line descriptions, as listed by the index.
const PROFILES: &[(&str, &str)] = &[
    ("block", "sampling configuration for blocking events"),
    ("heap", "resident and virtual memory of the process"),
    ("mutex", "sampling configuration for contended locks"),
    ("threads", "operating system threads of the process"),
];

const ENDPOINTS: &[(&str, &str)] = &[
    ("cmdline", "command line of the running program"),
    ("profile", "CPU usage sampled over ?seconds=N (default 30)"),
    ("symbol", "symbol table lookup for program counters"),
    ("trace", "periodic CPU and memory samples over ?seconds=N (default 1)"),
];

/// Profiler for the current process.
///
/// The sampling knobs are process-wide: every `RuntimeProfiler` reads and
/// writes the same two values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProfiler;

impl RuntimeProfiler {
    pub fn new() -> Self {
        Self
    }

    /// Current block-profile rate (0 = disabled).
    pub fn block_profile_rate() -> i64 {
        BLOCK_PROFILE_RATE.load(Ordering::Relaxed)
    }

    /// Current mutex-profile fraction (0 = disabled).
    pub fn mutex_profile_fraction() -> i64 {
        MUTEX_PROFILE_FRACTION.load(Ordering::Relaxed)
    }

    fn index() -> Profile {
        let mut out = String::from("/debug/pprof/\n\nprofiles:\n");
        for (name, help) in PROFILES {
            let _ = writeln!(out, "  {name:<10} {help}");
        }
        out.push_str("\nendpoints:\n");
        for (name, help) in ENDPOINTS {
            let _ = writeln!(out, "  {name:<10} {help}");
        }
        Profile::text(out)
    }

    fn cmdline() -> Profile {
        let args: Vec<String> = std::env::args().collect();
        Profile::text(args.join("\0"))
    }

    async fn cpu(duration: Duration) -> Result<Profile, ProfileError> {
        let pid = current_pid()?;
        let mut system = System::new();
        system.refresh_process(pid);

        let started = Instant::now();
        tokio::time::sleep(duration).await;
        system.refresh_process(pid);

        let process = system
            .process(pid)
            .ok_or_else(|| ProfileError::Unavailable("process statistics".to_string()))?;

        let mut out = String::from("cpu profile\n");
        let _ = writeln!(out, "pid: {pid}");
        let _ = writeln!(out, "name: {}", process.name());
        let _ = writeln!(out, "duration: {:.3}s", started.elapsed().as_secs_f64());
        let _ = writeln!(out, "cpu_usage_percent: {:.2}", process.cpu_usage());
        let _ = writeln!(out, "run_time_seconds: {}", process.run_time());
        Ok(Profile::text(out))
    }

    fn symbol(addresses: &[u64]) -> Profile {
        // No runtime symbol table is available; lookups resolve nothing.
        debug!(addresses = addresses.len(), "symbol lookup requested");
        Profile::text("num_symbols: 0\n")
    }

    async fn trace(duration: Duration) -> Result<Profile, ProfileError> {
        let pid = current_pid()?;
        let mut system = System::new();
        system.refresh_process(pid);

        let started = Instant::now();
        let mut out = String::from("execution trace\n");
        let _ = writeln!(out, "pid: {pid}");
        let _ = writeln!(out, "interval: {}ms", TRACE_SAMPLE_INTERVAL.as_millis());

        let mut ticker = tokio::time::interval(TRACE_SAMPLE_INTERVAL);
        ticker.tick().await;
        while started.elapsed() < duration {
            ticker.tick().await;
            system.refresh_process(pid);
            if let Some(process) = system.process(pid) {
                let _ = writeln!(
                    out,
                    "t=+{:.3}s cpu={:.2}% rss={} virt={}",
                    started.elapsed().as_secs_f64(),
                    process.cpu_usage(),
                    process.memory(),
                    process.virtual_memory(),
                );
            }
        }
        Ok(Profile::text(out))
    }

    fn named(name: &str) -> Result<Profile, ProfileError> {
        match name {
            "block" => Ok(Profile::text(rate_profile(
                "block",
                "rate",
                Self::block_profile_rate(),
            ))),
            "mutex" => Ok(Profile::text(rate_profile(
                "mutex",
                "fraction",
                Self::mutex_profile_fraction(),
            ))),
            "heap" => heap(),
            "threads" => threads(),
            other => Err(ProfileError::UnknownProfile(other.to_string())),
        }
    }
}

#[async_trait]
impl Profiler for RuntimeProfiler {
    async fn dump(&self, request: ProfileRequest) -> Result<Profile, ProfileError> {
        match request {
            ProfileRequest::Index => Ok(Self::index()),
            ProfileRequest::Cmdline => Ok(Self::cmdline()),
            ProfileRequest::Cpu { duration } => Self::cpu(duration).await,
            ProfileRequest::Symbol { addresses } => Ok(Self::symbol(&addresses)),
            ProfileRequest::Trace { duration } => Self::trace(duration).await,
            ProfileRequest::Named { name } => Self::named(&name),
        }
    }

    fn set_block_profile_rate(&self, rate: i64) {
        BLOCK_PROFILE_RATE.store(rate.max(0), Ordering::Relaxed);
    }

    fn set_mutex_profile_fraction(&self, fraction: i64) {
        MUTEX_PROFILE_FRACTION.store(fraction.max(0), Ordering::Relaxed);
    }
}

fn current_pid() -> Result<Pid, ProfileError> {
    sysinfo::get_current_pid().map_err(|e| ProfileError::Unavailable(e.to_string()))
}

fn rate_profile(kind: &str, knob: &str, value: i64) -> String {
    if value == 0 {
        format!("{kind} profile: sampling disabled\n{knob}: 0\n")
    } else {
        format!("{kind} profile: sampling enabled\n{knob}: {value}\n")
    }
}

fn heap() -> Result<Profile, ProfileError> {
    let pid = current_pid()?;
    let mut system = System::new();
    system.refresh_process(pid);
    let process = system
        .process(pid)
        .ok_or_else(|| ProfileError::Unavailable("process statistics".to_string()))?;

    Ok(Profile::text(format!(
        "heap profile\nresident_bytes: {}\nvirtual_bytes: {}\n",
        process.memory(),
        process.virtual_memory(),
    )))
}

#[cfg(target_os = "linux")]
fn threads() -> Result<Profile, ProfileError> {
    let mut threads = Vec::new();
    for entry in std::fs::read_dir("/proc/self/task")? {
        let entry = entry?;
        let tid = entry.file_name().to_string_lossy().into_owned();
        let comm = std::fs::read_to_string(entry.path().join("comm")).unwrap_or_default();
        threads.push((tid, comm.trim().to_string()));
    }
    threads.sort();

    let mut out = format!("threads profile: total {}\n", threads.len());
    for (tid, name) in threads {
        let _ = writeln!(out, "{tid} {name}");
    }
    Ok(Profile::text(out))
}

#[cfg(not(target_os = "linux"))]
fn threads() -> Result<Profile, ProfileError> {
    Err(ProfileError::Unavailable(
        "thread listing is only supported on linux".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(profile: &Profile) -> String {
        String::from_utf8(profile.body.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_index_lists_profiles() {
        let profile = RuntimeProfiler.dump(ProfileRequest::Index).await.unwrap();
        let text = body(&profile);
        for (name, _) in PROFILES.iter().chain(ENDPOINTS) {
            assert!(text.contains(name), "index missing {name}");
        }
    }

    #[tokio::test]
    async fn test_cmdline_contains_program() {
        let profile = RuntimeProfiler.dump(ProfileRequest::Cmdline).await.unwrap();
        let program = std::env::args().next().unwrap();
        assert!(body(&profile).starts_with(&program));
    }

    #[tokio::test]
    async fn test_unknown_named_profile() {
        let err = RuntimeProfiler
            .dump(ProfileRequest::Named { name: "nope".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::UnknownProfile(ref name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_symbol_table_is_empty() {
        let profile = RuntimeProfiler
            .dump(ProfileRequest::Symbol { addresses: vec![0x1234] })
            .await
            .unwrap();
        assert_eq!(body(&profile), "num_symbols: 0\n");
    }

    #[tokio::test]
    async fn test_short_cpu_profile() {
        let profile = RuntimeProfiler
            .dump(ProfileRequest::Cpu { duration: Duration::from_millis(10) })
            .await
            .unwrap();
        assert!(body(&profile).starts_with("cpu profile\n"));
    }

    // Single test for both knobs: they are process-wide.
    #[tokio::test]
    async fn test_knobs_normalize_and_report() {
        let profiler = RuntimeProfiler::new();

        profiler.set_block_profile_rate(-5);
        assert_eq!(RuntimeProfiler::block_profile_rate(), 0);
        profiler.set_block_profile_rate(7);
        assert_eq!(RuntimeProfiler::block_profile_rate(), 7);

        let profile = profiler
            .dump(ProfileRequest::Named { name: "block".to_string() })
            .await
            .unwrap();
        assert!(body(&profile).contains("rate: 7"));

        profiler.set_mutex_profile_fraction(0);
        assert_eq!(RuntimeProfiler::mutex_profile_fraction(), 0);
        profiler.set_mutex_profile_fraction(3);
        assert_eq!(RuntimeProfiler::mutex_profile_fraction(), 3);

        profiler.set_block_profile_rate(0);
        profiler.set_mutex_profile_fraction(0);
    }
}
