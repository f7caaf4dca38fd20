//! Admin API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::profiler::{
    Profile, ProfileError, ProfileRequest, DEFAULT_PROFILE_DURATION, DEFAULT_TRACE_DURATION,
};

use super::server::AdminState;
use super::validate::{validate_and_normalize, TlsConnectionInfo};
use super::AdminError;

/// `?seconds=` query for timed profiles.
#[derive(Debug, Default, Deserialize)]
pub struct SecondsQuery {
    pub seconds: Option<String>,
}

impl SecondsQuery {
    /// Requested duration, or `default` when absent, malformed or not positive.
    fn duration_or(&self, default: Duration) -> Duration {
        self.seconds
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(default)
    }
}

fn profile_response(result: Result<Profile, ProfileError>) -> Response {
    match result {
        Ok(profile) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, profile.content_type),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            profile.body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "profile dump failed");
            e.into_response()
        }
    }
}

fn reject(route: &'static str, error: AdminError) -> Response {
    warn!(route, reason = error.reason(), error = %error, "rejected admin request");
    metrics::counter!("debugserver.admin.rejected", "route" => route, "reason" => error.reason())
        .increment(1);
    error.into_response()
}

/// GET /debug/pprof/
pub async fn pprof_index(State(state): State<Arc<AdminState>>) -> Response {
    profile_response(state.profiler.dump(ProfileRequest::Index).await)
}

/// GET /debug/pprof
pub async fn pprof_index_redirect() -> Redirect {
    Redirect::permanent("/debug/pprof/")
}

/// GET /debug/pprof/cmdline
pub async fn pprof_cmdline(State(state): State<Arc<AdminState>>) -> Response {
    profile_response(state.profiler.dump(ProfileRequest::Cmdline).await)
}

/// GET /debug/pprof/profile?seconds=N
pub async fn pprof_profile(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<SecondsQuery>,
) -> Response {
    let duration = query.duration_or(DEFAULT_PROFILE_DURATION);
    profile_response(state.profiler.dump(ProfileRequest::Cpu { duration }).await)
}

/// GET|POST /debug/pprof/symbol
///
/// A POST body lists program counters as `+`-separated hex words.
pub async fn pprof_symbol(
    State(state): State<Arc<AdminState>>,
    method: Method,
    body: Bytes,
) -> Response {
    let addresses = if method == Method::POST {
        parse_addresses(&body)
    } else {
        Vec::new()
    };
    profile_response(state.profiler.dump(ProfileRequest::Symbol { addresses }).await)
}

/// GET /debug/pprof/trace?seconds=N
pub async fn pprof_trace(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<SecondsQuery>,
) -> Response {
    let duration = query.duration_or(DEFAULT_TRACE_DURATION);
    profile_response(state.profiler.dump(ProfileRequest::Trace { duration }).await)
}

/// GET /debug/pprof/{name}
pub async fn pprof_named(
    State(state): State<Arc<AdminState>>,
    Path(name): Path<String>,
) -> Response {
    profile_response(state.profiler.dump(ProfileRequest::Named { name }).await)
}

/// POST /log-level
pub async fn log_level_handler(
    State(state): State<Arc<AdminState>>,
    method: Method,
    tls: Option<Extension<TlsConnectionInfo>>,
    body: Bytes,
) -> Response {
    let tls = tls.as_ref().map(|Extension(info)| info);
    match validate_and_normalize(&method, tls, &body) {
        Ok(level) => {
            state.sink.set_min_level(level);
            metrics::counter!("debugserver.log_level.changes").increment(1);
            info!(level = %level, "log level changed");
            (StatusCode::OK, format!("/log-level was invoked with Level: {level}\n")).into_response()
        }
        Err(e) => reject("/log-level", e),
    }
}

/// ANY /block-profile-rate
pub async fn block_profile_rate_handler(
    State(state): State<Arc<AdminState>>,
    body: Bytes,
) -> Response {
    match parse_rate(&body) {
        Ok(rate) => {
            state.profiler.set_block_profile_rate(rate);
            info!(rate, "block profile rate changed");
            StatusCode::OK.into_response()
        }
        Err(e) => reject("/block-profile-rate", e),
    }
}

/// ANY /mutex-profile-fraction
pub async fn mutex_profile_fraction_handler(
    State(state): State<Arc<AdminState>>,
    body: Bytes,
) -> Response {
    match parse_rate(&body) {
        Ok(fraction) => {
            state.profiler.set_mutex_profile_fraction(fraction);
            info!(fraction, "mutex profile fraction changed");
            StatusCode::OK.into_response()
        }
        Err(e) => reject("/mutex-profile-fraction", e),
    }
}

/// Parse a sampling rate. Values at or below zero mean "disabled" and come
/// back as 0.
fn parse_rate(body: &[u8]) -> Result<i64, AdminError> {
    let text = String::from_utf8_lossy(body.trim_ascii());
    let rate: i64 = text.parse()?;
    Ok(rate.max(0))
}

fn parse_addresses(body: &[u8]) -> Vec<u64> {
    String::from_utf8_lossy(body)
        .split('+')
        .filter_map(|word| {
            let word = word.trim();
            let hex = word.strip_prefix("0x").unwrap_or(word);
            u64::from_str_radix(hex, 16).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate(b"100").unwrap(), 100);
        assert_eq!(parse_rate(b"1\n").unwrap(), 1);
        assert_eq!(parse_rate(b"0").unwrap(), 0);
        assert_eq!(parse_rate(b"-5").unwrap(), 0);
        assert!(matches!(parse_rate(b"fast"), Err(AdminError::BadRateValue(_))));
        assert!(matches!(parse_rate(b""), Err(AdminError::BadRateValue(_))));
        assert!(matches!(parse_rate(b"1.5"), Err(AdminError::BadRateValue(_))));
    }

    #[test]
    fn test_seconds_query() {
        let default = Duration::from_secs(30);
        let query = |s: &str| SecondsQuery {
            seconds: Some(s.to_string()),
        };

        assert_eq!(SecondsQuery::default().duration_or(default), default);
        assert_eq!(query("5").duration_or(default), Duration::from_secs(5));
        assert_eq!(query("0.5").duration_or(default), Duration::from_millis(500));
        assert_eq!(query("0").duration_or(default), default);
        assert_eq!(query("-1").duration_or(default), default);
        assert_eq!(query("soon").duration_or(default), default);
    }

    #[test]
    fn test_parse_addresses() {
        assert_eq!(parse_addresses(b"0x10+0x20"), vec![0x10, 0x20]);
        assert_eq!(parse_addresses(b"ff+junk+0x1"), vec![0xff, 0x1]);
        assert!(parse_addresses(b"").is_empty());
    }
}
