//! Preconditions for `/log-level` writes.
//!
//! Checks run in a fixed order (method, transport, emptiness, content) so a
//! malformed request always reports the most structural problem first.

use axum::http::Method;

use crate::level::LogLevel;

use super::AdminError;

/// Marker for requests that arrived over TLS.
///
/// The admin server itself only speaks plaintext. A TLS terminator mounted in
/// front of the router inserts this as a request extension, and `/log-level`
/// then refuses the request.
#[derive(Debug, Clone, Default)]
pub struct TlsConnectionInfo {
    /// SNI name presented by the client, if any.
    pub server_name: Option<String>,
}

/// Validate a `/log-level` request and parse its body.
pub fn validate_and_normalize(
    method: &Method,
    tls: Option<&TlsConnectionInfo>,
    body: &[u8],
) -> Result<LogLevel, AdminError> {
    if *method != Method::POST {
        return Err(AdminError::MethodNotAllowed(method.clone()));
    }

    if tls.is_some() {
        return Err(AdminError::InvalidScheme);
    }

    Ok(LogLevel::parse(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::ParseLevelError;

    #[test]
    fn test_post_plaintext_valid() {
        let level = validate_and_normalize(&Method::POST, None, b"DEBUG").unwrap();
        assert_eq!(level, LogLevel::Debug);
    }

    #[test]
    fn test_method_checked_first() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let tls = TlsConnectionInfo::default();
            let err = validate_and_normalize(&method, Some(&tls), b"").unwrap_err();
            assert!(matches!(err, AdminError::MethodNotAllowed(_)));
            assert!(err.to_string().contains("method not allowed"));
        }
    }

    #[test]
    fn test_tls_rejected_before_body() {
        let tls = TlsConnectionInfo {
            server_name: Some("admin.internal".to_string()),
        };

        let err = validate_and_normalize(&Method::POST, Some(&tls), b"debug").unwrap_err();
        assert!(err.to_string().contains("invalid scheme"));

        let err = validate_and_normalize(&Method::POST, Some(&tls), b"garbage").unwrap_err();
        assert!(matches!(err, AdminError::InvalidScheme));
    }

    #[test]
    fn test_empty_then_content() {
        let err = validate_and_normalize(&Method::POST, None, b"").unwrap_err();
        assert!(matches!(err, AdminError::Level(ParseLevelError::EmptyLevel)));

        let err = validate_and_normalize(&Method::POST, None, b"invalid").unwrap_err();
        assert!(matches!(err, AdminError::Level(ParseLevelError::UnrecognizedLevel(_))));
    }
}
