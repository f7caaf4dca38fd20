//! Request-scoped admin errors and their HTTP mapping.

use std::num::ParseIntError;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::level::ParseLevelError;
use crate::profiler::ProfileError;

/// Rejected admin request. Every variant is answered with 400.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("method not allowed: {0}, use POST")]
    MethodNotAllowed(Method),

    #[error("invalid scheme: https is not allowed")]
    InvalidScheme,

    #[error(transparent)]
    Level(#[from] ParseLevelError),

    #[error("{0}")]
    BadRateValue(#[from] ParseIntError),
}

impl AdminError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AdminError::MethodNotAllowed(_) => "method_not_allowed",
            AdminError::InvalidScheme => "invalid_scheme",
            AdminError::Level(ParseLevelError::EmptyLevel) => "empty_level",
            AdminError::Level(ParseLevelError::UnrecognizedLevel(_)) => "unrecognized_level",
            AdminError::BadRateValue(_) => "bad_rate_value",
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileError::UnknownProfile(_) => StatusCode::NOT_FOUND,
            ProfileError::Unavailable(_) => StatusCode::NOT_IMPLEMENTED,
            ProfileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
