//! Crate-wide error type covering validation, allocation, and storage failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::url_normalizer::UrlNormalizationError;

/// Machine-readable error envelope returned by the HTTP layer.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// All failure modes of the shortening core.
///
/// Validation failures (`InvalidUrl`, `SelfReferential`, `KeywordUnavailable`,
/// `Throttled`) are resolved inside the service layer and surface to callers
/// as structured results; they never escape as panics. `Conflict` is the
/// storage-level unique-violation outcome of an atomic insert and is mapped
/// to a domain failure by the caller that attempted the write.
#[derive(Debug, thiserror::Error)]
pub enum ShortenerError {
    #[error("Invalid target URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Target is already a short link on this instance")]
    SelfReferential,

    #[error("Keyword '{keyword}' is reserved or already taken")]
    KeywordUnavailable { keyword: String },

    #[error("Too many new links from this address, retry in {retry_after}s")]
    Throttled { retry_after: u64 },

    #[error("Short link not found")]
    NotFound,

    #[error("Keyword already exists")]
    Conflict,

    #[error("Storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl ShortenerError {
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::SelfReferential => "self_referential",
            Self::KeywordUnavailable { .. } => "keyword_unavailable",
            Self::Throttled { .. } => "throttled",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage(_) => "storage_failure",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl { .. } | Self::InvalidRequest { .. } | Self::SelfReferential => {
                StatusCode::BAD_REQUEST
            }
            Self::KeywordUnavailable { .. } | Self::Conflict => StatusCode::CONFLICT,
            Self::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::KeywordUnavailable { keyword } => json!({ "keyword": keyword }),
            Self::Throttled { retry_after } => json!({ "retry_after": retry_after }),
            _ => json!({}),
        }
    }
}

impl IntoResponse for ShortenerError {
    fn into_response(self) -> Response {
        if let Self::Storage(ref source) = self {
            tracing::error!(error = %source, "storage failure surfaced to client");
        }

        // Storage details stay in the logs, not in the response body.
        let message = match self {
            Self::Storage(_) => "Storage failure".to_string(),
            ref other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code: self.code(),
                message,
                details: self.details(),
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<UrlNormalizationError> for ShortenerError {
    fn from(e: UrlNormalizationError) -> Self {
        Self::InvalidUrl {
            reason: e.to_string(),
        }
    }
}

/// Maps a database error to the domain, surfacing unique-constraint hits
/// as [`ShortenerError::Conflict`] so callers can react to lost insert races.
pub fn map_sqlx_error(e: sqlx::Error) -> ShortenerError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return ShortenerError::Conflict;
    }

    ShortenerError::storage(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ShortenerError::InvalidUrl { reason: "x".into() }.code(),
            "invalid_url"
        );
        assert_eq!(
            ShortenerError::KeywordUnavailable { keyword: "a".into() }.code(),
            "keyword_unavailable"
        );
        assert_eq!(ShortenerError::Throttled { retry_after: 3 }.code(), "throttled");
        assert_eq!(ShortenerError::NotFound.code(), "not_found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ShortenerError::Throttled { retry_after: 1 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ShortenerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ShortenerError::Conflict.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_url_error_conversion() {
        let err: ShortenerError = UrlNormalizationError::EmptyTarget.into();
        assert!(matches!(err, ShortenerError::InvalidUrl { .. }));
    }
}
