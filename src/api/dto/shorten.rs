//! DTOs for the link creation endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::CreateOutcome;
use crate::domain::entities::Link;
use crate::error::ShortenerError;

/// Request to shorten a URL, optionally under a chosen keyword.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,

    /// Optional custom keyword; sanitized against the configured alphabet.
    #[validate(length(max = 199))]
    pub keyword: Option<String>,

    /// Optional title; HTML-stripped before storage.
    #[validate(length(max = 1000))]
    pub title: Option<String>,
}

/// Creation result envelope: machine code plus human message, with link
/// details on success.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<i64>,
}

impl ShortenResponse {
    pub fn from_outcome(outcome: &CreateOutcome, base_url: &str) -> Self {
        match outcome {
            CreateOutcome::Created(link) => Self::success(
                "created",
                format!("Short link created: {}", link.keyword),
                link,
                base_url,
            ),
            CreateOutcome::Existing(link) => Self::success(
                "url_exists",
                format!("URL already shortened as: {}", link.keyword),
                link,
                base_url,
            ),
        }
    }

    pub fn failure(error: &ShortenerError) -> Self {
        let message = match error {
            ShortenerError::Storage(_) => "Storage failure".to_string(),
            other => other.to_string(),
        };

        Self {
            status: "fail",
            code: error.code(),
            message,
            short_url: None,
            keyword: None,
            title: None,
            clicks: None,
        }
    }

    fn success(code: &'static str, message: String, link: &Link, base_url: &str) -> Self {
        Self {
            status: "success",
            code,
            message,
            short_url: Some(link.short_url(base_url)),
            keyword: Some(link.keyword.clone()),
            title: Some(link.title.clone()),
            clicks: Some(link.clicks),
        }
    }
}
