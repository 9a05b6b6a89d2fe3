//! DTOs for the link edit endpoint.

use serde::Deserialize;
use validator::Validate;

/// Partial edit of an existing link.
///
/// Omitted fields are left unchanged. A new keyword re-runs the same
/// sanitize/reserved checks as creation.
#[derive(Debug, Deserialize, Validate)]
pub struct EditLinkRequest {
    #[validate(length(min = 1, max = 199))]
    pub keyword: Option<String>,

    #[validate(length(min = 1))]
    pub url: Option<String>,

    #[validate(length(max = 1000))]
    pub title: Option<String>,
}
