//! Handler for editing an existing link.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{error, info};
use validator::Validate;

use crate::api::dto::links::EditLinkRequest;
use crate::api::dto::stats::LinkSummary;
use crate::error::ShortenerError;
use crate::state::AppState;

/// Renames a link and/or updates its target URL and title.
///
/// # Endpoint
///
/// `PUT /api/links/{keyword}` with `{keyword?, url?, title?}`.
///
/// Keyword moves re-run the reservation and uniqueness checks; the old
/// keyword becomes allocatable again afterwards.
pub async fn edit_link_handler(
    State(state): State<AppState>,
    Path(old_keyword): Path<String>,
    Json(request): Json<EditLinkRequest>,
) -> Result<Json<LinkSummary>, ShortenerError> {
    request
        .validate()
        .map_err(|e| ShortenerError::InvalidRequest {
            reason: e.to_string(),
        })?;

    let old_keyword = state.link_service.canonical_keyword(&old_keyword);

    let link = state
        .link_service
        .rename(
            &old_keyword,
            request.keyword.as_deref(),
            request.url.as_deref(),
            request.title.as_deref(),
        )
        .await?;

    // Stale cache entries would keep redirecting the old keyword.
    if let Err(e) = state.cache.invalidate(&old_keyword).await {
        error!("Failed to invalidate cache for {}: {}", old_keyword, e);
    }

    info!(from = %old_keyword, to = %link.keyword, "link edited");

    Ok(Json(LinkSummary::from_link(
        &link,
        state.link_service.base_url(),
    )))
}
