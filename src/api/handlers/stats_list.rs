//! Handler for the ordered link listing.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{LinkSummary, ListQueryParams, ListResponse};
use crate::error::ShortenerError;
use crate::state::AppState;

/// Lists links ordered by the requested filter, with global totals.
///
/// # Endpoint
///
/// `GET /api/stats?filter=top|bottom|last|random&limit=&start=`
pub async fn stats_list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<ListResponse>, ShortenerError> {
    let (order, limit, start) = params
        .validate_and_resolve()
        .map_err(|reason| ShortenerError::InvalidRequest { reason })?;

    let links = state.stats_service.list_links(order, limit, start).await?;
    let counts = state.stats_service.global_counts().await?;

    let base_url = state.link_service.base_url();

    Ok(Json(ListResponse {
        links: links
            .iter()
            .map(|l| LinkSummary::from_link(l, base_url))
            .collect(),
        total_links: counts.total_links,
        total_clicks: counts.total_clicks,
    }))
}
