//! Handler for per-keyword traffic reports.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::stats::{TrafficQueryParams, TrafficResponse};
use crate::error::ShortenerError;
use crate::state::AppState;

/// Builds the traffic report for one keyword.
///
/// # Endpoint
///
/// `GET /api/stats/{keyword}?from=&to=` (RFC3339 bounds, both optional)
///
/// # Response
///
/// Daily histogram (gap-filled, peak-preserving thinning), trailing-24h
/// hourly buckets, best day, hits/day averages, referrer and country
/// breakdowns.
///
/// # Errors
///
/// Returns 404 if the keyword does not exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(raw_keyword): Path<String>,
    Query(params): Query<TrafficQueryParams>,
) -> Result<Json<TrafficResponse>, ShortenerError> {
    let keyword = state.link_service.canonical_keyword(&raw_keyword);

    // The report is keyed by the link, not by whatever is in the click log.
    let link = state.link_service.get(&keyword).await?;

    let report = state
        .stats_service
        .traffic_report(std::slice::from_ref(&link.keyword), params.from, params.to)
        .await?;

    Ok(Json(TrafficResponse::from_report(link.keyword, report)))
}
