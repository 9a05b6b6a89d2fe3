//! Handler for link creation.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::net::SocketAddr;
use tracing::info;
use validator::Validate;

use crate::api::client_meta::{client_ip, is_trusted};
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::CreateRequest;
use crate::error::ShortenerError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten` with `{url, keyword?, title?}`.
///
/// # Response
///
/// Always the creation envelope `{status, code, message, ...}`:
/// - `created` (201) - a new link
/// - `url_exists` (200) - duplicate URL, the existing link is returned
/// - failure codes with the matching HTTP status otherwise
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<ShortenRequest>,
) -> impl IntoResponse {
    if let Err(validation) = request.validate() {
        let error = ShortenerError::InvalidRequest {
            reason: validation.to_string(),
        };
        return (error.status_code(), Json(ShortenResponse::failure(&error)));
    }

    let create_request = CreateRequest {
        url: request.url,
        keyword: request.keyword,
        title: request.title,
        ip: client_ip(&headers, peer, state.behind_proxy),
        trusted: is_trusted(&headers, state.admin_token.as_deref()),
    };

    match state.link_service.create(create_request).await {
        Ok(outcome) => {
            let link = outcome.link();
            info!(keyword = %link.keyword, "short link ready");

            let status = match &outcome {
                crate::application::services::CreateOutcome::Created(_) => StatusCode::CREATED,
                crate::application::services::CreateOutcome::Existing(_) => StatusCode::OK,
            };
            let body = ShortenResponse::from_outcome(&outcome, state.link_service.base_url());
            (status, Json(body))
        }
        Err(error) => (error.status_code(), Json(ShortenResponse::failure(&error))),
    }
}
