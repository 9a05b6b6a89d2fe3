//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use std::net::SocketAddr;
use tracing::{debug, error, warn};

use crate::api::client_meta::client_ip;
use crate::application::services::Resolution;
use crate::domain::click_event::ClickEvent;
use crate::error::ShortenerError;
use crate::state::AppState;

/// Redirects a keyword to its target URL.
///
/// # Endpoint
///
/// `GET /{keyword}`
///
/// # Request Flow
///
/// 1. Canonicalize the keyword against the configured alphabet
/// 2. Check cache for the target
/// 3. On cache miss, resolve through the link service (reserved keywords
///    hand off instead of redirecting)
/// 4. Asynchronously update cache
/// 5. Send a click event to the background worker
/// 6. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click events go over a bounded channel; if the queue is full the click is
/// dropped and counted, never blocking the redirect.
pub async fn redirect_handler(
    Path(raw_keyword): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Response, ShortenerError> {
    let keyword = state.link_service.canonical_keyword(&raw_keyword);
    if keyword.is_empty() {
        return Err(ShortenerError::NotFound);
    }

    let long_url = match state.cache.get_target(&keyword).await {
        Ok(Some(cached_url)) => {
            debug!("Cache HIT for {}", keyword);
            cached_url
        }
        other => {
            if let Err(e) = other {
                error!("Cache error: {}", e);
            }

            match state.link_service.resolve(&keyword).await? {
                Resolution::Redirect(link) => {
                    // Fire-and-forget cache fill.
                    let cache = state.cache.clone();
                    let cache_keyword = link.keyword.clone();
                    let url = link.long_url.clone();
                    tokio::spawn(async move {
                        if let Err(e) = cache.set_target(&cache_keyword, &url, None).await {
                            error!("Failed to cache target: {}", e);
                        }
                    });

                    link.long_url
                }
                Resolution::Reserved => {
                    // Reserved routes belong to the surrounding application.
                    return Err(ShortenerError::NotFound);
                }
                Resolution::NotFound => return Err(ShortenerError::NotFound),
            }
        }
    };

    let click_event = ClickEvent::new(
        keyword,
        Some(client_ip(&headers, peer, state.behind_proxy)),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    if state.click_sender.try_send(click_event).is_err() {
        metrics::counter!("clicks_dropped").increment(1);
        warn!("click queue full, dropping event");
    }

    Ok(Redirect::temporary(&long_url).into_response())
}
