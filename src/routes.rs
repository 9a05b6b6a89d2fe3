//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{keyword}`            - Short link redirect (public)
//! - `GET  /health`               - Health check: DB, cache, click queue
//! - `POST /api/shorten`          - Create a short link
//! - `GET  /api/stats`            - Ordered link listing + global counts
//! - `GET  /api/stats/{keyword}`  - Traffic report for one keyword
//! - `PUT  /api/links/{keyword}`  - Rename/edit a link
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging
//! - **Rate limiting** - per-IP token bucket on the API surface
//! - **Path normalization** - trailing slash handling

use axum::routing::{get, post, put};
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{
    edit_link_handler, health_handler, redirect_handler, shorten_handler, stats_handler,
    stats_list_handler,
};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// `behind_proxy` switches the rate limiter to forwarding-header key
/// extraction; enable only behind a trusted reverse proxy.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let api_router = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats", get(stats_list_handler))
        .route("/stats/{keyword}", get(stats_handler))
        .route("/links/{keyword}", put(edit_link_handler));

    let api_router = if behind_proxy {
        api_router.layer(rate_limit::proxy_layer())
    } else {
        api_router.layer(rate_limit::layer())
    };

    let router = Router::new()
        .route("/{keyword}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
