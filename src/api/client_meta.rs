//! Client metadata extraction from request headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP for flood control and click logging.
///
/// Behind a trusted proxy the first `X-Forwarded-For` entry (or `X-Real-IP`)
/// wins; otherwise the peer socket address is authoritative and forwarding
/// headers are ignored, since any client can set them.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}

/// Whether the request carries the configured admin bearer token.
///
/// Trusted callers are exempt from flood control only; this is not an
/// authentication layer.
pub fn is_trusted(headers: &HeaderMap, admin_token: Option<&str>) -> bool {
    let Some(expected) = admin_token else {
        return false;
    };

    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected)
}
