//! Per-client rate limiting for link creation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::repositories::LinkRepository;
use crate::error::ShortenerError;

/// Throttles repeated link creation from a single client IP.
///
/// A pure read over existing link creation history: the most recent
/// `created_at` for the IP decides whether a new creation is allowed, so no
/// separate rate-limit store is needed. Consulted before any write on the
/// creation path.
///
/// Disabled entirely when the configured delay is zero; trusted callers and
/// whitelisted IPs are always exempt.
pub struct FloodGuard {
    links: Arc<dyn LinkRepository>,
    delay_seconds: u64,
    whitelist: HashSet<String>,
}

impl FloodGuard {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        delay_seconds: u64,
        whitelist: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            links,
            delay_seconds,
            whitelist: whitelist.into_iter().collect(),
        }
    }

    /// Returns `Err(Throttled)` when `ip` created a link within the
    /// configured delay before `now`.
    pub async fn check(
        &self,
        ip: &str,
        now: DateTime<Utc>,
        trusted: bool,
    ) -> Result<(), ShortenerError> {
        if self.delay_seconds == 0 || trusted || self.whitelist.contains(ip) {
            return Ok(());
        }

        let Some(last) = self.links.last_created_by_ip(ip).await? else {
            return Ok(());
        };

        let elapsed = now - last;
        let delay = Duration::seconds(self.delay_seconds as i64);
        if elapsed <= delay {
            let retry_after = (delay - elapsed).num_seconds().max(1) as u64;
            debug!(ip, retry_after, "creation throttled");
            return Err(ShortenerError::Throttled { retry_after });
        }

        Ok(())
    }
}
