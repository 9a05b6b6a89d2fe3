//! Link entity: the keyword → target URL mapping.

use chrono::{DateTime, Utc};

/// A shortened link.
///
/// The keyword is the primary identity: globally unique, restricted to the
/// configured alphabet, at most 199 characters. `clicks` only ever grows
/// through the atomic increment on the redirect path; `created_at` and
/// `creator_ip` are set once at insert and never change.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub keyword: String,
    pub long_url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub creator_ip: String,
    pub clicks: i64,
}

impl Link {
    pub fn new(
        keyword: String,
        long_url: String,
        title: String,
        created_at: DateTime<Utc>,
        creator_ip: String,
        clicks: i64,
    ) -> Self {
        Self {
            keyword,
            long_url,
            title,
            created_at,
            creator_ip,
            clicks,
        }
    }

    /// The public short URL for this link under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.keyword)
    }
}

/// Input data for creating a new link.
///
/// `created_at` and the zeroed click counter are assigned by the store at
/// insert time.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub keyword: String,
    pub long_url: String,
    pub title: String,
    pub creator_ip: String,
}
