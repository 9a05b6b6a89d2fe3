//! Click entity: one append-only row per successful redirect.

use chrono::{DateTime, Utc};

/// A recorded redirect of a short link.
///
/// The `keyword` is a soft reference: the click log outlives renames, so a
/// stored keyword is not required to resolve at query time. Rows are never
/// mutated or deleted by this service.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub click_time: DateTime<Utc>,
    pub keyword: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub country_code: Option<String>,
}

impl Click {
    pub fn new(
        id: i64,
        click_time: DateTime<Utc>,
        keyword: String,
        referrer: Option<String>,
        user_agent: Option<String>,
        ip: Option<String>,
        country_code: Option<String>,
    ) -> Self {
        Self {
            id,
            click_time,
            keyword,
            referrer,
            user_agent,
            ip,
            country_code,
        }
    }
}

/// Input data for appending a click-log row.
///
/// `click_time` and the row id are assigned by the store. A missing referrer
/// is stored as `None` and reported as "direct" by the stats layer.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub keyword: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub country_code: Option<String>,
}
