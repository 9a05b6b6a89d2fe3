//! Repository trait for the append-only click log.

use crate::domain::entities::{Click, NewClick};
use crate::error::ShortenerError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Clicks aggregated into one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub day: NaiveDate,
    pub clicks: i64,
}

/// Clicks aggregated into one hour bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourCount {
    pub hour: DateTime<Utc>,
    pub clicks: i64,
}

/// Clicks per referrer URL. `None` is a direct visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrerCount {
    pub referrer: Option<String>,
    pub clicks: i64,
}

/// Clicks per ISO country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country_code: String,
    pub clicks: i64,
}

/// Repository interface for recording and aggregating clicks.
///
/// The click log is append-only: rows are written by the background click
/// worker and only ever read afterwards. Aggregation queries take a keyword
/// set so multi-link reports reuse the same plan as single-link ones.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryStatsRepository`] - in-memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Appends one click-log row.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, ShortenerError>;

    /// Daily click totals for `keywords` within `[from, to]` (inclusive, UTC
    /// days). Days without clicks are absent; gap filling is the caller's job.
    async fn clicks_per_day(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<DayCount>, ShortenerError>;

    /// Hourly click totals for `keywords` since `since`, ascending.
    async fn clicks_per_hour(
        &self,
        keywords: &[String],
        since: DateTime<Utc>,
    ) -> Result<Vec<HourCount>, ShortenerError>;

    /// Click totals per full referrer URL, descending. Direct visits come
    /// back as a single `None` row.
    async fn referrer_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ReferrerCount>, ShortenerError>;

    /// Click totals per country code, descending. Clicks without a resolved
    /// country are omitted.
    async fn country_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<CountryCount>, ShortenerError>;

    /// Total logged clicks for `keywords` within the range.
    async fn count_clicks(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<i64, ShortenerError>;

    /// Timestamp of the earliest logged click, used for all-time averages.
    async fn first_click_time(
        &self,
        keywords: &[String],
    ) -> Result<Option<DateTime<Utc>>, ShortenerError>;
}
