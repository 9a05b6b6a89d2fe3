//! Repository trait for link storage and the allocation counter.

use crate::domain::entities::{Link, NewLink};
use crate::error::ShortenerError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Sort order for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrder {
    /// Most-clicked first.
    TopClicks,
    /// Least-clicked first.
    BottomClicks,
    /// Most recently created first.
    Newest,
    /// Storage-defined random order.
    Random,
}

/// Aggregate totals over the whole link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalCounts {
    pub total_links: i64,
    pub total_clicks: i64,
}

/// Repository interface for keyword → URL records and the `next_id` counter.
///
/// # Atomicity contract
///
/// Keyword uniqueness is enforced *here*, not by callers: [`insert`] and
/// [`rename`] must either claim the keyword or fail with
/// [`ShortenerError::Conflict`] without side effects, backed by a storage
/// uniqueness constraint rather than a check-then-insert sequence.
/// [`increment_clicks`] and [`advance_next_id`] are atomic read-modify-write
/// operations; the counter never moves backwards.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-memory,
///   used by integration tests and DB-less development
///
/// [`insert`]: LinkRepository::insert
/// [`rename`]: LinkRepository::rename
/// [`increment_clicks`]: LinkRepository::increment_clicks
/// [`advance_next_id`]: LinkRepository::advance_next_id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Atomically claims `new_link.keyword` and stores the record.
    ///
    /// # Errors
    ///
    /// [`ShortenerError::Conflict`] if the keyword is already taken;
    /// [`ShortenerError::Storage`] on database errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, ShortenerError>;

    /// Looks up a link by keyword.
    async fn find_by_keyword(&self, keyword: &str) -> Result<Option<Link>, ShortenerError>;

    /// Looks up a link by its normalized target URL (duplicate detection).
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Link>, ShortenerError>;

    /// Atomically adds `delta` to the click counter.
    ///
    /// Returns `false` when the keyword does not exist.
    async fn increment_clicks(&self, keyword: &str, delta: i64) -> Result<bool, ShortenerError>;

    /// Moves a link to a new keyword and/or updates its target and title.
    ///
    /// Clicks, creation time, and creator IP travel with the record.
    ///
    /// # Errors
    ///
    /// [`ShortenerError::NotFound`] if `old_keyword` does not exist;
    /// [`ShortenerError::Conflict`] if `new_keyword` is already taken.
    async fn rename(
        &self,
        old_keyword: &str,
        new_keyword: &str,
        long_url: &str,
        title: &str,
    ) -> Result<Link, ShortenerError>;

    /// Timestamp of the most recent link created from `ip`, if any.
    ///
    /// This is the flood-guard read path; it reuses link creation history
    /// instead of a separate rate-limit store.
    async fn last_created_by_ip(&self, ip: &str)
    -> Result<Option<DateTime<Utc>>, ShortenerError>;

    /// Current value of the auto-allocation counter.
    async fn next_id(&self) -> Result<u64, ShortenerError>;

    /// Advances the counter to `to` unless it is already further along
    /// (compare-and-advance; concurrent allocators may race past each other).
    async fn advance_next_id(&self, to: u64) -> Result<(), ShortenerError>;

    /// Ordered, paginated listing for the stats surface.
    async fn list(
        &self,
        order: LinkOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, ShortenerError>;

    /// Total link and click counts across the store.
    async fn global_counts(&self) -> Result<GlobalCounts, ShortenerError>;
}
