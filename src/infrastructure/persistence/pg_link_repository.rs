//! PostgreSQL implementation of the link repository.
//!
//! Keyword uniqueness rides on the `links` primary key: `insert` and
//! `rename` surface unique violations as [`ShortenerError::Conflict`], so
//! allocation races lose cleanly instead of overwriting. The counter row in
//! `shortener_options` advances with `GREATEST`, which makes
//! `advance_next_id` a compare-and-advance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{GlobalCounts, LinkOrder, LinkRepository};
use crate::error::{ShortenerError, map_sqlx_error};

const LINK_COLUMNS: &str = "keyword, long_url, title, created_at, creator_ip, clicks";

#[derive(sqlx::FromRow)]
struct LinkRow {
    keyword: String,
    long_url: String,
    title: String,
    created_at: DateTime<Utc>,
    creator_ip: String,
    clicks: i64,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.keyword,
            r.long_url,
            r.title,
            r.created_at,
            r.creator_ip,
            r.clicks,
        )
    }
}

/// PostgreSQL repository for link storage and the allocation counter.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, ShortenerError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "INSERT INTO links (keyword, long_url, title, creator_ip) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(&new_link.keyword)
        .bind(&new_link.long_url)
        .bind(&new_link.title)
        .bind(&new_link.creator_ip)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_keyword(&self, keyword: &str) -> Result<Option<Link>, ShortenerError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE keyword = $1"
        ))
        .bind(keyword)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Link>, ShortenerError> {
        // Oldest match wins so duplicate submissions stay stable over time.
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE long_url = $1 \
             ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn increment_clicks(&self, keyword: &str, delta: i64) -> Result<bool, ShortenerError> {
        let result = sqlx::query("UPDATE links SET clicks = clicks + $2 WHERE keyword = $1")
            .bind(keyword)
            .bind(delta)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn rename(
        &self,
        old_keyword: &str,
        new_keyword: &str,
        long_url: &str,
        title: &str,
    ) -> Result<Link, ShortenerError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "UPDATE links SET keyword = $2, long_url = $3, title = $4 \
             WHERE keyword = $1 \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(old_keyword)
        .bind(new_keyword)
        .bind(long_url)
        .bind(title)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        row.map(Link::from).ok_or(ShortenerError::NotFound)
    }

    async fn last_created_by_ip(
        &self,
        ip: &str,
    ) -> Result<Option<DateTime<Utc>>, ShortenerError> {
        let last: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM links WHERE creator_ip = $1")
                .bind(ip)
                .fetch_one(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)?;

        Ok(last)
    }

    async fn next_id(&self) -> Result<u64, ShortenerError> {
        let id: i64 = sqlx::query_scalar("SELECT next_id FROM shortener_options WHERE id = 1")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(id.max(0) as u64)
    }

    async fn advance_next_id(&self, to: u64) -> Result<(), ShortenerError> {
        let to = i64::try_from(to)
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("next_id out of range")))?;

        sqlx::query(
            "UPDATE shortener_options SET next_id = GREATEST(next_id, $1) WHERE id = 1",
        )
        .bind(to)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list(
        &self,
        order: LinkOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, ShortenerError> {
        let order_by = match order {
            LinkOrder::TopClicks => "clicks DESC, created_at DESC",
            LinkOrder::BottomClicks => "clicks ASC, created_at DESC",
            LinkOrder::Newest => "created_at DESC",
            LinkOrder::Random => "RANDOM()",
        };

        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY {order_by} LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn global_counts(&self) -> Result<GlobalCounts, ShortenerError> {
        let (total_links, total_clicks): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(clicks), 0)::bigint FROM links",
        )
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(GlobalCounts {
            total_links,
            total_clicks,
        })
    }
}
