//! PostgreSQL implementation of the click-log repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{
    CountryCount, DayCount, HourCount, ReferrerCount, StatsRepository,
};
use crate::error::{ShortenerError, map_sqlx_error};

const CLICK_COLUMNS: &str =
    "click_id, click_time, keyword, referrer, user_agent, ip, country_code";

#[derive(sqlx::FromRow)]
struct ClickRow {
    click_id: i64,
    click_time: DateTime<Utc>,
    keyword: String,
    referrer: Option<String>,
    user_agent: Option<String>,
    ip: Option<String>,
    country_code: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click::new(
            r.click_id,
            r.click_time,
            r.keyword,
            r.referrer,
            r.user_agent,
            r.ip,
            r.country_code,
        )
    }
}

/// PostgreSQL repository for recording and aggregating clicks.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, ShortenerError> {
        let row = sqlx::query_as::<_, ClickRow>(&format!(
            "INSERT INTO click_log (keyword, referrer, user_agent, ip, country_code) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CLICK_COLUMNS}"
        ))
        .bind(&new_click.keyword)
        .bind(&new_click.referrer)
        .bind(&new_click.user_agent)
        .bind(&new_click.ip)
        .bind(&new_click.country_code)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn clicks_per_day(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<DayCount>, ShortenerError> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT (click_time AT TIME ZONE 'UTC')::date AS day, COUNT(*)::bigint \
             FROM click_log \
             WHERE keyword = ANY($1) \
               AND ($2::timestamptz IS NULL OR click_time >= $2) \
               AND ($3::timestamptz IS NULL OR click_time <= $3) \
             GROUP BY day \
             ORDER BY day",
        )
        .bind(keywords)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(day, clicks)| DayCount { day, clicks })
            .collect())
    }

    async fn clicks_per_hour(
        &self,
        keywords: &[String],
        since: DateTime<Utc>,
    ) -> Result<Vec<HourCount>, ShortenerError> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            "SELECT date_trunc('hour', click_time) AS hour, COUNT(*)::bigint \
             FROM click_log \
             WHERE keyword = ANY($1) AND click_time >= $2 \
             GROUP BY hour \
             ORDER BY hour",
        )
        .bind(keywords)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(hour, clicks)| HourCount { hour, clicks })
            .collect())
    }

    async fn referrer_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ReferrerCount>, ShortenerError> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT referrer, COUNT(*)::bigint \
             FROM click_log \
             WHERE keyword = ANY($1) \
               AND ($2::timestamptz IS NULL OR click_time >= $2) \
               AND ($3::timestamptz IS NULL OR click_time <= $3) \
             GROUP BY referrer \
             ORDER BY COUNT(*) DESC",
        )
        .bind(keywords)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(referrer, clicks)| ReferrerCount { referrer, clicks })
            .collect())
    }

    async fn country_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<CountryCount>, ShortenerError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT country_code, COUNT(*)::bigint \
             FROM click_log \
             WHERE keyword = ANY($1) AND country_code IS NOT NULL \
               AND ($2::timestamptz IS NULL OR click_time >= $2) \
               AND ($3::timestamptz IS NULL OR click_time <= $3) \
             GROUP BY country_code \
             ORDER BY COUNT(*) DESC",
        )
        .bind(keywords)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(country_code, clicks)| CountryCount {
                country_code,
                clicks,
            })
            .collect())
    }

    async fn count_clicks(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<i64, ShortenerError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM click_log \
             WHERE keyword = ANY($1) \
               AND ($2::timestamptz IS NULL OR click_time >= $2) \
               AND ($3::timestamptz IS NULL OR click_time <= $3)",
        )
        .bind(keywords)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn first_click_time(
        &self,
        keywords: &[String],
    ) -> Result<Option<DateTime<Utc>>, ShortenerError> {
        let first: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MIN(click_time) FROM click_log WHERE keyword = ANY($1)")
                .bind(keywords)
                .fetch_one(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)?;

        Ok(first)
    }
}
