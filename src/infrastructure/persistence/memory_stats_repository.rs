//! In-memory implementation of the click-log repository.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{
    CountryCount, DayCount, HourCount, ReferrerCount, StatsRepository,
};
use crate::error::ShortenerError;

/// Thread-safe in-memory click log.
#[derive(Default)]
pub struct MemoryStatsRepository {
    clicks: RwLock<Vec<Click>>,
    next_click_id: AtomicI64,
}

impl MemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_range(
        click: &Click,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> bool {
        keywords.iter().any(|k| *k == click.keyword)
            && from.is_none_or(|f| click.click_time >= f)
            && to.is_none_or(|t| click.click_time <= t)
    }
}

#[async_trait]
impl StatsRepository for MemoryStatsRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, ShortenerError> {
        let click = Click::new(
            self.next_click_id.fetch_add(1, Ordering::SeqCst) + 1,
            Utc::now(),
            new_click.keyword,
            new_click.referrer,
            new_click.user_agent,
            new_click.ip,
            new_click.country_code,
        );

        self.clicks
            .write()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?
            .push(click.clone());

        Ok(click)
    }

    async fn clicks_per_day(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<DayCount>, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        let mut buckets: HashMap<chrono::NaiveDate, i64> = HashMap::new();
        for click in clicks.iter().filter(|c| Self::in_range(c, keywords, from, to)) {
            *buckets.entry(click.click_time.date_naive()).or_default() += 1;
        }

        let mut days: Vec<DayCount> = buckets
            .into_iter()
            .map(|(day, clicks)| DayCount { day, clicks })
            .collect();
        days.sort_by_key(|d| d.day);
        Ok(days)
    }

    async fn clicks_per_hour(
        &self,
        keywords: &[String],
        since: DateTime<Utc>,
    ) -> Result<Vec<HourCount>, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        let mut buckets: HashMap<DateTime<Utc>, i64> = HashMap::new();
        for click in clicks
            .iter()
            .filter(|c| Self::in_range(c, keywords, Some(since), None))
        {
            let hour = click
                .click_time
                .duration_trunc(TimeDelta::hours(1))
                .unwrap_or(click.click_time);
            *buckets.entry(hour).or_default() += 1;
        }

        let mut hours: Vec<HourCount> = buckets
            .into_iter()
            .map(|(hour, clicks)| HourCount { hour, clicks })
            .collect();
        hours.sort_by_key(|h| h.hour);
        Ok(hours)
    }

    async fn referrer_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ReferrerCount>, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        let mut buckets: HashMap<Option<String>, i64> = HashMap::new();
        for click in clicks.iter().filter(|c| Self::in_range(c, keywords, from, to)) {
            *buckets.entry(click.referrer.clone()).or_default() += 1;
        }

        let mut referrers: Vec<ReferrerCount> = buckets
            .into_iter()
            .map(|(referrer, clicks)| ReferrerCount { referrer, clicks })
            .collect();
        referrers.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.referrer.cmp(&b.referrer)));
        Ok(referrers)
    }

    async fn country_counts(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<CountryCount>, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        let mut buckets: HashMap<String, i64> = HashMap::new();
        for click in clicks.iter().filter(|c| Self::in_range(c, keywords, from, to)) {
            if let Some(country) = &click.country_code {
                *buckets.entry(country.clone()).or_default() += 1;
            }
        }

        let mut countries: Vec<CountryCount> = buckets
            .into_iter()
            .map(|(country_code, clicks)| CountryCount {
                country_code,
                clicks,
            })
            .collect();
        countries.sort_by(|a, b| {
            b.clicks
                .cmp(&a.clicks)
                .then(a.country_code.cmp(&b.country_code))
        });
        Ok(countries)
    }

    async fn count_clicks(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<i64, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        Ok(clicks
            .iter()
            .filter(|c| Self::in_range(c, keywords, from, to))
            .count() as i64)
    }

    async fn first_click_time(
        &self,
        keywords: &[String],
    ) -> Result<Option<DateTime<Utc>>, ShortenerError> {
        let clicks = self
            .clicks
            .read()
            .map_err(|_| ShortenerError::storage(anyhow::anyhow!("click log lock poisoned")))?;

        Ok(clicks
            .iter()
            .filter(|c| Self::in_range(c, keywords, None, None))
            .map(|c| c.click_time)
            .min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_click(keyword: &str, referrer: Option<&str>, country: Option<&str>) -> NewClick {
        NewClick {
            keyword: keyword.to_string(),
            referrer: referrer.map(String::from),
            user_agent: None,
            ip: None,
            country_code: country.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_record_click_assigns_ids() {
        let repo = MemoryStatsRepository::new();
        let a = repo.record_click(new_click("k", None, None)).await.unwrap();
        let b = repo.record_click(new_click("k", None, None)).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_count_clicks_filters_by_keyword() {
        let repo = MemoryStatsRepository::new();
        repo.record_click(new_click("a", None, None)).await.unwrap();
        repo.record_click(new_click("a", None, None)).await.unwrap();
        repo.record_click(new_click("b", None, None)).await.unwrap();

        let count = repo
            .count_clicks(&["a".to_string()], None, None)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_referrer_counts_groups_direct() {
        let repo = MemoryStatsRepository::new();
        repo.record_click(new_click("k", None, None)).await.unwrap();
        repo.record_click(new_click("k", None, None)).await.unwrap();
        repo.record_click(new_click("k", Some("https://a.example/x"), None))
            .await
            .unwrap();

        let counts = repo
            .referrer_counts(&["k".to_string()], None, None)
            .await
            .unwrap();
        assert_eq!(counts[0].referrer, None);
        assert_eq!(counts[0].clicks, 2);
    }

    #[tokio::test]
    async fn test_country_counts_skip_unresolved() {
        let repo = MemoryStatsRepository::new();
        repo.record_click(new_click("k", None, Some("DE"))).await.unwrap();
        repo.record_click(new_click("k", None, Some("DE"))).await.unwrap();
        repo.record_click(new_click("k", None, Some("US"))).await.unwrap();
        repo.record_click(new_click("k", None, None)).await.unwrap();

        let counts = repo
            .country_counts(&["k".to_string()], None, None)
            .await
            .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].country_code, "DE");
        assert_eq!(counts[0].clicks, 2);
    }

    #[tokio::test]
    async fn test_clicks_per_day_buckets_today() {
        let repo = MemoryStatsRepository::new();
        repo.record_click(new_click("k", None, None)).await.unwrap();
        repo.record_click(new_click("k", None, None)).await.unwrap();

        let days = repo
            .clicks_per_day(&["k".to_string()], None, None)
            .await
            .unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day, Utc::now().date_naive());
        assert_eq!(days[0].clicks, 2);
    }
}
