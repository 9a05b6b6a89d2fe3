//! Click statistics and analytics.
//!
//! Bucket queries come from the repository; everything derived (gap filling,
//! best day, averages, referrer grouping, downsampling) is pure code here so
//! it can be tested without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, NaiveDate, TimeDelta, Utc};
use url::Url;

use crate::domain::entities::Link;
use crate::domain::repositories::{
    CountryCount, DayCount, GlobalCounts, HourCount, LinkOrder, LinkRepository, ReferrerCount,
    StatsRepository,
};
use crate::error::ShortenerError;

/// Maximum points in the daily series before it is thinned for display.
pub const DAILY_DISPLAY_POINTS: usize = 30;

/// Referrer label used for clicks without a referrer header.
pub const DIRECT: &str = "direct";

/// Clicks per full referrer URL within one referring host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCount {
    pub url: String,
    pub clicks: i64,
}

/// All referrers from one host, most-clicked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReferrers {
    pub host: String,
    pub clicks: i64,
    pub urls: Vec<UrlCount>,
}

/// Direct-vs-referred split plus per-host grouping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferrerBreakdown {
    pub direct: i64,
    pub referred: i64,
    pub hosts: Vec<HostReferrers>,
}

/// Time-bucketed traffic statistics for a keyword set.
#[derive(Debug, Clone)]
pub struct TrafficReport {
    pub total_clicks: i64,
    /// Daily buckets, gap-filled with zeros and thinned to
    /// [`DAILY_DISPLAY_POINTS`] (the peak day is always retained).
    pub daily: Vec<DayCount>,
    /// The trailing 24 hours, one bucket per hour, gap-filled.
    pub hourly: Vec<HourCount>,
    pub best_day: Option<DayCount>,
    pub avg_last_7_days: f64,
    pub avg_last_30_days: f64,
    pub avg_all_time: f64,
    pub referrers: ReferrerBreakdown,
    pub countries: Vec<CountryCount>,
}

/// Service for link listings, global counts, and traffic reports.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(links: Arc<dyn LinkRepository>, stats: Arc<dyn StatsRepository>) -> Self {
        Self { links, stats }
    }

    /// Ordered, paginated link summaries.
    pub async fn list_links(
        &self,
        order: LinkOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, ShortenerError> {
        self.links.list(order, limit, offset).await
    }

    /// Total link and click counts across the store.
    pub async fn global_counts(&self) -> Result<GlobalCounts, ShortenerError> {
        self.links.global_counts().await
    }

    /// Builds the full traffic report for `keywords` within `[from, to]`.
    pub async fn traffic_report(
        &self,
        keywords: &[String],
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<TrafficReport, ShortenerError> {
        let now = Utc::now();

        let raw_daily = self.stats.clicks_per_day(keywords, from, to).await?;
        let total_clicks = self.stats.count_clicks(keywords, from, to).await?;

        let start_day = from
            .map(|f| f.date_naive())
            .or_else(|| raw_daily.first().map(|d| d.day))
            .unwrap_or_else(|| now.date_naive());
        let end_day = to.map(|t| t.date_naive()).unwrap_or_else(|| now.date_naive());

        let daily_full = fill_daily_gaps(&raw_daily, start_day, end_day);
        let best_day = best_day(&daily_full);
        let daily = downsample(daily_full, DAILY_DISPLAY_POINTS);

        let since = (now - Duration::hours(23))
            .duration_trunc(TimeDelta::hours(1))
            .unwrap_or(now);
        let raw_hourly = self.stats.clicks_per_hour(keywords, since).await?;
        let hourly = fill_hourly_gaps(&raw_hourly, since, 24);

        let last_7 = self
            .stats
            .count_clicks(keywords, Some(now - Duration::days(7)), None)
            .await?;
        let last_30 = self
            .stats
            .count_clicks(keywords, Some(now - Duration::days(30)), None)
            .await?;
        let all_time = self.stats.count_clicks(keywords, None, None).await?;
        let first_click = self.stats.first_click_time(keywords).await?;

        let days_alive = first_click
            .map(|f| (now - f).num_days() + 1)
            .unwrap_or(1)
            .max(1) as f64;

        let referrers = group_referrers(self.stats.referrer_counts(keywords, from, to).await?);
        let countries = self.stats.country_counts(keywords, from, to).await?;

        Ok(TrafficReport {
            total_clicks,
            daily,
            hourly,
            best_day,
            avg_last_7_days: last_7 as f64 / 7.0,
            avg_last_30_days: last_30 as f64 / 30.0,
            avg_all_time: all_time as f64 / days_alive,
            referrers,
            countries,
        })
    }
}

/// Expands sparse day buckets into a contiguous series over `[start, end]`,
/// zero-filling missing days.
pub fn fill_daily_gaps(raw: &[DayCount], start: NaiveDate, end: NaiveDate) -> Vec<DayCount> {
    let by_day: HashMap<NaiveDate, i64> = raw.iter().map(|d| (d.day, d.clicks)).collect();

    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        out.push(DayCount {
            day,
            clicks: by_day.get(&day).copied().unwrap_or(0),
        });
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

/// Expands sparse hour buckets into `buckets` contiguous hours from `since`.
pub fn fill_hourly_gaps(
    raw: &[HourCount],
    since: DateTime<Utc>,
    buckets: usize,
) -> Vec<HourCount> {
    let by_hour: HashMap<DateTime<Utc>, i64> = raw.iter().map(|h| (h.hour, h.clicks)).collect();

    (0..buckets)
        .map(|i| {
            let hour = since + Duration::hours(i as i64);
            HourCount {
                hour,
                clicks: by_hour.get(&hour).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// The day with the most clicks; earliest wins a tie. Zero-click series have
/// no best day.
pub fn best_day(series: &[DayCount]) -> Option<DayCount> {
    let mut best: Option<DayCount> = None;
    for day in series {
        if day.clicks > 0 && best.is_none_or(|b| day.clicks > b.clicks) {
            best = Some(*day);
        }
    }
    best
}

/// Thins a series to roughly `max_points` by keeping every Nth point, always
/// retaining the maximum-valued one so the peak survives display scaling.
pub fn downsample(series: Vec<DayCount>, max_points: usize) -> Vec<DayCount> {
    if max_points == 0 || series.len() <= max_points {
        return series;
    }

    let step = series.len().div_ceil(max_points);
    let peak_index = series
        .iter()
        .enumerate()
        .max_by(|(ai, a), (bi, b)| a.clicks.cmp(&b.clicks).then(bi.cmp(ai)))
        .map(|(i, _)| i);

    series
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0 || Some(*i) == peak_index)
        .map(|(_, d)| d)
        .collect()
}

/// Splits referrer counts into direct vs referred and groups referred clicks
/// by host, then by full URL, both descending.
pub fn group_referrers(counts: Vec<ReferrerCount>) -> ReferrerBreakdown {
    let mut direct = 0;
    let mut referred = 0;
    let mut by_host: HashMap<String, Vec<UrlCount>> = HashMap::new();

    for count in counts {
        match count.referrer {
            None => direct += count.clicks,
            Some(referrer_url) => {
                referred += count.clicks;
                let host = Url::parse(&referrer_url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .unwrap_or_else(|| DIRECT.to_string());
                by_host.entry(host).or_default().push(UrlCount {
                    url: referrer_url,
                    clicks: count.clicks,
                });
            }
        }
    }

    let mut hosts: Vec<HostReferrers> = by_host
        .into_iter()
        .map(|(host, mut urls)| {
            urls.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.url.cmp(&b.url)));
            let clicks = urls.iter().map(|u| u.clicks).sum();
            HostReferrers { host, clicks, urls }
        })
        .collect();
    hosts.sort_by(|a, b| b.clicks.cmp(&a.clicks).then(a.host.cmp(&b.host)));

    ReferrerBreakdown {
        direct,
        referred,
        hosts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, MockStatsRepository};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn day(s: &str, clicks: i64) -> DayCount {
        DayCount {
            day: date(s),
            clicks,
        }
    }

    #[test]
    fn test_fill_daily_gaps_zero_fills() {
        let raw = vec![day("2026-08-01", 3), day("2026-08-04", 5)];
        let filled = fill_daily_gaps(&raw, date("2026-08-01"), date("2026-08-05"));

        assert_eq!(filled.len(), 5);
        assert_eq!(filled[0], day("2026-08-01", 3));
        assert_eq!(filled[1], day("2026-08-02", 0));
        assert_eq!(filled[2], day("2026-08-03", 0));
        assert_eq!(filled[3], day("2026-08-04", 5));
        assert_eq!(filled[4], day("2026-08-05", 0));
    }

    #[test]
    fn test_fill_daily_gaps_totals_match_raw_sum() {
        let raw = vec![
            day("2026-07-01", 2),
            day("2026-07-03", 9),
            day("2026-07-10", 4),
        ];
        let filled = fill_daily_gaps(&raw, date("2026-07-01"), date("2026-07-10"));

        let raw_total: i64 = raw.iter().map(|d| d.clicks).sum();
        let filled_total: i64 = filled.iter().map(|d| d.clicks).sum();
        assert_eq!(filled_total, raw_total);
    }

    #[test]
    fn test_fill_daily_gaps_empty_range() {
        let filled = fill_daily_gaps(&[], date("2026-08-05"), date("2026-08-01"));
        assert!(filled.is_empty());
    }

    #[test]
    fn test_fill_hourly_gaps_produces_full_window() {
        let since = "2026-08-05T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let raw = vec![HourCount {
            hour: since + Duration::hours(3),
            clicks: 7,
        }];

        let filled = fill_hourly_gaps(&raw, since, 24);
        assert_eq!(filled.len(), 24);
        assert_eq!(filled[3].clicks, 7);
        assert_eq!(filled.iter().map(|h| h.clicks).sum::<i64>(), 7);
    }

    #[test]
    fn test_best_day_picks_maximum() {
        let series = vec![
            day("2026-08-01", 2),
            day("2026-08-02", 9),
            day("2026-08-03", 4),
        ];
        assert_eq!(best_day(&series), Some(day("2026-08-02", 9)));
    }

    #[test]
    fn test_best_day_tie_prefers_earliest() {
        let series = vec![day("2026-08-01", 9), day("2026-08-02", 9)];
        assert_eq!(best_day(&series), Some(day("2026-08-01", 9)));
    }

    #[test]
    fn test_best_day_of_empty_or_zero_series() {
        assert_eq!(best_day(&[]), None);
        assert_eq!(best_day(&[day("2026-08-01", 0)]), None);
    }

    #[test]
    fn test_downsample_short_series_untouched() {
        let series = vec![day("2026-08-01", 1), day("2026-08-02", 2)];
        assert_eq!(downsample(series.clone(), 30), series);
    }

    #[test]
    fn test_downsample_keeps_peak() {
        // 90 days, peak buried at an index the stride would skip.
        let mut series = Vec::new();
        let mut d = date("2026-01-01");
        for i in 0..90 {
            series.push(DayCount {
                day: d,
                clicks: if i == 40 { 1000 } else { 1 },
            });
            d = d.succ_opt().unwrap();
        }

        let thinned = downsample(series, 30);
        assert!(thinned.len() <= 31);
        assert!(thinned.iter().any(|dc| dc.clicks == 1000));
        // Still in chronological order.
        assert!(thinned.windows(2).all(|w| w[0].day < w[1].day));
    }

    #[test]
    fn test_group_referrers_direct_vs_referred() {
        let counts = vec![
            ReferrerCount {
                referrer: None,
                clicks: 5,
            },
            ReferrerCount {
                referrer: Some("https://a.example/page1".to_string()),
                clicks: 3,
            },
            ReferrerCount {
                referrer: Some("https://a.example/page2".to_string()),
                clicks: 4,
            },
            ReferrerCount {
                referrer: Some("https://b.example/only".to_string()),
                clicks: 2,
            },
        ];

        let breakdown = group_referrers(counts);
        assert_eq!(breakdown.direct, 5);
        assert_eq!(breakdown.referred, 9);

        assert_eq!(breakdown.hosts.len(), 2);
        assert_eq!(breakdown.hosts[0].host, "a.example");
        assert_eq!(breakdown.hosts[0].clicks, 7);
        assert_eq!(breakdown.hosts[0].urls[0].url, "https://a.example/page2");
        assert_eq!(breakdown.hosts[1].host, "b.example");
    }

    #[tokio::test]
    async fn test_traffic_report_aggregates() {
        let links = MockLinkRepository::new();
        let mut stats = MockStatsRepository::new();

        let today = Utc::now().date_naive();
        let daily = vec![
            DayCount {
                day: today - Duration::days(2),
                clicks: 3,
            },
            DayCount {
                day: today,
                clicks: 7,
            },
        ];

        stats
            .expect_clicks_per_day()
            .returning(move |_, _, _| Ok(daily.clone()));
        stats.expect_clicks_per_hour().returning(|_, _| Ok(vec![]));
        stats.expect_count_clicks().returning(|_, _, _| Ok(10));
        stats
            .expect_first_click_time()
            .returning(|_| Ok(Some(Utc::now() - Duration::days(4))));
        stats.expect_referrer_counts().returning(|_, _, _| {
            Ok(vec![ReferrerCount {
                referrer: None,
                clicks: 10,
            }])
        });
        stats.expect_country_counts().returning(|_, _, _| {
            Ok(vec![CountryCount {
                country_code: "DE".to_string(),
                clicks: 10,
            }])
        });

        let service = StatsService::new(Arc::new(links), Arc::new(stats));
        let report = service
            .traffic_report(&["abc".to_string()], None, None)
            .await
            .unwrap();

        assert_eq!(report.total_clicks, 10);
        // Gap-filled from the first raw day through today.
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.daily.iter().map(|d| d.clicks).sum::<i64>(), 10);
        assert_eq!(report.best_day.unwrap().clicks, 7);
        assert_eq!(report.hourly.len(), 24);
        assert!((report.avg_last_7_days - 10.0 / 7.0).abs() < f64::EPSILON);
        assert_eq!(report.referrers.direct, 10);
        assert_eq!(report.countries[0].country_code, "DE");
    }

    #[tokio::test]
    async fn test_global_counts_delegates() {
        let mut links = MockLinkRepository::new();
        links.expect_global_counts().returning(|| {
            Ok(GlobalCounts {
                total_links: 4,
                total_clicks: 99,
            })
        });

        let service = StatsService::new(Arc::new(links), Arc::new(MockStatsRepository::new()));
        let counts = service.global_counts().await.unwrap();
        assert_eq!(counts.total_links, 4);
        assert_eq!(counts.total_clicks, 99);
    }

    #[tokio::test]
    async fn test_list_links_delegates_order() {
        let mut links = MockLinkRepository::new();
        links
            .expect_list()
            .withf(|order, limit, offset| {
                *order == LinkOrder::TopClicks && *limit == 10 && *offset == 0
            })
            .returning(|_, _, _| Ok(vec![]));

        let service = StatsService::new(Arc::new(links), Arc::new(MockStatsRepository::new()));
        service
            .list_links(LinkOrder::TopClicks, 10, 0)
            .await
            .unwrap();
    }
}
