//! DTOs for the statistics endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::TrafficReport;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkOrder;

/// Query parameters for the link listing.
///
/// Uses `serde_with` to parse numbers out of query strings.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    /// One of `top`, `bottom`, `last`, `random` (default: `top`).
    pub filter: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub start: Option<i64>,
}

impl ListQueryParams {
    /// Validates the filter/limit/start triple.
    ///
    /// Limits are clamped to 1..=100; `start` must be non-negative.
    pub fn validate_and_resolve(&self) -> Result<(LinkOrder, i64, i64), String> {
        let order = match self.filter.as_deref().unwrap_or("top") {
            "top" => LinkOrder::TopClicks,
            "bottom" => LinkOrder::BottomClicks,
            "last" => LinkOrder::Newest,
            "random" => LinkOrder::Random,
            other => return Err(format!("Unknown filter '{other}'")),
        };

        let limit = self.limit.unwrap_or(25);
        if !(1..=100).contains(&limit) {
            return Err("Limit must be between 1 and 100".to_string());
        }

        let start = self.start.unwrap_or(0);
        if start < 0 {
            return Err("Start must be non-negative".to_string());
        }

        Ok((order, limit, start))
    }
}

/// Date-range query parameters for traffic reports.
#[derive(Debug, Deserialize)]
pub struct TrafficQueryParams {
    #[serde(default, with = "optional_rfc3339")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub to: Option<DateTime<Utc>>,
}

/// Custom Serde deserializer for RFC3339 datetime strings.
mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// One link in a listing response.
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub keyword: String,
    pub short_url: String,
    pub long_url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
}

impl LinkSummary {
    pub fn from_link(link: &Link, base_url: &str) -> Self {
        Self {
            keyword: link.keyword.clone(),
            short_url: link.short_url(base_url),
            long_url: link.long_url.clone(),
            title: link.title.clone(),
            created_at: link.created_at,
            clicks: link.clicks,
        }
    }
}

/// Listing response: ordered links plus global totals.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub links: Vec<LinkSummary>,
    pub total_links: i64,
    pub total_clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct DayPoint {
    pub day: NaiveDate,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct HourPoint {
    pub hour: DateTime<Utc>,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct ReferrerUrlEntry {
    pub url: String,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct ReferrerHostEntry {
    pub host: String,
    pub clicks: i64,
    pub urls: Vec<ReferrerUrlEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReferrerSplit {
    pub direct: i64,
    pub referred: i64,
    pub hosts: Vec<ReferrerHostEntry>,
}

#[derive(Debug, Serialize)]
pub struct CountryEntry {
    pub country_code: String,
    pub clicks: i64,
}

/// Traffic report for one keyword.
#[derive(Debug, Serialize)]
pub struct TrafficResponse {
    pub keyword: String,
    pub total_clicks: i64,
    pub daily: Vec<DayPoint>,
    pub hourly: Vec<HourPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_day: Option<DayPoint>,
    pub avg_last_7_days: f64,
    pub avg_last_30_days: f64,
    pub avg_all_time: f64,
    pub referrers: ReferrerSplit,
    pub countries: Vec<CountryEntry>,
}

impl TrafficResponse {
    pub fn from_report(keyword: String, report: TrafficReport) -> Self {
        Self {
            keyword,
            total_clicks: report.total_clicks,
            daily: report
                .daily
                .into_iter()
                .map(|d| DayPoint {
                    day: d.day,
                    clicks: d.clicks,
                })
                .collect(),
            hourly: report
                .hourly
                .into_iter()
                .map(|h| HourPoint {
                    hour: h.hour,
                    clicks: h.clicks,
                })
                .collect(),
            best_day: report.best_day.map(|d| DayPoint {
                day: d.day,
                clicks: d.clicks,
            }),
            avg_last_7_days: report.avg_last_7_days,
            avg_last_30_days: report.avg_last_30_days,
            avg_all_time: report.avg_all_time,
            referrers: ReferrerSplit {
                direct: report.referrers.direct,
                referred: report.referrers.referred,
                hosts: report
                    .referrers
                    .hosts
                    .into_iter()
                    .map(|h| ReferrerHostEntry {
                        host: h.host,
                        clicks: h.clicks,
                        urls: h
                            .urls
                            .into_iter()
                            .map(|u| ReferrerUrlEntry {
                                url: u.url,
                                clicks: u.clicks,
                            })
                            .collect(),
                    })
                    .collect(),
            },
            countries: report
                .countries
                .into_iter()
                .map(|c| CountryEntry {
                    country_code: c.country_code,
                    clicks: c.clicks,
                })
                .collect(),
        }
    }
}
