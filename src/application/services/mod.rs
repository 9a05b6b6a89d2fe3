//! Application services orchestrating domain logic.

mod flood_guard;
mod link_service;
mod stats_service;

pub use flood_guard::FloodGuard;
pub use link_service::{CreateOutcome, CreateRequest, LinkService, Resolution};
pub use stats_service::{
    DAILY_DISPLAY_POINTS, DIRECT, HostReferrers, ReferrerBreakdown, StatsService, TrafficReport,
    UrlCount, best_day, downsample, fill_daily_gaps, fill_hourly_gaps, group_referrers,
};
