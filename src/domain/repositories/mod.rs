//! Repository trait definitions for the domain layer.
//!
//! Traits abstract over storage so services can be unit-tested with mocks
//! and integration-tested against the in-memory backend.

mod link_repository;
mod stats_repository;

pub use link_repository::{GlobalCounts, LinkOrder, LinkRepository};
pub use stats_repository::{
    CountryCount, DayCount, HourCount, ReferrerCount, StatsRepository,
};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
