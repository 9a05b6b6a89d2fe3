//! Storage backends implementing the domain repository traits.
//!
//! PostgreSQL is the production backend; the in-memory backend serves
//! integration tests and DB-less development with identical semantics.

mod memory_link_repository;
mod memory_stats_repository;
mod pg_link_repository;
mod pg_stats_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use memory_stats_repository::MemoryStatsRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_stats_repository::PgStatsRepository;
