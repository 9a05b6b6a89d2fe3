//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching keyword → target URL mappings on the redirect path.
///
/// Implementations must be thread-safe and fail open: a broken cache
/// degrades to repository lookups, it never breaks a redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - no-op when caching is disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached target URL for a keyword.
    ///
    /// Returns `Ok(None)` on a miss; implementations treat backend errors
    /// as misses after logging them.
    async fn get_target(&self, keyword: &str) -> CacheResult<Option<String>>;

    /// Stores a keyword → target mapping with an optional TTL override.
    ///
    /// Implementations log and swallow backend errors so the request flow
    /// is never disrupted.
    async fn set_target(
        &self,
        keyword: &str,
        long_url: &str,
        ttl_seconds: Option<usize>,
    ) -> CacheResult<()>;

    /// Drops a cached mapping. Called when a link is renamed or edited.
    async fn invalidate(&self, keyword: &str) -> CacheResult<()>;

    /// Reports whether the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
