//! Operation interceptors: externally registered hooks that may short-circuit
//! a core operation.
//!
//! Each operation carries an explicit, ordered list of interceptors. An
//! interceptor either declines (`None`) or produces the final result; the
//! first producer wins and the core operation does not run. Registration
//! happens once at startup, before the registry is shared.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::{CreateOutcome, CreateRequest, Resolution};
use crate::error::ShortenerError;

/// Hook consulted before a creation request is processed.
#[async_trait]
pub trait CreateInterceptor: Send + Sync {
    /// Returns `Some` to take over the operation, `None` to decline.
    async fn intercept(
        &self,
        request: &CreateRequest,
    ) -> Option<Result<CreateOutcome, ShortenerError>>;
}

/// Hook consulted before a keyword is resolved.
#[async_trait]
pub trait ResolveInterceptor: Send + Sync {
    async fn intercept(&self, keyword: &str) -> Option<Resolution>;
}

/// Ordered interceptor lists, one per operation.
#[derive(Default)]
pub struct InterceptorRegistry {
    create: Vec<Arc<dyn CreateInterceptor>>,
    resolve: Vec<Arc<dyn ResolveInterceptor>>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create(mut self, interceptor: Arc<dyn CreateInterceptor>) -> Self {
        self.create.push(interceptor);
        self
    }

    pub fn with_resolve(mut self, interceptor: Arc<dyn ResolveInterceptor>) -> Self {
        self.resolve.push(interceptor);
        self
    }

    /// Runs creation interceptors in registration order; first `Some` wins.
    pub async fn run_create(
        &self,
        request: &CreateRequest,
    ) -> Option<Result<CreateOutcome, ShortenerError>> {
        for interceptor in &self.create {
            if let Some(result) = interceptor.intercept(request).await {
                return Some(result);
            }
        }
        None
    }

    /// Runs resolve interceptors in registration order; first `Some` wins.
    pub async fn run_resolve(&self, keyword: &str) -> Option<Resolution> {
        for interceptor in &self.resolve {
            if let Some(resolution) = interceptor.intercept(keyword).await {
                return Some(resolution);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeclineAll;

    #[async_trait]
    impl CreateInterceptor for DeclineAll {
        async fn intercept(
            &self,
            _request: &CreateRequest,
        ) -> Option<Result<CreateOutcome, ShortenerError>> {
            None
        }
    }

    struct BlockKeyword(&'static str);

    #[async_trait]
    impl ResolveInterceptor for BlockKeyword {
        async fn intercept(&self, keyword: &str) -> Option<Resolution> {
            (keyword == self.0).then_some(Resolution::NotFound)
        }
    }

    struct RejectAllCreates;

    #[async_trait]
    impl CreateInterceptor for RejectAllCreates {
        async fn intercept(
            &self,
            request: &CreateRequest,
        ) -> Option<Result<CreateOutcome, ShortenerError>> {
            Some(Err(ShortenerError::InvalidUrl {
                reason: format!("blocked: {}", request.url),
            }))
        }
    }

    fn request() -> CreateRequest {
        CreateRequest {
            url: "https://example.com".to_string(),
            keyword: None,
            title: None,
            ip: "203.0.113.1".to_string(),
            trusted: false,
        }
    }

    #[tokio::test]
    async fn test_empty_registry_declines() {
        let registry = InterceptorRegistry::new();
        assert!(registry.run_create(&request()).await.is_none());
        assert!(registry.run_resolve("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_declining_interceptors_fall_through() {
        let registry = InterceptorRegistry::new()
            .with_create(Arc::new(DeclineAll))
            .with_create(Arc::new(DeclineAll));
        assert!(registry.run_create(&request()).await.is_none());
    }

    #[tokio::test]
    async fn test_first_producing_interceptor_wins() {
        let registry = InterceptorRegistry::new()
            .with_create(Arc::new(DeclineAll))
            .with_create(Arc::new(RejectAllCreates));

        let result = registry.run_create(&request()).await;
        assert!(matches!(result, Some(Err(ShortenerError::InvalidUrl { .. }))));
    }

    #[tokio::test]
    async fn test_resolve_interceptor_matches_keyword() {
        let registry = InterceptorRegistry::new().with_resolve(Arc::new(BlockKeyword("banned")));

        assert_eq!(
            registry.run_resolve("banned").await,
            Some(Resolution::NotFound)
        );
        assert!(registry.run_resolve("other").await.is_none());
    }
}
