//! HTTP middleware layers.

pub mod rate_limit;
pub mod tracing;
