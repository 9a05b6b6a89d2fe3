//! Utility functions for keyword encoding, URL processing, and sanitization.
//!
//! - [`codec`] - Base-K keyword encoding over the configured alphabet
//! - [`url_normalizer`] - Target URL validation and normalization
//! - [`sanitize`] - Title sanitization

pub mod codec;
pub mod sanitize;
pub mod url_normalizer;
