//! Target URL validation and normalization.
//!
//! Ensures consistent URL representation by normalizing hostnames, removing
//! fragments, and handling default ports. Duplicate-URL detection relies on
//! this canonical form being stable.

use url::Url;

/// Errors that can occur during target validation and normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Target URL is empty or a bare scheme")]
    EmptyTarget,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Validates a redirect target and returns its canonical form.
///
/// Rejects the degenerate inputs a form submit produces (empty string, a bare
/// `http://` / `https://` prefix with nothing behind it) before attempting a
/// full parse, so those get a precise error rather than a parser message.
pub fn validate_target(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "http://" || trimmed == "https://" {
        return Err(UrlNormalizationError::EmptyTarget);
    }

    normalize_url(trimmed)
}

/// Normalizes a URL to a canonical form.
///
/// Rules: scheme must be HTTP(S); hostname lowercased; default ports removed;
/// fragment removed; path and query preserved as-is.
///
/// Rejects non-web schemes (`javascript:`, `data:`, `file:`, ...) outright.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}
