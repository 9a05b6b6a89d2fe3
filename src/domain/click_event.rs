//! Click event model for asynchronous click tracking.

/// An in-memory click event passed from the redirect handler to the
/// background worker via a bounded channel.
///
/// Decouples the HTTP response from the two storage writes (counter increment
/// and click-log append), keeping redirects fast. All client metadata is
/// optional; the country code is resolved by the worker, not the handler.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub keyword: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl ClickEvent {
    pub fn new(
        keyword: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            keyword,
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referrer: referrer.map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(
            "abc".to_string(),
            Some("192.0.2.1".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.keyword, "abc");
        assert_eq!(event.ip, Some("192.0.2.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(event.referrer, Some("https://google.com".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new("xyz".to_string(), None, None, None);

        assert_eq!(event.keyword, "xyz");
        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.referrer.is_none());
    }
}
