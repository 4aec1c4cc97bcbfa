//! API endpoint URLs.

/// Base URL of the public Web API.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api/";

/// Maps an API method name to the URL it is served at.
pub trait UrlBuilder: Send + Sync {
    fn url(&self, method: &str) -> String;
}

/// Joins a base URL and the method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrlBuilder {
    base: String,
}

impl BaseUrlBuilder {
    /// Creates a builder for `base`; a trailing `/` is added when missing.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Default for BaseUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl UrlBuilder for BaseUrlBuilder {
    fn url(&self, method: &str) -> String {
        format!("{}{}", self.base, method.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_method() {
        assert_eq!(
            BaseUrlBuilder::default().url("chat.postMessage"),
            "https://slack.com/api/chat.postMessage"
        );
        assert_eq!(
            BaseUrlBuilder::new("http://localhost:8080/api").url("/auth.test"),
            "http://localhost:8080/api/auth.test"
        );
    }
}
