//! Configuration options for the CRM client

use std::env;
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Storage key the session token lives under
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Configuration options for the CRM client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long the search term must stay unchanged before a request is issued
    pub search_debounce: Duration,

    /// Maximum characters of a lead message shown in the list
    pub message_preview_len: usize,

    /// Key under which the session token is persisted
    pub token_key: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            search_debounce: Duration::from_millis(300),
            message_preview_len: 50,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientOptions {
    /// Build options from `CRM_*` environment variables, falling back to defaults.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(url) = env::var("CRM_API_URL") {
            options = options.with_api_url(&url);
        }
        if let Some(secs) = parse_var::<u64>("CRM_REQUEST_TIMEOUT_SECS") {
            options.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_var::<u64>("CRM_SEARCH_DEBOUNCE_MS") {
            options.search_debounce = Duration::from_millis(ms);
        }
        if let Some(len) = parse_var::<usize>("CRM_PREVIEW_LEN") {
            options.message_preview_len = len;
        }

        options
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the search debounce window
    pub fn with_search_debounce(mut self, value: Duration) -> Self {
        self.search_debounce = value;
        self
    }

    /// Set the message preview length
    pub fn with_message_preview_len(mut self, value: usize) -> Self {
        self.message_preview_len = value;
        self
    }

    /// Set the token storage key
    pub fn with_token_key(mut self, value: &str) -> Self {
        self.token_key = value.to_string();
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}: cannot parse {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.api_url, "http://localhost:3000/api");
        assert_eq!(options.message_preview_len, 50);
        assert_eq!(options.token_key, "token");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let options = ClientOptions::default().with_api_url("https://crm.example.com/api/");
        assert_eq!(options.api_url, "https://crm.example.com/api");
    }
}
