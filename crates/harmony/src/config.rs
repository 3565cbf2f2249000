use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Matches the backend's own development default.
pub const DEFAULT_API_TOKEN: &str = "default-token";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid Harmony API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{var} must be a valid {expected}, got '{value}'")]
    InvalidNumber {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Connection settings for the Harmony API.
///
/// Validated once at startup and passed explicitly to [`HarmonyApi`](crate::api::HarmonyApi).
#[derive(Debug, Clone)]
pub struct HarmonyConfig {
    base_url: Url,
    api_token: String,
    timeout: Duration,
}

impl HarmonyConfig {
    pub fn new(base_url: &str, api_token: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_token: api_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HARMONY_API_URL`      | `http://localhost:8000`  |
    /// | `HARMONY_API_TOKEN`    | `default-token`          |
    /// | `HARMONY_TIMEOUT_SECS` | `120`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("HARMONY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let token =
            std::env::var("HARMONY_API_TOKEN").unwrap_or_else(|_| DEFAULT_API_TOKEN.into());
        let timeout_secs = match std::env::var("HARMONY_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "HARMONY_TIMEOUT_SECS",
                expected: "u64",
                value,
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(&url, token)?.with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a backend path. Segments are percent-encoded, so
    /// an opaque job id can never escape its path segment.
    pub fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // `parse_base_url` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".into()));
    }
    Ok(url)
}
