//! Process-wide client configuration.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use crate::http::MAX_RETRIES;
use crate::runtime::Runtime;

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_USER_AGENT: &str = concat!("tmdb-rest/", env!("TMDB_REST_VERSION"));

pub const ENV_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_API_URL: &str = "TMDB_API_URL";
pub const ENV_MAX_RETRIES: &str = "TMDB_MAX_RETRIES";
pub const ENV_LANGUAGE: &str = "TMDB_LANGUAGE";

/// Settings shared by every call made through one [`RestClient`](crate::http::RestClient).
///
/// Never mutated once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Appended to every query string, after the caller's own parameters.
    pub default_params: Vec<(String, String)>,
    /// Retries after the first attempt; `0` sends exactly once.
    pub max_retry_count: u32,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            default_params: Vec::new(),
            max_retry_count: MAX_RETRIES,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.with_default_param("api_key", api_key)
    }

    pub fn with_default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_params.push((key.into(), value.into()));
        self
    }

    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `TMDB_API_URL`, `TMDB_API_KEY`, `TMDB_MAX_RETRIES` and `TMDB_LANGUAGE`.
    #[tracing::instrument(skip(runtime))]
    pub fn from_env<R: Runtime>(runtime: &R) -> Result<Self> {
        let base_url = runtime
            .env_var(ENV_API_URL)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(base_url);

        match runtime.env_var(ENV_API_KEY) {
            Ok(key) if !key.is_empty() => {
                debug!("Using {} for authentication: {}", ENV_API_KEY, mask(&key));
                config = config.with_api_key(key);
            }
            _ => warn!(
                "{} is not set; requests will most likely be rejected",
                ENV_API_KEY
            ),
        }

        if let Ok(retries) = runtime.env_var(ENV_MAX_RETRIES) {
            config.max_retry_count = retries
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {:?}", ENV_MAX_RETRIES, retries))?;
        }

        if let Ok(language) = runtime.env_var(ENV_LANGUAGE) {
            config = config.with_default_param("language", language);
        }

        Ok(config)
    }

    /// Builds the pooled HTTP client every attempt is sent through.
    pub fn build_http_client(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build HTTP client")
    }
}

/// Shows only the edges of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
