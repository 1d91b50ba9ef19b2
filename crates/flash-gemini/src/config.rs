//! Gemini transport configuration

use std::time::Duration;

/// Default endpoint root for the Gemini API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Transport configuration for Gemini requests.
#[derive(Clone, Default)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`. Checked before any call is made.
    pub api_key: Option<String>,
    /// Endpoint root; `/models/{model}:...` is appended.
    pub base_url: String,
    /// Model used when a request carries no override.
    pub model: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    /// Configuration with an explicit key and default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::defaults()
        }
    }

    /// Key from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Key from the first of [`API_KEY_VARS`] that `lookup` resolves to a
    /// non-blank value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
        Self {
            api_key,
            ..Self::defaults()
        }
    }

    fn defaults() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: flash_core::config::DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    /// With endpoint root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether a key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
