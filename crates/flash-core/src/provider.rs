//! Generation capability consumed by the orchestrator
//!
//! Transport and authentication live behind this trait. The orchestrator only
//! sees "a prompt in, text out", either as one value or as a lazy sequence of
//! fragments that concatenate to the full response.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Lazy sequence of response fragments
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// One generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Sampling temperature; provider default if unset
    pub temperature: Option<f32>,
    /// Model override; provider default if unset
    pub model: Option<String>,
}

impl GenerationRequest {
    /// Create request with provider defaults
    #[inline]
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            model: None,
        }
    }

    /// With temperature
    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// With optional temperature
    #[inline]
    #[must_use]
    pub fn with_temperature_opt(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// With model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Provider failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No credential available
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Request could not be sent or the connection broke
    #[error("transport failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("provider returned status {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Error message from the response body
        body: String,
    },

    /// Failure reported while iterating a stream
    #[error("stream failed: {0}")]
    Stream(String),
}

impl ProviderError {
    /// Whether this is a configuration problem rather than a call failure
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}

/// Text-producing generation capability
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Fail fast when the provider cannot make calls at all
    ///
    /// Checked before a top-level action creates anything.
    ///
    /// # Errors
    /// [`ProviderError::MissingCredential`] when no credential is available
    fn ensure_configured(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Generate one complete response
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError>;

    /// Start a streamed response
    ///
    /// Errors may surface here (call time) or as items of the stream.
    async fn generate_stream(&self, request: GenerationRequest)
        -> Result<TextStream, ProviderError>;
}
