//! Orchestrator configuration

use crate::error::FlashError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of artifacts per session
pub const DEFAULT_SLOT_COUNT: usize = 4;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Accepted sampling temperature range
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Artifacts generated per submission
    pub slot_count: usize,
    /// Model requested for every call
    pub model: String,
    /// Sampling temperature for artifact generation (provider default if unset)
    pub artifact_temperature: Option<f32>,
    /// Variations requested per exploration
    pub variation_count: usize,
    /// Sampling temperature for variation exploration
    pub variation_temperature: f32,
    /// Style label shown until names arrive
    pub placeholder_label: String,
    /// Prefix for generated fallback labels ("Direction 1", ...)
    pub fallback_label_prefix: String,
}

impl FlashConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With slot count
    #[inline]
    #[must_use]
    pub fn with_slot_count(mut self, slots: usize) -> Self {
        self.slot_count = slots;
        self
    }

    /// With model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With artifact temperature
    #[inline]
    #[must_use]
    pub fn with_artifact_temperature(mut self, temperature: f32) -> Self {
        self.artifact_temperature = Some(temperature);
        self
    }

    /// With variation count
    #[inline]
    #[must_use]
    pub fn with_variation_count(mut self, count: usize) -> Self {
        self.variation_count = count;
        self
    }

    /// With variation temperature
    #[inline]
    #[must_use]
    pub fn with_variation_temperature(mut self, temperature: f32) -> Self {
        self.variation_temperature = temperature;
        self
    }

    /// With placeholder label
    #[inline]
    #[must_use]
    pub fn with_placeholder_label(mut self, label: impl Into<String>) -> Self {
        self.placeholder_label = label.into();
        self
    }

    /// Parse from TOML text; missing keys take defaults
    ///
    /// # Errors
    /// [`FlashError::Configuration`] on malformed TOML or invalid values
    pub fn from_toml_str(text: &str) -> Result<Self, FlashError> {
        let config: Self =
            toml::from_str(text).map_err(|e| FlashError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// I/O failures, malformed TOML or invalid values
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlashError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`FlashError::Configuration`] naming the first invalid field
    pub fn validate(&self) -> Result<(), FlashError> {
        if self.slot_count == 0 {
            return Err(FlashError::Configuration(
                "slot_count must be at least 1".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(FlashError::Configuration("model must not be empty".into()));
        }
        if let Some(t) = self.artifact_temperature {
            check_temperature("artifact_temperature", t)?;
        }
        check_temperature("variation_temperature", self.variation_temperature)?;
        Ok(())
    }
}

fn check_temperature(field: &str, value: f32) -> Result<(), FlashError> {
    if TEMPERATURE_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(FlashError::Configuration(format!(
            "{field} must be within {}..={}, got {value}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )))
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            model: DEFAULT_MODEL.to_string(),
            artifact_temperature: None,
            variation_count: 3,
            variation_temperature: 1.2,
            placeholder_label: "Designing...".to_string(),
            fallback_label_prefix: "Direction".to_string(),
        }
    }
}
