//! Error types for the orchestrator
//!
//! Failure classes and where each one stops:
//! - configuration: aborts a whole top-level action before any task starts
//! - transport: one call failed; the affected artifact ends in `Error`
//! - parse: label or variation decoding failed; a fallback is always used, so
//!   [`flash_extract::ParseError`] is logged and never reaches this type
//! - malformed fragments are recovered inside the extractor and never surface

use crate::provider::ProviderError;
use flash_store::StoreError;

/// Main orchestrator error type
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    /// No usable credential or invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A generation call failed
    #[error("transport error: {0}")]
    Transport(ProviderError),

    /// Session store rejected an operation
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Prompt empty after trimming
    #[error("prompt is empty")]
    InvalidPrompt,

    /// Another top-level action is in flight
    #[error("another action is already in progress")]
    Busy,

    /// No session has been created yet
    #[error("no current session")]
    NoSession,

    /// Focus target outside the session
    #[error("slot {slot} out of range ({slots} slots)")]
    SlotOutOfRange {
        /// Requested slot
        slot: usize,
        /// Slots in the session
        slots: usize,
    },

    /// No variation exploration is open
    #[error("no variation exploration is open")]
    NoExploration,

    /// Variation index outside the received list
    #[error("variation {index} out of range ({available} received)")]
    VariationOutOfRange {
        /// Requested variation
        index: usize,
        /// Variations received so far
        available: usize,
    },

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlashError {
    /// Check if error is retryable
    ///
    /// Only transport failures are; retry is always user-initiated.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if error is a configuration problem
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<ProviderError> for FlashError {
    fn from(error: ProviderError) -> Self {
        if error.is_configuration() {
            Self::Configuration(error.to_string())
        } else {
            Self::Transport(error)
        }
    }
}
