//! Error types for the session store

use flash_artifact::{ArtifactId, SessionId, TransitionError};

/// Session store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No session with this id
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// No artifact with this id in its session
    #[error("artifact not found: {0}")]
    ArtifactNotFound(ArtifactId),

    /// The artifact state machine rejected the write
    #[error("artifact {artifact}: {source}")]
    Transition {
        /// Artifact the write was addressed to
        artifact: ArtifactId,
        /// State machine refusal
        #[source]
        source: TransitionError,
    },

    /// Label list length differs from the session's slot count
    #[error("expected {expected} labels, got {actual}")]
    LabelCountMismatch {
        /// Slots in the session
        expected: usize,
        /// Labels supplied
        actual: usize,
    },
}

impl StoreError {
    /// Whether the write was refused because the artifact moved on
    ///
    /// A generation task seeing this has been superseded by a reset or a
    /// variation-apply and should stop writing.
    #[inline]
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        matches!(
            self,
            Self::Transition {
                source: TransitionError::Illegal { .. },
                ..
            }
        )
    }
}
