//! Artifact lifecycle
//!
//! ```text
//! Pending ──Begin/Chunk──▶ Streaming ──Finish(non-empty)──▶ Complete
//!    │                        │
//!    └──────Fail──────────────┴──Finish(empty) / Fail────▶ Error
//!
//! Complete | Error ──Reset──▶ Streaming      (regeneration)
//! any              ──ApplyVariation──▶ Complete
//! ```
//!
//! Terminal states are left only through the two explicit, user-triggered
//! resets. Nothing here retries on its own.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// Slot allocated, no content requested yet
    #[default]
    Pending,
    /// Partial content arriving
    Streaming,
    /// Final, non-empty content
    Complete,
    /// Generation failed or produced nothing
    Error,
}

impl ArtifactStatus {
    /// Complete or Error
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Apply a transition, returning the next status
    ///
    /// # Errors
    /// [`TransitionError::Illegal`] when `transition` is not allowed from `self`
    pub fn next(self, transition: Transition) -> Result<Self, TransitionError> {
        use ArtifactStatus::{Complete, Error, Streaming};
        use Transition::{ApplyVariation, Begin, Chunk, Fail, Finish, Reset};

        let next = match (self, transition) {
            (_, Reset) => Streaming,
            (_, ApplyVariation) => Complete,
            (status, _) if status.is_terminal() => {
                return Err(TransitionError::Illegal {
                    from: self,
                    transition,
                })
            }
            (_, Begin | Chunk) => Streaming,
            (_, Finish { empty: false }) => Complete,
            (_, Finish { empty: true } | Fail) => Error,
        };

        Ok(next)
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Streaming => "streaming",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Every way an artifact's status can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Generation started
    Begin,
    /// Accumulated text replaced with a longer accumulation
    Chunk,
    /// Stream ended
    Finish {
        /// Normalization left nothing
        empty: bool,
    },
    /// The call raised an error
    Fail,
    /// Explicit regeneration: content cleared, streaming restarts
    Reset,
    /// Explicit overwrite with a chosen variation
    ApplyVariation,
}

impl Transition {
    /// All transitions, for exhaustive checks
    pub const ALL: [Transition; 7] = [
        Transition::Begin,
        Transition::Chunk,
        Transition::Finish { empty: false },
        Transition::Finish { empty: true },
        Transition::Fail,
        Transition::Reset,
        Transition::ApplyVariation,
    ];

    /// Whether this transition is a user-triggered reset
    #[inline]
    #[must_use]
    pub fn is_explicit_reset(self) -> bool {
        matches!(self, Self::Reset | Self::ApplyVariation)
    }
}

/// Transitions permitted from a status
#[must_use]
pub fn allowed_transitions(from: ArtifactStatus) -> Vec<Transition> {
    Transition::ALL
        .into_iter()
        .filter(|&t| from.next(t).is_ok())
        .collect()
}

/// Errors from the artifact state machine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not allowed from the current status
    #[error("illegal transition {transition:?} from {from}")]
    Illegal {
        /// Status the artifact was in
        from: ArtifactStatus,
        /// Rejected transition
        transition: Transition,
    },

    /// The style label was already written once
    #[error("style label already assigned")]
    StyleAlreadyAssigned,
}
