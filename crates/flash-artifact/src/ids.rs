//! Session and artifact identifiers

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique session identifier (ULID for creation-order sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifact identifier, derived from its session and slot
///
/// Stable for the lifetime of the session: regeneration and variation-apply
/// keep the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    /// Owning session
    pub session: SessionId,
    /// Display position within the session
    pub slot: usize,
}

impl ArtifactId {
    /// Create artifact ID for a session slot
    #[inline]
    #[must_use]
    pub fn new(session: SessionId, slot: usize) -> Self {
        Self { session, slot }
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.session, self.slot)
    }
}
