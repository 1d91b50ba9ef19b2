//! Sessions and component variations

use crate::artifact::Artifact;
use crate::ids::{ArtifactId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submission and its generated artifacts
///
/// The artifact sequence has a fixed length chosen at creation. Artifacts are
/// mutated in place but never added, removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    prompt: String,
    created_at: DateTime<Utc>,
    artifacts: Vec<Artifact>,
}

impl Session {
    /// Create session with `slots` streaming placeholders
    #[must_use]
    pub fn new(prompt: impl Into<String>, slots: usize, placeholder_label: &str) -> Self {
        let id = SessionId::new();
        let artifacts = (0..slots)
            .map(|slot| Artifact::placeholder(ArtifactId::new(id, slot), placeholder_label))
            .collect();

        Self {
            id,
            prompt: prompt.into(),
            created_at: Utc::now(),
            artifacts,
        }
    }

    /// Session ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Trimmed prompt that created this session
    #[inline]
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Artifacts in display order
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Number of artifact slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the session has no slots
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Artifact at a display slot
    #[inline]
    #[must_use]
    pub fn artifact(&self, slot: usize) -> Option<&Artifact> {
        self.artifacts.get(slot)
    }

    /// Mutable artifact by id
    ///
    /// Lookup is by id, never by a caller-held index, so a write cannot land on
    /// a sibling.
    pub fn artifact_mut(&mut self, id: ArtifactId) -> Option<&mut Artifact> {
        if id.session != self.id {
            return None;
        }
        self.artifacts.iter_mut().find(|a| a.id() == id)
    }

    /// Whether every artifact reached Complete or Error
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.artifacts.iter().all(|a| a.status().is_terminal())
    }
}

/// Alternate design proposed for an existing artifact
///
/// Held only for the lifetime of one exploration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVariation {
    /// Short persona name
    pub name: String,
    /// Self-contained markup
    pub html: String,
}

impl ComponentVariation {
    /// Create variation
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            html: html.into(),
        }
    }

    /// Both fields present and non-blank
    ///
    /// Whitespace-only fields count as missing: such a variation has nothing
    /// to show and no name to show it under.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.name.trim().is_empty() && !self.html.trim().is_empty()
    }
}
