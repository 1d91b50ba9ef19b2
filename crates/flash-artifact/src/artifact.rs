//! Generated artifact record

use crate::ids::ArtifactId;
use crate::state_machine::{ArtifactStatus, Transition, TransitionError};
use serde::{Deserialize, Serialize};

/// Result of a partial-content write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The accumulation replaced the stored text
    Applied,
    /// Shorter than what is already stored; ignored
    Stale,
}

/// One generated UI component
///
/// # Invariants
/// - `status` only changes through [`ArtifactStatus::next`]
/// - `html` never shrinks while `Streaming`; only finalization, reset and
///   variation-apply may shorten it
/// - the style label is assigned at most once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    id: ArtifactId,
    style_name: String,
    html: String,
    status: ArtifactStatus,
    style_assigned: bool,
}

impl Artifact {
    /// Placeholder created with its session: streaming, unnamed, empty
    #[must_use]
    pub fn placeholder(id: ArtifactId, label: impl Into<String>) -> Self {
        Self {
            id,
            style_name: label.into(),
            html: String::new(),
            status: ArtifactStatus::Streaming,
            style_assigned: false,
        }
    }

    /// Artifact ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// Style label (placeholder text until assigned)
    #[inline]
    #[must_use]
    pub fn style_name(&self) -> &str {
        &self.style_name
    }

    /// Markup accumulated so far, or final markup
    #[inline]
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Current lifecycle status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        self.status
    }

    /// Whether the style label has been written
    #[inline]
    #[must_use]
    pub fn style_assigned(&self) -> bool {
        self.style_assigned
    }

    /// Write the style label (once)
    ///
    /// # Errors
    /// [`TransitionError::StyleAlreadyAssigned`] on a second write
    pub fn assign_style(&mut self, name: impl Into<String>) -> Result<(), TransitionError> {
        if self.style_assigned {
            return Err(TransitionError::StyleAlreadyAssigned);
        }
        self.style_name = name.into();
        self.style_assigned = true;
        Ok(())
    }

    /// Mark generation as started
    ///
    /// # Errors
    /// Illegal from a terminal status
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.next(Transition::Begin)?;
        Ok(())
    }

    /// Replace content with the full accumulation so far
    ///
    /// Each write carries the whole accumulation rather than a delta, so
    /// duplicates are harmless and an out-of-order shorter write is ignored.
    ///
    /// # Errors
    /// Illegal from a terminal status
    pub fn write_partial(&mut self, accumulated: String) -> Result<WriteOutcome, TransitionError> {
        let next = self.status.next(Transition::Chunk)?;
        if accumulated.len() < self.html.len() {
            return Ok(WriteOutcome::Stale);
        }
        self.status = next;
        self.html = accumulated;
        Ok(WriteOutcome::Applied)
    }

    /// Store normalized final content and its terminal status in one step
    ///
    /// # Errors
    /// Illegal from a terminal status
    pub fn finish(&mut self, html: String) -> Result<ArtifactStatus, TransitionError> {
        let empty = html.is_empty();
        self.status = self.status.next(Transition::Finish { empty })?;
        self.html = html;
        Ok(self.status)
    }

    /// Record a failed generation
    ///
    /// Partial content is kept for inspection; the status alone marks the
    /// failure.
    ///
    /// # Errors
    /// Illegal from a terminal status
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.next(Transition::Fail)?;
        Ok(())
    }

    /// Clear content and restart streaming (regeneration)
    ///
    /// # Errors
    /// Never fails today; kept fallible with the other transitions
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.next(Transition::Reset)?;
        self.html.clear();
        Ok(())
    }

    /// Overwrite with a chosen variation, forcing `Complete`
    ///
    /// # Errors
    /// Never fails today; kept fallible with the other transitions
    pub fn apply_variation(&mut self, html: String) -> Result<(), TransitionError> {
        self.status = self.status.next(Transition::ApplyVariation)?;
        self.html = html;
        Ok(())
    }
}
