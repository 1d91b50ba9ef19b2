//! Transient variation list for one exploration

use flash_artifact::{ArtifactId, ComponentVariation};

/// Variations proposed for one artifact
///
/// The target is captured when the exploration starts, so moving focus while
/// variations stream in does not change which artifact an apply overwrites.
#[derive(Debug, Clone)]
pub struct Exploration {
    epoch: u64,
    target: ArtifactId,
    variations: Vec<ComponentVariation>,
    active: usize,
}

impl Exploration {
    /// Open an exploration for `target`
    #[must_use]
    pub fn new(epoch: u64, target: ArtifactId) -> Self {
        Self {
            epoch,
            target,
            variations: Vec::new(),
            active: 0,
        }
    }

    /// Exploration generation number
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Artifact a chosen variation will overwrite
    #[inline]
    #[must_use]
    pub fn target(&self) -> ArtifactId {
        self.target
    }

    /// Variations received so far, in arrival order
    #[inline]
    #[must_use]
    pub fn variations(&self) -> &[ComponentVariation] {
        &self.variations
    }

    /// Index of the variation on display
    #[inline]
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Variation on display
    #[must_use]
    pub fn active(&self) -> Option<&ComponentVariation> {
        self.variations.get(self.active)
    }

    /// Append a decoded variation
    pub fn push(&mut self, variation: ComponentVariation) {
        self.variations.push(variation);
    }

    /// Move the displayed variation by `step`, wrapping around
    ///
    /// Returns the new index, or `None` while nothing has arrived.
    pub fn cycle(&mut self, step: isize) -> Option<usize> {
        let len = self.variations.len();
        if len == 0 {
            return None;
        }
        let len = isize::try_from(len).ok()?;
        let current = isize::try_from(self.active).ok()?;
        let next = (current + step).rem_euclid(len);
        self.active = usize::try_from(next).ok()?;
        Some(self.active)
    }

    /// Variation by index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ComponentVariation> {
        self.variations.get(index)
    }
}
