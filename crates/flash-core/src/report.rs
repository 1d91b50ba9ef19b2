//! Outcome summaries for top-level actions

use flash_artifact::{ArtifactId, SessionId};

/// How one generation task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Non-empty markup stored, artifact `Complete`
    Complete,
    /// Stream ended with nothing usable, artifact `Error`
    Empty,
    /// The call failed, artifact `Error` with partial content kept
    Failed(String),
    /// The artifact was reset or overwritten under the task; writing stopped
    Superseded,
}

impl TaskOutcome {
    /// Whether the artifact ended with usable content
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Result of one generation task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Artifact written
    pub artifact: ArtifactId,
    /// How it ended
    pub outcome: TaskOutcome,
    /// Fragments received
    pub chunks: usize,
    /// Bytes of the final stored markup
    pub bytes: usize,
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    /// New session
    pub session: SessionId,
    /// Its index in creation order
    pub index: usize,
    /// Labels assigned in slot order
    pub labels: Vec<String>,
    /// Whether generic labels replaced the naming call's answer
    pub labels_fell_back: bool,
    /// One report per slot, in slot order
    pub tasks: Vec<TaskReport>,
}

impl SubmitReport {
    /// Tasks that ended `Complete`
    #[must_use]
    pub fn completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.outcome.is_complete()).count()
    }

    /// Tasks that did not end `Complete`
    #[must_use]
    pub fn failed(&self) -> usize {
        self.tasks.len() - self.completed()
    }
}

/// Result of one variation exploration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationReport {
    /// Artifact the variations were proposed for
    pub target: ArtifactId,
    /// Variations kept
    pub received: usize,
    /// Decoded objects without a usable name or markup
    pub dropped: usize,
    /// Call failure, if the stream broke
    pub error: Option<String>,
    /// The exploration was closed before its stream ended
    pub closed_early: bool,
}

impl ExplorationReport {
    pub(crate) fn new(target: ArtifactId) -> Self {
        Self {
            target,
            received: 0,
            dropped: 0,
            error: None,
            closed_early: false,
        }
    }
}
