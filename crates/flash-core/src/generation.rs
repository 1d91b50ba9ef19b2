//! Generation task: one streamed call driving one artifact
//!
//! The task owns its artifact's writes from start to terminal status. Every
//! partial write carries the whole accumulation, keyed by the artifact id
//! captured at launch. A failure ends this task only; it is recorded on the
//! artifact and returned in the report, never raised to the caller.

use crate::normalize::normalize_markup;
use crate::provider::{GenerationProvider, GenerationRequest, ProviderError};
use crate::report::{TaskOutcome, TaskReport};
use flash_artifact::{ArtifactId, ArtifactStatus};
use flash_store::{SessionStore, StoreError};
use futures::StreamExt;
use tracing::Instrument;

/// One artifact's streamed generation
pub struct GenerationTask<'a> {
    store: &'a SessionStore,
    provider: &'a dyn GenerationProvider,
    artifact: ArtifactId,
    request: GenerationRequest,
}

impl<'a> GenerationTask<'a> {
    /// Create task for `artifact`
    #[must_use]
    pub fn new(
        store: &'a SessionStore,
        provider: &'a dyn GenerationProvider,
        artifact: ArtifactId,
        request: GenerationRequest,
    ) -> Self {
        Self {
            store,
            provider,
            artifact,
            request,
        }
    }

    /// Run to stream completion or failure
    pub async fn run(self) -> TaskReport {
        let span = tracing::info_span!(
            "generation",
            session = %self.artifact.session,
            artifact = self.artifact.slot,
        );
        self.drive().instrument(span).await
    }

    async fn drive(self) -> TaskReport {
        let id = self.artifact;
        let mut report = TaskReport {
            artifact: id,
            outcome: TaskOutcome::Complete,
            chunks: 0,
            bytes: 0,
        };

        if let Err(error) = self.store.begin(id) {
            report.outcome = self.stopped(&error);
            return report;
        }

        let mut stream = match self.provider.generate_stream(self.request.clone()).await {
            Ok(stream) => stream,
            Err(error) => {
                report.outcome = self.failed(&error);
                return report;
            }
        };

        let mut accumulated = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    report.chunks += 1;
                    if fragment.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&fragment);
                    if let Err(error) = self.store.write_partial(id, accumulated.clone()) {
                        report.outcome = self.stopped(&error);
                        return report;
                    }
                    tracing::trace!(len = accumulated.len(), "partial write");
                }
                Err(error) => {
                    report.outcome = self.failed(&error);
                    report.bytes = accumulated.len();
                    return report;
                }
            }
        }

        let html = normalize_markup(&accumulated);
        report.bytes = html.len();
        match self.store.finish(id, html) {
            Ok(ArtifactStatus::Complete) => {
                tracing::info!(chunks = report.chunks, bytes = report.bytes, "artifact complete");
                report.outcome = TaskOutcome::Complete;
            }
            Ok(status) => {
                tracing::warn!(%status, chunks = report.chunks, "stream produced no markup");
                report.outcome = TaskOutcome::Empty;
            }
            Err(error) => report.outcome = self.stopped(&error),
        }
        report
    }

    /// Record a call failure on the artifact
    fn failed(&self, error: &ProviderError) -> TaskOutcome {
        tracing::error!(%error, "generation failed");
        match self.store.fail(self.artifact) {
            Ok(()) => TaskOutcome::Failed(error.to_string()),
            Err(store_error) => self.stopped(&store_error),
        }
    }

    /// The store refused a write; stop without touching the artifact again
    fn stopped(&self, error: &StoreError) -> TaskOutcome {
        if error.is_superseded() {
            tracing::debug!(%error, "artifact moved on, task superseded");
            TaskOutcome::Superseded
        } else {
            tracing::error!(%error, "store rejected generation write");
            TaskOutcome::Failed(error.to_string())
        }
    }
}

impl std::fmt::Debug for GenerationTask<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationTask")
            .field("artifact", &self.artifact)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TextStream;
    use async_trait::async_trait;
    use futures::stream;

    /// Streams fixed fragments, optionally failing after them
    struct Fixed {
        fragments: Vec<&'static str>,
        fail_after: bool,
    }

    #[async_trait]
    impl GenerationProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<String, ProviderError> {
            Ok(self.fragments.concat())
        }

        async fn generate_stream(
            &self,
            _request: GenerationRequest,
        ) -> Result<TextStream, ProviderError> {
            let mut items: Vec<Result<String, ProviderError>> =
                self.fragments.iter().map(|f| Ok((*f).to_string())).collect();
            if self.fail_after {
                items.push(Err(ProviderError::Stream("connection reset".into())));
            }
            Ok(stream::iter(items).boxed())
        }
    }

    fn one_slot(store: &SessionStore) -> ArtifactId {
        let (_, session) = store.create_session("a login form", 1, "Designing...");
        ArtifactId::new(session.id(), 0)
    }

    #[tokio::test]
    async fn fenced_stream_completes_normalized() {
        let store = SessionStore::new();
        let id = one_slot(&store);
        let provider = Fixed {
            fragments: vec!["```html\n<form>", "</form>\n", "```"],
            fail_after: false,
        };

        let report = GenerationTask::new(&store, &provider, id, GenerationRequest::new("p"))
            .run()
            .await;

        assert_eq!(report.outcome, TaskOutcome::Complete);
        assert_eq!(report.chunks, 3);
        let artifact = store.artifact(id).unwrap();
        assert_eq!(artifact.html(), "<form></form>");
        assert_eq!(artifact.status(), ArtifactStatus::Complete);
    }

    #[tokio::test]
    async fn whitespace_only_output_is_error() {
        let store = SessionStore::new();
        let id = one_slot(&store);
        let provider = Fixed {
            fragments: vec!["  ", "\n```\n"],
            fail_after: false,
        };

        let report = GenerationTask::new(&store, &provider, id, GenerationRequest::new("p"))
            .run()
            .await;

        assert_eq!(report.outcome, TaskOutcome::Empty);
        assert_eq!(store.artifact(id).unwrap().status(), ArtifactStatus::Error);
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_content() {
        let store = SessionStore::new();
        let id = one_slot(&store);
        let provider = Fixed {
            fragments: vec!["<div>", "half"],
            fail_after: true,
        };

        let report = GenerationTask::new(&store, &provider, id, GenerationRequest::new("p"))
            .run()
            .await;

        assert!(matches!(report.outcome, TaskOutcome::Failed(_)));
        let artifact = store.artifact(id).unwrap();
        assert_eq!(artifact.status(), ArtifactStatus::Error);
        assert_eq!(artifact.html(), "<div>half");
    }

    #[tokio::test]
    async fn terminal_artifact_supersedes_task() {
        let store = SessionStore::new();
        let id = one_slot(&store);
        store.apply_variation(id, "<aside/>".into()).unwrap();
        let provider = Fixed {
            fragments: vec!["<div/>"],
            fail_after: false,
        };

        let report = GenerationTask::new(&store, &provider, id, GenerationRequest::new("p"))
            .run()
            .await;

        assert_eq!(report.outcome, TaskOutcome::Superseded);
        assert_eq!(store.artifact(id).unwrap().html(), "<aside/>");
    }
}
