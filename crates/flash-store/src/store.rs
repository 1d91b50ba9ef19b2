//! Session store

use crate::error::StoreError;
use dashmap::DashMap;
use flash_artifact::{
    Artifact, ArtifactId, ArtifactStatus, Session, SessionId, TransitionError, WriteOutcome,
};
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Default change-notification buffer
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Change notification for renderers and observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A session was appended at `index`
    SessionCreated {
        /// New session
        session: SessionId,
        /// Position in creation order
        index: usize,
    },
    /// Style labels were written onto a session's artifacts
    StylesAssigned {
        /// Labelled session
        session: SessionId,
    },
    /// One artifact changed
    ArtifactUpdated {
        /// Changed artifact
        artifact: ArtifactId,
        /// Status after the change
        status: ArtifactStatus,
        /// Stored markup length in bytes
        html_len: usize,
    },
}

/// Append-only, id-addressed store of sessions
///
/// Sessions are never removed. Reads return snapshots; writes go through the
/// artifact state machine and are keyed by ids captured when the writer was
/// launched, never by positions in a snapshot.
#[derive(Debug)]
pub struct SessionStore {
    /// Creation order
    order: RwLock<Vec<SessionId>>,
    /// Sessions by id
    sessions: DashMap<SessionId, Session>,
    /// Change notifications
    events: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create empty store with a custom notification buffer
    #[must_use]
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            order: RwLock::new(Vec::new()),
            sessions: DashMap::new(),
            events,
        }
    }

    /// Subscribe to change notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Append a new session of `slots` placeholders
    ///
    /// Returns the new session's index and a snapshot of it.
    pub fn create_session(
        &self,
        prompt: &str,
        slots: usize,
        placeholder_label: &str,
    ) -> (usize, Session) {
        let session = Session::new(prompt, slots, placeholder_label);
        let id = session.id();

        let index = {
            let mut order = self.order.write();
            self.sessions.insert(id, session.clone());
            order.push(id);
            order.len() - 1
        };

        tracing::debug!(session = %id, index, slots, "session created");
        self.notify(StoreEvent::SessionCreated { session: id, index });
        (index, session)
    }

    /// Number of sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    /// Whether no session exists yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.read().is_empty()
    }

    /// Session snapshot by id
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<Session> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Session id at a creation-order index
    #[must_use]
    pub fn session_id_at(&self, index: usize) -> Option<SessionId> {
        self.order.read().get(index).copied()
    }

    /// Session snapshot at a creation-order index
    #[must_use]
    pub fn session_at(&self, index: usize) -> Option<Session> {
        self.session_id_at(index).and_then(|id| self.session(id))
    }

    /// Snapshots of all sessions in creation order
    #[must_use]
    pub fn sessions(&self) -> Vec<Session> {
        let order = self.order.read().clone();
        order.into_iter().filter_map(|id| self.session(id)).collect()
    }

    /// Artifact snapshot by id
    #[must_use]
    pub fn artifact(&self, id: ArtifactId) -> Option<Artifact> {
        self.sessions
            .get(&id.session)
            .and_then(|session| session.artifact(id.slot).cloned())
            .filter(|artifact| artifact.id() == id)
    }

    /// Write style labels onto a session's artifacts in slot order
    ///
    /// # Errors
    /// - [`StoreError::LabelCountMismatch`] unless one label per slot is given
    /// - [`StoreError::Transition`] if any artifact was already named; no
    ///   label is written in that case
    pub fn assign_style_names(
        &self,
        session: SessionId,
        labels: &[String],
    ) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&session)
            .ok_or(StoreError::SessionNotFound(session))?;

        if labels.len() != entry.len() {
            return Err(StoreError::LabelCountMismatch {
                expected: entry.len(),
                actual: labels.len(),
            });
        }

        if let Some(named) = entry.artifacts().iter().find(|a| a.style_assigned()) {
            return Err(StoreError::Transition {
                artifact: named.id(),
                source: TransitionError::StyleAlreadyAssigned,
            });
        }

        for (slot, label) in labels.iter().enumerate() {
            let id = ArtifactId::new(session, slot);
            if let Some(artifact) = entry.artifact_mut(id) {
                artifact
                    .assign_style(label.clone())
                    .map_err(|source| StoreError::Transition { artifact: id, source })?;
            }
        }
        drop(entry);

        self.notify(StoreEvent::StylesAssigned { session });
        Ok(())
    }

    /// Mark an artifact's generation as started
    ///
    /// # Errors
    /// Unknown ids or a terminal artifact
    pub fn begin(&self, id: ArtifactId) -> Result<(), StoreError> {
        self.update(id, Artifact::begin)
    }

    /// Replace an artifact's content with the full accumulation so far
    ///
    /// # Errors
    /// Unknown ids or a terminal artifact
    pub fn write_partial(
        &self,
        id: ArtifactId,
        accumulated: String,
    ) -> Result<WriteOutcome, StoreError> {
        let outcome = self.update(id, |artifact| artifact.write_partial(accumulated))?;
        if outcome == WriteOutcome::Stale {
            tracing::trace!(artifact = %id, "ignored stale partial write");
        }
        Ok(outcome)
    }

    /// Store final content and terminal status atomically
    ///
    /// # Errors
    /// Unknown ids or a terminal artifact
    pub fn finish(&self, id: ArtifactId, html: String) -> Result<ArtifactStatus, StoreError> {
        self.update(id, |artifact| artifact.finish(html))
    }

    /// Mark an artifact as failed
    ///
    /// # Errors
    /// Unknown ids or a terminal artifact
    pub fn fail(&self, id: ArtifactId) -> Result<(), StoreError> {
        self.update(id, Artifact::fail)
    }

    /// Clear content and restart streaming
    ///
    /// # Errors
    /// Unknown ids
    pub fn reset(&self, id: ArtifactId) -> Result<(), StoreError> {
        self.update(id, Artifact::reset)
    }

    /// Overwrite content with a variation, forcing Complete
    ///
    /// # Errors
    /// Unknown ids
    pub fn apply_variation(&self, id: ArtifactId, html: String) -> Result<(), StoreError> {
        self.update(id, |artifact| artifact.apply_variation(html))
    }

    /// Apply one state-machine operation to one artifact
    fn update<T>(
        &self,
        id: ArtifactId,
        op: impl FnOnce(&mut Artifact) -> Result<T, TransitionError>,
    ) -> Result<T, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&id.session)
            .ok_or(StoreError::SessionNotFound(id.session))?;
        let artifact = entry
            .artifact_mut(id)
            .ok_or(StoreError::ArtifactNotFound(id))?;

        let value = op(artifact).map_err(|source| StoreError::Transition { artifact: id, source })?;
        let event = StoreEvent::ArtifactUpdated {
            artifact: id,
            status: artifact.status(),
            html_len: artifact.html().len(),
        };
        drop(entry);

        self.notify(event);
        Ok(value)
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is normal.
        let _ = self.events.send(event);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn sessions_are_appended_in_order() {
        let store = SessionStore::new();
        let (i0, s0) = store.create_session("first", 4, "Designing...");
        let (i1, s1) = store.create_session("second", 4, "Designing...");

        assert_eq!((i0, i1), (0, 1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.session_at(0).unwrap().id(), s0.id());
        assert_eq!(store.session_at(1).unwrap().prompt(), "second");
        assert_eq!(store.sessions()[1].id(), s1.id());
        assert!(store.session_at(2).is_none());
    }

    #[test]
    fn assign_labels_once() {
        let store = SessionStore::new();
        let (_, session) = store.create_session("p", 2, "Designing...");

        store
            .assign_style_names(session.id(), &labels(&["Neon", "Paper"]))
            .unwrap();
        let a1 = store.artifact(ArtifactId::new(session.id(), 1)).unwrap();
        assert_eq!(a1.style_name(), "Paper");

        let again = store.assign_style_names(session.id(), &labels(&["X", "Y"]));
        assert!(matches!(
            again,
            Err(StoreError::Transition {
                source: TransitionError::StyleAlreadyAssigned,
                ..
            })
        ));
        let a0 = store.artifact(ArtifactId::new(session.id(), 0)).unwrap();
        assert_eq!(a0.style_name(), "Neon");
    }

    #[test]
    fn label_count_must_match() {
        let store = SessionStore::new();
        let (_, session) = store.create_session("p", 4, "Designing...");
        let result = store.assign_style_names(session.id(), &labels(&["only one"]));
        assert_eq!(
            result,
            Err(StoreError::LabelCountMismatch {
                expected: 4,
                actual: 1
            })
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let store = SessionStore::new();
        let missing = ArtifactId::new(SessionId::new(), 0);
        assert_eq!(
            store.fail(missing),
            Err(StoreError::SessionNotFound(missing.session))
        );

        let (_, session) = store.create_session("p", 2, "x");
        let out_of_range = ArtifactId::new(session.id(), 9);
        assert_eq!(
            store.fail(out_of_range),
            Err(StoreError::ArtifactNotFound(out_of_range))
        );
    }

    #[test]
    fn write_after_finish_is_superseded() {
        let store = SessionStore::new();
        let (_, session) = store.create_session("p", 1, "x");
        let id = ArtifactId::new(session.id(), 0);

        store.write_partial(id, "<p".into()).unwrap();
        assert_eq!(store.finish(id, "<p/>".into()), Ok(ArtifactStatus::Complete));

        let late = store.write_partial(id, "<p/> and more".into()).unwrap_err();
        assert!(late.is_superseded());
        assert_eq!(store.artifact(id).unwrap().html(), "<p/>");
    }

    #[tokio::test]
    async fn events_are_broadcast() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        let (_, session) = store.create_session("p", 1, "x");
        let id = ArtifactId::new(session.id(), 0);
        store.write_partial(id, "<p>".into()).unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::SessionCreated {
                session: session.id(),
                index: 0
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::ArtifactUpdated {
                artifact: id,
                status: ArtifactStatus::Streaming,
                html_len: 3
            }
        );
    }
}
