//! Orchestrator: top-level actions over the session store
//!
//! Owns the busy gate, the navigation cursor and the open exploration.
//! Sessions and artifacts live in the shared [`SessionStore`]; every write a
//! task makes is keyed by ids captured when the task was launched, so late
//! writes from an older action land on their own artifact whatever the
//! cursor points at now.

use crate::busy::BusyFlag;
use crate::config::FlashConfig;
use crate::error::FlashError;
use crate::exploration::Exploration;
use crate::export::export_session;
use crate::generation::GenerationTask;
use crate::labels::{fallback_style_labels, resolve_style_labels, StyleLabels};
use crate::navigation::Cursor;
use crate::prompts;
use crate::provider::{GenerationProvider, GenerationRequest};
use crate::report::{ExplorationReport, SubmitReport, TaskReport};
use flash_artifact::{Artifact, ArtifactId, ComponentVariation, Session};
use flash_extract::{decode_object, json_objects};
use flash_store::{SessionStore, StoreEvent};
use futures::StreamExt;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Streaming generation orchestrator
pub struct Orchestrator {
    /// Configuration
    config: FlashConfig,
    /// Generation capability
    provider: Arc<dyn GenerationProvider>,
    /// Sessions and artifacts
    store: Arc<SessionStore>,
    /// Gate on starting top-level actions
    busy: BusyFlag,
    /// Current session and focused slot
    cursor: Mutex<Cursor>,
    /// Open variation exploration
    exploration: Mutex<Option<Exploration>>,
    /// Exploration generation counter
    epochs: AtomicU64,
}

impl Orchestrator {
    /// Create orchestrator with a fresh store
    ///
    /// # Errors
    /// [`FlashError::Configuration`] if `config` is invalid
    pub fn new(
        config: FlashConfig,
        provider: Arc<dyn GenerationProvider>,
    ) -> Result<Self, FlashError> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            store: Arc::new(SessionStore::new()),
            busy: BusyFlag::new(),
            cursor: Mutex::new(Cursor::new()),
            exploration: Mutex::new(None),
            epochs: AtomicU64::new(0),
        })
    }

    /// Use a shared store
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = store;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Session store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Subscribe to store change notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Whether a top-level action is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Submit a prompt: create a session and generate every slot
    ///
    /// Returns once all generation tasks have settled, whatever their
    /// individual outcomes.
    ///
    /// # Errors
    /// - [`FlashError::InvalidPrompt`] if the prompt is blank
    /// - [`FlashError::Busy`] if another action is in flight
    /// - [`FlashError::Configuration`] if the provider cannot make calls; no
    ///   session is created in that case
    pub async fn submit(&self, prompt: &str) -> Result<SubmitReport, FlashError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(FlashError::InvalidPrompt);
        }
        let _busy = self.busy.try_acquire().ok_or(FlashError::Busy)?;
        self.provider.ensure_configured()?;

        let slots = self.config.slot_count;
        let (index, session) =
            self.store
                .create_session(prompt, slots, &self.config.placeholder_label);
        let session_id = session.id();
        self.cursor.lock().select_session(index);
        tracing::info!(
            session = %session_id,
            index,
            slots,
            provider = self.provider.name(),
            "submission started"
        );

        let labels = self.style_labels(prompt).await;
        if let Err(error) = self.store.assign_style_names(session_id, &labels.labels) {
            tracing::error!(%error, "could not assign style labels");
        }

        let tasks = labels.labels.iter().enumerate().map(|(slot, label)| {
            let request = self.request(
                prompts::artifact(prompt, label),
                self.config.artifact_temperature,
            );
            GenerationTask::new(
                &self.store,
                self.provider.as_ref(),
                ArtifactId::new(session_id, slot),
                request,
            )
            .run()
        });
        let reports = futures::future::join_all(tasks).await;

        let report = SubmitReport {
            session: session_id,
            index,
            labels: labels.labels,
            labels_fell_back: labels.fell_back,
            tasks: reports,
        };
        tracing::info!(
            session = %session_id,
            completed = report.completed(),
            failed = report.failed(),
            "submission settled"
        );
        Ok(report)
    }

    /// Regenerate the focused artifact
    ///
    /// Clears its content, then streams a fresh design using the session's
    /// prompt and the artifact's label. Returns `Ok(None)` when nothing is
    /// focused or another action is in flight.
    ///
    /// # Errors
    /// [`FlashError::Configuration`] if the provider cannot make calls
    pub async fn regenerate(&self) -> Result<Option<TaskReport>, FlashError> {
        let Some((session, artifact)) = self.focused() else {
            tracing::debug!("regenerate ignored: nothing focused");
            return Ok(None);
        };
        let Some(_busy) = self.busy.try_acquire() else {
            tracing::debug!("regenerate ignored: busy");
            return Ok(None);
        };
        self.provider.ensure_configured()?;

        let id = artifact.id();
        self.store.reset(id)?;
        tracing::info!(artifact = %id, label = artifact.style_name(), "regenerating");

        let request = self.request(
            prompts::regeneration(session.prompt(), artifact.style_name()),
            self.config.artifact_temperature,
        );
        let report = GenerationTask::new(&self.store, self.provider.as_ref(), id, request)
            .run()
            .await;
        Ok(Some(report))
    }

    /// Stream alternate designs for the focused artifact
    ///
    /// Opens a new exploration (discarding any previous one) and appends each
    /// usable `{name, html}` object as it arrives. Returns `Ok(None)` when
    /// nothing is focused or another action is in flight.
    ///
    /// # Errors
    /// [`FlashError::Configuration`] if the provider cannot make calls
    pub async fn explore_variations(&self) -> Result<Option<ExplorationReport>, FlashError> {
        let Some((session, artifact)) = self.focused() else {
            tracing::debug!("exploration ignored: nothing focused");
            return Ok(None);
        };
        let Some(_busy) = self.busy.try_acquire() else {
            tracing::debug!("exploration ignored: busy");
            return Ok(None);
        };
        self.provider.ensure_configured()?;

        let target = artifact.id();
        let epoch = self.epochs.fetch_add(1, Ordering::Relaxed) + 1;
        *self.exploration.lock() = Some(Exploration::new(epoch, target));
        tracing::info!(artifact = %target, epoch, "exploring variations");

        let mut report = ExplorationReport::new(target);
        let request = self.request(
            prompts::variations(session.prompt(), self.config.variation_count),
            Some(self.config.variation_temperature),
        );
        let stream = match self.provider.generate_stream(request).await {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "variation call failed");
                report.error = Some(error.to_string());
                return Ok(Some(report));
            }
        };

        let mut objects = std::pin::pin!(json_objects(stream));
        while let Some(item) = objects.next().await {
            match item {
                Ok(value) => match decode_object::<ComponentVariation>(value) {
                    Ok(variation) if variation.is_usable() => {
                        if !self.push_variation(epoch, variation) {
                            report.closed_early = true;
                            break;
                        }
                        report.received += 1;
                    }
                    Ok(_) => report.dropped += 1,
                    Err(error) => {
                        tracing::debug!(%error, "dropping variation object");
                        report.dropped += 1;
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "variation stream failed");
                    report.error = Some(error.to_string());
                    break;
                }
            }
        }

        tracing::info!(
            artifact = %target,
            received = report.received,
            dropped = report.dropped,
            "exploration settled"
        );
        Ok(Some(report))
    }

    /// Overwrite the exploration's target with variation `index`
    ///
    /// Forces the artifact to `Complete` and closes the exploration.
    ///
    /// # Errors
    /// - [`FlashError::NoExploration`] if none is open
    /// - [`FlashError::VariationOutOfRange`] if `index` has not arrived
    pub fn apply_variation(&self, index: usize) -> Result<ArtifactId, FlashError> {
        let (target, html) = {
            let guard = self.exploration.lock();
            let exploration = guard.as_ref().ok_or(FlashError::NoExploration)?;
            let variation =
                exploration
                    .get(index)
                    .ok_or_else(|| FlashError::VariationOutOfRange {
                        index,
                        available: exploration.variations().len(),
                    })?;
            (exploration.target(), variation.html.clone())
        };

        self.store.apply_variation(target, html)?;
        self.close_exploration();
        tracing::info!(artifact = %target, index, "variation applied");
        Ok(target)
    }

    /// Apply the variation on display
    ///
    /// # Errors
    /// As [`Self::apply_variation`]
    pub fn apply_active_variation(&self) -> Result<ArtifactId, FlashError> {
        let index = self
            .exploration
            .lock()
            .as_ref()
            .map(Exploration::active_index)
            .ok_or(FlashError::NoExploration)?;
        self.apply_variation(index)
    }

    /// Move the displayed variation by `step`, wrapping around
    ///
    /// # Errors
    /// - [`FlashError::NoExploration`] if none is open
    /// - [`FlashError::VariationOutOfRange`] while nothing has arrived
    pub fn cycle_variation(&self, step: isize) -> Result<usize, FlashError> {
        let mut guard = self.exploration.lock();
        let exploration = guard.as_mut().ok_or(FlashError::NoExploration)?;
        exploration
            .cycle(step)
            .ok_or(FlashError::VariationOutOfRange {
                index: 0,
                available: 0,
            })
    }

    /// Discard the open exploration; returns whether one was open
    pub fn close_exploration(&self) -> bool {
        self.exploration.lock().take().is_some()
    }

    /// Variations received so far
    #[must_use]
    pub fn variations(&self) -> Vec<ComponentVariation> {
        self.exploration
            .lock()
            .as_ref()
            .map(|e| e.variations().to_vec())
            .unwrap_or_default()
    }

    /// Variation on display and its index
    #[must_use]
    pub fn active_variation(&self) -> Option<(usize, ComponentVariation)> {
        let guard = self.exploration.lock();
        let exploration = guard.as_ref()?;
        exploration
            .active()
            .map(|v| (exploration.active_index(), v.clone()))
    }

    /// Artifact the open exploration targets
    #[must_use]
    pub fn exploration_target(&self) -> Option<ArtifactId> {
        self.exploration.lock().as_ref().map(Exploration::target)
    }

    /// Current session's prompt for re-editing; clears focus
    #[must_use]
    pub fn edit_prompt(&self) -> Option<String> {
        let session = self.current_session()?;
        self.cursor.lock().clear_focus();
        Some(session.prompt().to_string())
    }

    /// Snapshot of the current session
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        let index = self.cursor.lock().session()?;
        self.store.session_at(index)
    }

    /// Index of the current session
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.lock().session()
    }

    /// Focused slot in the current session
    #[must_use]
    pub fn focused_slot(&self) -> Option<usize> {
        self.cursor.lock().focus()
    }

    /// Snapshot of the focused artifact
    #[must_use]
    pub fn focused_artifact(&self) -> Option<Artifact> {
        self.focused().map(|(_, artifact)| artifact)
    }

    /// Make session `index` current and drop focus
    ///
    /// # Errors
    /// [`FlashError::NoSession`] if no session has that index
    pub fn select_session(&self, index: usize) -> Result<(), FlashError> {
        if index >= self.store.len() {
            return Err(FlashError::NoSession);
        }
        self.cursor.lock().select_session(index);
        Ok(())
    }

    /// Focus a slot of the current session
    ///
    /// # Errors
    /// - [`FlashError::NoSession`] if no session is current
    /// - [`FlashError::SlotOutOfRange`] if the session has no such slot
    pub fn focus(&self, slot: usize) -> Result<(), FlashError> {
        let session = self.current_session().ok_or(FlashError::NoSession)?;
        if slot >= session.len() {
            return Err(FlashError::SlotOutOfRange {
                slot,
                slots: session.len(),
            });
        }
        self.cursor.lock().set_focus(slot);
        Ok(())
    }

    /// Drop focus
    pub fn unfocus(&self) {
        self.cursor.lock().clear_focus();
    }

    /// Step forward through slots (when focused) or sessions
    pub fn next(&self) -> bool {
        let sessions = self.store.len();
        let slots = self
            .current_session()
            .map_or(self.config.slot_count, |s| s.len());
        self.cursor.lock().next(sessions, slots)
    }

    /// Step backward through slots (when focused) or sessions
    pub fn prev(&self) -> bool {
        self.cursor.lock().prev()
    }

    /// Write the current session's artifacts into `dir`
    ///
    /// # Errors
    /// [`FlashError::NoSession`] or filesystem failures
    pub async fn export_current(&self, dir: &Path) -> Result<PathBuf, FlashError> {
        let session = self.current_session().ok_or(FlashError::NoSession)?;
        export_session(&session, dir).await
    }

    fn focused(&self) -> Option<(Session, Artifact)> {
        let cursor = *self.cursor.lock();
        let session = self.store.session_at(cursor.session()?)?;
        let artifact = session.artifact(cursor.focus()?)?.clone();
        Some((session, artifact))
    }

    fn push_variation(&self, epoch: u64, variation: ComponentVariation) -> bool {
        match self.exploration.lock().as_mut() {
            Some(exploration) if exploration.epoch() == epoch => {
                tracing::debug!(name = %variation.name, "variation received");
                exploration.push(variation);
                true
            }
            _ => false,
        }
    }

    async fn style_labels(&self, prompt: &str) -> StyleLabels {
        let slots = self.config.slot_count;
        let prefix = &self.config.fallback_label_prefix;
        let request = self.request(prompts::style_names(prompt, slots), None);

        match self.provider.generate(request).await {
            Ok(text) => resolve_style_labels(&text, slots, prefix),
            Err(error) => {
                tracing::warn!(%error, "style naming call failed, using generic labels");
                fallback_style_labels(slots, prefix)
            }
        }
    }

    fn request(&self, prompt: String, temperature: Option<f32>) -> GenerationRequest {
        GenerationRequest::new(prompt)
            .with_model(self.config.model.clone())
            .with_temperature_opt(temperature)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .field("sessions", &self.store.len())
            .field("busy", &self.busy.is_busy())
            .field("cursor", &*self.cursor.lock())
            .finish_non_exhaustive()
    }
}
