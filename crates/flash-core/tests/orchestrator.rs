//! Submission, regeneration and navigation against a scripted provider

use flash_artifact::{ArtifactId, ArtifactStatus};
use flash_core::{FlashConfig, FlashError, ProviderError, TaskOutcome};
use flash_store::StoreEvent;
use flash_test_utils::{orchestrator, orchestrator_with, Script, ScriptedProvider, STYLE_LABELS};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn login_form_settles_every_slot() {
    let (orch, provider) = orchestrator(ScriptedProvider::new());

    let report = orch.submit("  a login form  ").await.unwrap();

    assert_eq!(report.index, 0);
    assert_eq!(report.labels, STYLE_LABELS.to_vec());
    assert!(!report.labels_fell_back);
    assert_eq!(report.completed(), 4);

    let session = orch.current_session().unwrap();
    assert_eq!(session.id(), report.session);
    assert_eq!(session.prompt(), "a login form");
    assert_eq!(session.len(), 4);
    for (slot, artifact) in session.artifacts().iter().enumerate() {
        assert_eq!(artifact.status(), ArtifactStatus::Complete);
        assert_eq!(artifact.style_name(), STYLE_LABELS[slot]);
        assert_eq!(artifact.html(), "<div class=\"card\">hello</div>");
    }
    assert!(!orch.is_busy());

    // One naming call plus one stream per slot, all on the configured model.
    let requests = provider.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests[0].prompt.contains("a login form"));
    assert!(requests
        .iter()
        .all(|r| r.model.as_deref() == Some("gemini-3-flash-preview")));
    for label in STYLE_LABELS {
        assert!(requests.iter().any(|r| r.prompt.contains(label)));
    }
}

#[tokio::test]
async fn placeholders_stream_before_content_arrives() {
    let (provider, gate) = ScriptedProvider::new().gated();
    let (orch, _) = orchestrator(provider);

    let observe = async {
        while orch.current_session().is_none() {
            tokio::task::yield_now().await;
        }
        let session = orch.current_session().unwrap();
        assert!(orch.is_busy());
        assert!(session
            .artifacts()
            .iter()
            .all(|a| a.status() == ArtifactStatus::Streaming && a.html().is_empty()));
        gate.open();
    };

    let (report, ()) = tokio::join!(orch.submit("a login form"), observe);
    let report = report.unwrap();

    let session = orch.store().session(report.session).unwrap();
    assert!(session.is_settled());
}

#[tokio::test]
async fn naming_failure_still_labels_every_slot() {
    let provider = ScriptedProvider::new()
        .with_style_failure(ProviderError::Status {
            code: 503,
            body: "overloaded".into(),
        });
    let (orch, _) = orchestrator(provider);

    let report = orch.submit("a pricing table").await.unwrap();

    assert!(report.labels_fell_back);
    let session = orch.current_session().unwrap();
    let labels: Vec<_> = session.artifacts().iter().map(|a| a.style_name()).collect();
    assert_eq!(
        labels,
        vec!["Direction 1", "Direction 2", "Direction 3", "Direction 4"]
    );
}

#[tokio::test]
async fn short_label_list_falls_back() {
    let provider = ScriptedProvider::new().with_style_response(r#"["Only", "Two"]"#);
    let (orch, _) = orchestrator(provider);

    let report = orch.submit("a pricing table").await.unwrap();

    assert!(report.labels_fell_back);
    assert_eq!(report.labels[0], "Direction 1");
    assert!(report
        .tasks
        .iter()
        .all(|t| t.outcome == TaskOutcome::Complete));
}

#[tokio::test]
async fn blank_prompt_rejected_without_session() {
    let (orch, provider) = orchestrator(ScriptedProvider::new());

    assert!(matches!(orch.submit("   ").await, Err(FlashError::InvalidPrompt)));
    assert!(orch.store().is_empty());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn missing_credential_aborts_before_session() {
    let (orch, provider) = orchestrator(ScriptedProvider::new().without_credential());

    let err = orch.submit("a login form").await.unwrap_err();

    assert!(err.is_configuration());
    assert!(orch.store().is_empty());
    assert!(provider.requests().is_empty());
    assert!(!orch.is_busy());
}

#[tokio::test]
async fn concurrent_submit_is_refused_while_busy() {
    let (provider, gate) = ScriptedProvider::new().gated();
    let (orch, _) = orchestrator(provider);

    let second = async {
        while !orch.is_busy() {
            tokio::task::yield_now().await;
        }
        let refused = orch.submit("another prompt").await;
        gate.open();
        refused
    };

    let (first, second) = tokio::join!(orch.submit("a login form"), second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(FlashError::Busy)));
    assert_eq!(orch.store().len(), 1);
    assert!(!orch.is_busy());
}

#[tokio::test]
async fn sibling_failures_stay_isolated() {
    let provider = ScriptedProvider::new()
        .with_script(
            "Paper Cut",
            Script::FailAfter(
                vec!["<div>".into(), "partial".into()],
                ProviderError::Stream("connection reset".into()),
            ),
        )
        .with_script(
            "Soft Glass",
            Script::FailAtStart(ProviderError::Transport("dns failure".into())),
        )
        .with_script("Mono Brutal", Script::chunks(["  ", "```", "\n```"]));
    let (orch, _) = orchestrator(provider);

    let report = orch.submit("a settings panel").await.unwrap();

    assert_eq!(report.completed(), 1);
    assert!(matches!(report.tasks[1].outcome, TaskOutcome::Failed(_)));
    assert!(matches!(report.tasks[2].outcome, TaskOutcome::Failed(_)));
    assert_eq!(report.tasks[3].outcome, TaskOutcome::Empty);

    let session = orch.current_session().unwrap();
    let statuses: Vec<_> = session.artifacts().iter().map(|a| a.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ArtifactStatus::Complete,
            ArtifactStatus::Error,
            ArtifactStatus::Error,
            ArtifactStatus::Error,
        ]
    );
    assert_eq!(session.artifacts()[1].html(), "<div>partial");
    assert!(!orch.is_busy());
}

#[tokio::test]
async fn slot_count_follows_config() {
    let config = FlashConfig::new().with_slot_count(2);
    let provider = ScriptedProvider::new().with_style_response(r#"["A", "B", "C"]"#);
    let (orch, provider) = orchestrator_with(config, provider);

    let report = orch.submit("a toast").await.unwrap();

    assert_eq!(report.labels, vec!["A", "B"]);
    assert_eq!(orch.current_session().unwrap().len(), 2);
    assert!(provider.requests()[0].prompt.contains("2 short names"));
}

#[tokio::test]
async fn regenerate_resets_then_streams_fresh_content() {
    let provider = ScriptedProvider::new()
        .with_script("Do not repeat", Script::chunks(["<section>", "new</section>"]));
    let (orch, provider) = orchestrator(provider);
    orch.submit("a login form").await.unwrap();
    orch.focus(1).unwrap();

    let mut events = orch.subscribe();
    let report = orch.regenerate().await.unwrap().unwrap();

    let target = orch.focused_artifact().unwrap();
    assert_eq!(report.artifact, target.id());
    assert_eq!(report.outcome, TaskOutcome::Complete);
    assert_eq!(target.html(), "<section>new</section>");
    assert_eq!(target.status(), ArtifactStatus::Complete);
    assert_eq!(target.style_name(), "Paper Cut");

    // The first change is the reset: streaming with nothing stored.
    let first = events.recv().await.unwrap();
    assert_eq!(
        first,
        StoreEvent::ArtifactUpdated {
            artifact: target.id(),
            status: ArtifactStatus::Streaming,
            html_len: 0,
        }
    );

    let last = provider.requests().pop().unwrap();
    assert!(last.prompt.contains("a login form"));
    assert!(last.prompt.contains("Paper Cut"));

    // Siblings untouched.
    let sibling = orch
        .store()
        .artifact(ArtifactId::new(target.id().session, 0))
        .unwrap();
    assert_eq!(sibling.html(), "<div class=\"card\">hello</div>");
}

#[tokio::test]
async fn regenerate_after_error_can_complete() {
    let provider = ScriptedProvider::new()
        .with_script("Do not repeat", Script::chunks(["<p>second try</p>"]))
        .with_script(
            "Neon Grid",
            Script::FailAtStart(ProviderError::Transport("timeout".into())),
        );
    let (orch, _) = orchestrator(provider);
    orch.submit("a login form").await.unwrap();
    orch.focus(0).unwrap();
    assert_eq!(
        orch.focused_artifact().unwrap().status(),
        ArtifactStatus::Error
    );

    orch.regenerate().await.unwrap().unwrap();

    let artifact = orch.focused_artifact().unwrap();
    assert_eq!(artifact.status(), ArtifactStatus::Complete);
    assert_eq!(artifact.html(), "<p>second try</p>");
}

#[tokio::test]
async fn regenerate_without_focus_is_ignored() {
    let (orch, provider) = orchestrator(ScriptedProvider::new());
    assert!(orch.regenerate().await.unwrap().is_none());

    orch.submit("a login form").await.unwrap();
    let before = provider.requests().len();
    assert!(orch.regenerate().await.unwrap().is_none());
    assert_eq!(provider.requests().len(), before);
}

#[tokio::test]
async fn navigation_and_edit_prompt() {
    let (orch, _) = orchestrator(ScriptedProvider::new());
    assert!(!orch.next());

    orch.submit("first prompt").await.unwrap();
    orch.submit("second prompt").await.unwrap();
    assert_eq!(orch.current_index(), Some(1));

    assert!(!orch.next());
    assert!(orch.prev());
    assert_eq!(orch.current_session().unwrap().prompt(), "first prompt");
    assert!(!orch.prev());

    orch.focus(3).unwrap();
    assert!(!orch.next());
    assert!(orch.prev());
    assert_eq!(orch.focused_slot(), Some(2));
    assert_eq!(orch.current_index(), Some(0));

    assert!(matches!(
        orch.focus(4),
        Err(FlashError::SlotOutOfRange { slot: 4, slots: 4 })
    ));

    assert_eq!(orch.edit_prompt().as_deref(), Some("first prompt"));
    assert_eq!(orch.focused_slot(), None);

    assert!(orch.next());
    assert_eq!(orch.current_index(), Some(1));
    assert!(matches!(orch.select_session(5), Err(FlashError::NoSession)));
}

#[tokio::test]
async fn new_submission_clears_focus() {
    let (orch, _) = orchestrator(ScriptedProvider::new());
    orch.submit("first prompt").await.unwrap();
    orch.focus(2).unwrap();

    orch.submit("second prompt").await.unwrap();

    assert_eq!(orch.focused_slot(), None);
    assert_eq!(orch.current_index(), Some(1));
}

#[tokio::test]
async fn export_current_session() {
    let (orch, _) = orchestrator(ScriptedProvider::new());
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        orch.export_current(dir.path()).await,
        Err(FlashError::NoSession)
    ));

    let report = orch.submit("a login form").await.unwrap();
    let bundle = orch.export_current(dir.path()).await.unwrap();

    assert_eq!(
        bundle.file_name().unwrap().to_str().unwrap(),
        format!("flash_ui_{}", report.session)
    );
    let mut names: Vec<_> = std::fs::read_dir(&bundle)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "1_neon_grid.html",
            "2_paper_cut.html",
            "3_soft_glass.html",
            "4_mono_brutal.html",
        ]
    );
    let html = std::fs::read_to_string(bundle.join("2_paper_cut.html")).unwrap();
    assert_eq!(html, "<div class=\"card\">hello</div>");
}
