//! Testing utilities for the Flash UI workspace
//!
//! Scripted in-memory provider, gates for holding streams open, and fixtures.


use async_trait::async_trait;
use flash_core::{
    FlashConfig, GenerationProvider, GenerationRequest, Orchestrator, ProviderError, TextStream,
};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Labels returned by the default naming response
pub const STYLE_LABELS: [&str; 4] = ["Neon Grid", "Paper Cut", "Soft Glass", "Mono Brutal"];

/// Default artifact stream: fenced markup in several fragments
pub const FENCED_CARD: [&str; 4] = ["```html\n", "<div class=\"card\">", "hello</div>", "\n```"];

/// Variation stream: objects split mid-token, prose, one incomplete object
pub const VARIATION_STREAM: [&str; 6] = [
    "Here are your variations:\n{\"name\": \"Asymmetric Grid\", \"ht",
    "ml\": \"<div class=\\\"grid\\\">A</div>\"}\n{\"name\": \"Kinetic Mob",
    "ile\", \"html\": \"<div>B</div>\"}\n{\"name\": \"\", \"html\": \"<p>nameless</p>\"}\n",
    "{\"title\": \"wrong shape\"}\n",
    "{\"name\": \"Risograph\", \"html\": \"<div style=\\\"a{}\\\">C</div>\"}\n",
    "{\"name\": \"Cut off\", \"html\": \"<di",
];

/// What a stream call does
#[derive(Debug, Clone)]
pub enum Script {
    /// Yield these fragments, then end
    Chunks(Vec<String>),
    /// Fail when the call is made
    FailAtStart(ProviderError),
    /// Yield these fragments, then fail
    FailAfter(Vec<String>, ProviderError),
}

impl Script {
    /// Fragments from string slices
    pub fn chunks<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(fragments.into_iter().map(Into::into).collect())
    }

    /// Stream that ends without text
    pub fn empty() -> Self {
        Self::Chunks(Vec::new())
    }

    fn into_items(self) -> Vec<Result<String, ProviderError>> {
        match self {
            Self::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            Self::FailAtStart(error) => vec![Err(error)],
            Self::FailAfter(chunks, error) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(error)))
                .collect(),
        }
    }
}

/// Holds gated streams until opened
#[derive(Debug, Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    /// Release every waiting and future stream
    pub fn open(&self) {
        self.tx.send_replace(true);
    }
}

/// In-memory provider with per-prompt scripts
///
/// Stream scripts are matched by substring against the request prompt, first
/// match wins. Streams yield to the scheduler between fragments so sibling
/// tasks interleave.
#[derive(Debug)]
pub struct ScriptedProvider {
    style_response: Result<String, ProviderError>,
    default_script: Script,
    scripts: Vec<(String, Script)>,
    missing_credential: bool,
    gate: Option<Arc<watch::Sender<bool>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    /// Provider answering with [`STYLE_LABELS`] and [`FENCED_CARD`]
    pub fn new() -> Self {
        Self {
            style_response: Ok(format!(
                "Here you go: [{}]",
                STYLE_LABELS
                    .iter()
                    .map(|l| format!("\"{l}\""))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            default_script: Script::chunks(FENCED_CARD),
            scripts: Vec::new(),
            missing_credential: false,
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Naming call answers with `text`
    #[must_use]
    pub fn with_style_response(mut self, text: impl Into<String>) -> Self {
        self.style_response = Ok(text.into());
        self
    }

    /// Naming call fails
    #[must_use]
    pub fn with_style_failure(mut self, error: ProviderError) -> Self {
        self.style_response = Err(error);
        self
    }

    /// Streams whose prompt contains `needle` follow `script`
    #[must_use]
    pub fn with_script(mut self, needle: impl Into<String>, script: Script) -> Self {
        self.scripts.push((needle.into(), script));
        self
    }

    /// Streams with no matching script follow `script`
    #[must_use]
    pub fn with_default_script(mut self, script: Script) -> Self {
        self.default_script = script;
        self
    }

    /// Report no credential
    #[must_use]
    pub fn without_credential(mut self) -> Self {
        self.missing_credential = true;
        self
    }

    /// Hold every stream before its first fragment until the gate opens
    pub fn gated(mut self) -> (Self, Gate) {
        let (tx, _rx) = watch::channel(false);
        let tx = Arc::new(tx);
        self.gate = Some(Arc::clone(&tx));
        (self, Gate { tx })
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    fn script_for(&self, prompt: &str) -> Script {
        self.scripts
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map_or_else(|| self.default_script.clone(), |(_, s)| s.clone())
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.missing_credential {
            Err(ProviderError::MissingCredential("GEMINI_API_KEY".into()))
        } else {
            Ok(())
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        self.requests.lock().push(request);
        self.style_response.clone()
    }

    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<TextStream, ProviderError> {
        let script = self.script_for(&request.prompt);
        self.requests.lock().push(request);

        if let Script::FailAtStart(error) = script {
            return Err(error);
        }

        let wait = self.gate.as_ref().map(|tx| tx.subscribe());
        let hold = stream::once(async move {
            if let Some(mut rx) = wait {
                let _ = rx.wait_for(|open| *open).await;
            }
        })
        .filter_map(|()| futures::future::ready(None::<Result<String, ProviderError>>));

        let fragments = stream::iter(script.into_items()).then(|item| async move {
            tokio::task::yield_now().await;
            item
        });

        Ok(hold.chain(fragments).boxed())
    }
}

/// Orchestrator over `provider` with default configuration
pub fn orchestrator(provider: ScriptedProvider) -> (Orchestrator, Arc<ScriptedProvider>) {
    orchestrator_with(FlashConfig::new(), provider)
}

/// Orchestrator over `provider` with `config`
///
/// # Panics
/// If `config` is invalid
pub fn orchestrator_with(
    config: FlashConfig,
    provider: ScriptedProvider,
) -> (Orchestrator, Arc<ScriptedProvider>) {
    let provider = Arc::new(provider);
    let orchestrator = Orchestrator::new(config, provider.clone()).expect("valid test config");
    (orchestrator, provider)
}
