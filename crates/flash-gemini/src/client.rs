//! HTTP client implementing the generation capability

use std::collections::VecDeque;

use async_trait::async_trait;
use flash_core::{GenerationProvider, GenerationRequest, ProviderError, TextStream};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::config::{GeminiConfig, API_KEY_VARS};
use crate::payload::{parse_error_body, response_text, ContentRequest};
use crate::sse::SseDecoder;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` provider
#[derive(Debug)]
pub struct GeminiProvider {
    http: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Provider over `config`
    ///
    /// # Errors
    /// [`ProviderError::Transport`] when the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Provider with the key taken from the environment
    ///
    /// # Errors
    /// See [`GeminiProvider::new`]
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(GeminiConfig::from_env())
    }

    /// Transport configuration in use
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Endpoint for `method` on the request's model.
    pub fn endpoint(&self, request: &GenerationRequest, method: &str) -> String {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        format!(
            "{}/models/{model}:{method}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Unsent request for `request`, streaming or single-response
    ///
    /// # Errors
    /// [`ProviderError::MissingCredential`] when no key is configured
    pub fn build_request(
        &self,
        request: &GenerationRequest,
        streaming: bool,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let key = self.api_key()?;
        let builder = if streaming {
            self.http
                .post(self.endpoint(request, "streamGenerateContent"))
                .query(&[("alt", "sse")])
        } else {
            self.http.post(self.endpoint(request, "generateContent"))
        };
        Ok(builder
            .header(API_KEY_HEADER, key)
            .json(&ContentRequest::from(request)))
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential(API_KEY_VARS.join(" or ")))
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        streaming: bool,
    ) -> Result<Response, ProviderError> {
        let response = self
            .build_request(request, streaming)?
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        Err(ProviderError::Status {
            code: status.as_u16(),
            body: parse_error_body(&body),
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        debug!(model = ?request.model, "generateContent");
        let response = self.send(&request, false).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        response_text(&value)
    }

    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<TextStream, ProviderError> {
        debug!(model = ?request.model, "streamGenerateContent");
        let response = self.send(&request, true).await?;
        Ok(text_fragments(response.bytes_stream().boxed()))
    }
}

struct FrameState<B> {
    bytes: B,
    decoder: SseDecoder,
    ready: VecDeque<Result<String, ProviderError>>,
    done: bool,
}

impl<B> FrameState<B> {
    /// Queue the text of one frame payload; stops the stream on failure.
    fn accept(&mut self, payload: &str) {
        if self.done {
            return;
        }
        let text = serde_json::from_str::<Value>(payload)
            .map_err(|e| ProviderError::Stream(format!("malformed frame: {e}")))
            .and_then(|value| response_text(&value));
        match text {
            Ok(text) if text.is_empty() => {}
            Ok(text) => self.ready.push_back(Ok(text)),
            Err(error) => {
                self.ready.push_back(Err(error));
                self.done = true;
            }
        }
    }
}

/// Turn an SSE byte stream into text fragments.
///
/// Frames with no text are skipped. The first failure, in transport or in a
/// frame, is yielded and ends the stream.
pub fn text_fragments<C, E>(bytes: BoxStream<'static, Result<C, E>>) -> TextStream
where
    C: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = FrameState {
        bytes,
        decoder: SseDecoder::default(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for payload in state.decoder.feed(chunk.as_ref()) {
                        state.accept(&payload);
                    }
                }
                Some(Err(error)) => {
                    state.ready.push_back(Err(ProviderError::Transport(error.to_string())));
                    state.done = true;
                }
                None => {
                    if let Some(payload) = state.decoder.finish() {
                        state.accept(&payload);
                    }
                    state.done = true;
                }
            }
        }
    })
    .boxed()
}
