//! `generateContent` request bodies and response text extraction

use flash_core::{GenerationRequest, ProviderError};
use serde::Serialize;
use serde_json::Value;

/// `generateContent` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// Conversation turns; always one user turn here
    pub contents: Vec<Content>,
    /// Sampling settings, omitted for provider defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// `user` or `model`
    pub role: String,
    /// Text parts of the turn
    pub parts: Vec<Part>,
}

/// Text part
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    /// Part text
    pub text: String,
}

/// Sampling settings
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
}

impl From<&GenerationRequest> for ContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: request
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

/// Text of one response body or stream frame.
///
/// Concatenates every text part of every candidate. A body carrying an
/// `error` object is a failure.
pub fn response_text(value: &Value) -> Result<String, ProviderError> {
    if let Some(message) = error_message(value) {
        return Err(ProviderError::Stream(message));
    }

    let mut text = String::new();
    let candidates = value
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for candidate in candidates {
        let parts = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for part in parts {
            if let Some(fragment) = part.get("text").and_then(Value::as_str) {
                text.push_str(fragment);
            }
        }
    }
    Ok(text)
}

/// Message of an `{"error": {...}}` body, if any.
pub fn error_message(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(message)
}

/// Message of a non-success body, falling back to the raw text.
pub fn parse_error_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let request = GenerationRequest::new("a login form").with_temperature(1.2);
        let body = serde_json::to_value(ContentRequest::from(&request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a login form");
        assert!(body["generationConfig"]["temperature"].as_f64().is_some());

        let plain = serde_json::to_value(ContentRequest::from(&GenerationRequest::new("p"))).unwrap();
        assert!(plain.get("generationConfig").is_none());
    }

    #[test]
    fn text_joins_parts() {
        let value = json!({
            "candidates": [
                {"content": {"parts": [{"text": "<div>"}, {"text": "hi"}]}},
                {"content": {"parts": [{"text": "</div>"}]}}
            ]
        });
        assert_eq!(response_text(&value).unwrap(), "<div>hi</div>");
    }

    #[test]
    fn frame_without_text_is_empty() {
        let value = json!({"usageMetadata": {"promptTokenCount": 3}});
        assert_eq!(response_text(&value).unwrap(), "");
    }

    #[test]
    fn error_payload_fails() {
        let value = json!({"error": {"code": 429, "message": "quota exceeded"}});
        assert_eq!(
            response_text(&value),
            Err(ProviderError::Stream("quota exceeded".into()))
        );
    }

    #[test]
    fn error_body_falls_back_to_raw_text() {
        assert_eq!(
            parse_error_body(r#"{"error": {"message": "bad key"}}"#),
            "bad key"
        );
        assert_eq!(parse_error_body(" upstream down \n"), "upstream down");
    }
}
