//! Error types for extraction

/// Errors while recovering structured values from model output
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No `[` ... `]` span in the text
    #[error("no array span found in response")]
    NoArraySpan,

    /// A located span was not valid JSON
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Valid JSON with an unexpected shape
    #[error("unexpected shape: {0}")]
    Shape(String),
}
