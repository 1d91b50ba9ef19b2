//! Flash Extract
//!
//! Recovers structured values from text that a generative model is still
//! producing.
//!
//! # Core Concepts
//!
//! - [`JsonObjectExtractor`]: restartable scanner that emits every `{...}`
//!   object as soon as its closing brace arrives
//! - [`json_objects`]: lazy stream adapter over any fragment stream
//! - [`extract_string_array`]: pulls a JSON array of strings out of free text
//!
//! # Example
//!
//! ```rust
//! use flash_extract::JsonObjectExtractor;
//!
//! let mut extractor = JsonObjectExtractor::new();
//! assert!(extractor.push(r#"{"name": "Ri"#).is_empty());
//! let values = extractor.push(r#"so"}{"name": "Grid"}"#);
//! assert_eq!(values.len(), 2);
//! ```

#![warn(unreachable_pub)]

mod array;
mod error;
mod extractor;
mod stream;

pub use array::{bracket_span, extract_string_array};
pub use error::ParseError;
pub use extractor::{ExtractorStats, JsonObjectExtractor, ScanMode};
pub use stream::json_objects;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode an extracted value into a typed record
///
/// # Errors
/// Returns [`ParseError::Shape`] when the value does not match `T`
pub fn decode_object<T: DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::Shape(e.to_string()))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
