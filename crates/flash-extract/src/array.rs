//! Array span extraction for short label lists

use crate::error::ParseError;

/// Text from the first `[` through the last `]`
///
/// Bracket-delimited and not nesting-aware: prose before and after the array
/// is ignored, but everything between the outermost brackets is kept.
#[must_use]
pub fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Locate and decode a JSON array of strings embedded in free text
///
/// # Errors
/// - [`ParseError::NoArraySpan`] if the text holds no bracketed span
/// - [`ParseError::InvalidJson`] if the span is not a JSON array of strings
pub fn extract_string_array(text: &str) -> Result<Vec<String>, ParseError> {
    let span = bracket_span(text).ok_or(ParseError::NoArraySpan)?;
    Ok(serde_json::from_str::<Vec<String>>(span)?)
}
