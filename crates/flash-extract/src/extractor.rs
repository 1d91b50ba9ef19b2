//! Incremental JSON object extractor
//!
//! Keeps one growing buffer across calls and emits each `{...}` object the
//! moment its closing brace is seen. Fragment boundaries never need to line up
//! with token or object boundaries.
//!
//! # Recovery
//!
//! A brace-matched span that fails to parse is abandoned: scanning resumes at
//! the next `{` strictly after the failed start, so one malformed span never
//! blocks the objects that follow it. A failed start is never rescanned, even
//! after more input arrives.
//!
//! In [`ScanMode::LiteralAware`] a stray unescaped `"` in model output can
//! leave a span that never closes. Once a complete non-empty object shows up
//! where the scan believes it is inside a string, the open span is abandoned
//! and scanning resumes at that object.

use serde_json::Value;

/// How braces are counted while looking for the end of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Braces inside JSON string literals are ignored (escapes honoured)
    #[default]
    LiteralAware,
    /// Every `{` and `}` counts, quoted or not
    BraceOnly,
}

/// Counters for one extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    /// Objects parsed and emitted
    pub objects_emitted: usize,
    /// Brace-matched spans that were not valid JSON
    pub malformed_spans: usize,
}

/// Restartable scanner over a growing text buffer
#[derive(Debug, Default)]
pub struct JsonObjectExtractor {
    buffer: String,
    /// Byte offset where the search for the next `{` resumes
    cursor: usize,
    mode: ScanMode,
    stats: ExtractorStats,
}

impl JsonObjectExtractor {
    /// Create extractor with literal-aware scanning
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create extractor with an explicit scan mode
    #[inline]
    #[must_use]
    pub fn with_mode(mode: ScanMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Append a fragment and drain every object that is now complete
    ///
    /// Returns objects in arrival order. An incomplete trailing object stays
    /// buffered until a later fragment closes it.
    pub fn push(&mut self, fragment: &str) -> Vec<Value> {
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);

        // Whitespace may belong to a string literal, but it can never close one.
        if fragment.trim().is_empty() {
            return Vec::new();
        }

        self.drain_complete()
    }

    fn drain_complete(&mut self) -> Vec<Value> {
        let mut emitted = Vec::new();

        loop {
            let Some(start) = find_open_brace(&self.buffer, self.cursor) else {
                self.cursor = self.buffer.len();
                break;
            };

            let Some(len) = matched_span_len(&self.buffer.as_bytes()[start..], self.mode) else {
                if let Some(resume) = self.recovery_point(start) {
                    tracing::debug!(
                        offset = start,
                        skipped = resume - start,
                        "skipping span with unbalanced quote"
                    );
                    self.stats.malformed_spans += 1;
                    self.cursor = resume;
                    continue;
                }
                // Still streaming; rescan from the same start next time.
                self.cursor = start;
                break;
            };

            let end = start + len;
            match serde_json::from_str::<Value>(&self.buffer[start..end]) {
                Ok(value) => {
                    self.buffer.drain(..end);
                    self.cursor = 0;
                    self.stats.objects_emitted += 1;
                    emitted.push(value);
                }
                Err(error) => {
                    tracing::debug!(
                        offset = start,
                        span_len = len,
                        %error,
                        "skipping malformed object span"
                    );
                    self.stats.malformed_spans += 1;
                    self.cursor = start + 1;
                }
            }
        }

        emitted
    }

    /// Start of a complete, non-empty object that literal-aware scanning from
    /// `start` sees inside a string literal.
    ///
    /// A non-empty object needs a quoted key, so it cannot sit inside a string
    /// of well-formed JSON: finding one means a stray quote upstream flipped
    /// the scan, and the span at `start` will never close.
    fn recovery_point(&self, start: usize) -> Option<usize> {
        if self.mode != ScanMode::LiteralAware {
            return None;
        }
        let bytes = self.buffer.as_bytes();
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &b) in bytes[start..].iter().enumerate() {
            if !in_string {
                in_string = b == b'"';
                continue;
            }
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            } else if b == b'{' {
                let at = start + offset;
                let Some(len) = matched_span_len(&bytes[at..], ScanMode::LiteralAware) else {
                    continue;
                };
                if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&self.buffer[at..at + len]) {
                    if !map.is_empty() {
                        return Some(at);
                    }
                }
            }
        }
        None
    }

    /// Text received but not yet consumed by an emitted object
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Extraction counters
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    /// Scan mode in use
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// End of input: returns the unterminated trailing text, if any
    ///
    /// The trailing text is dropped; this never yields a partial object.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        let rest = self.buffer.get(self.cursor..).unwrap_or_default();
        if rest.contains('{') {
            Some(rest.to_string())
        } else {
            None
        }
    }
}

fn find_open_brace(buffer: &str, from: usize) -> Option<usize> {
    buffer
        .as_bytes()
        .get(from..)?
        .iter()
        .position(|&b| b == b'{')
        .map(|pos| from + pos)
}

/// Length of the span from the opening brace at `bytes[0]` through its
/// matching close, or `None` if the close has not arrived yet.
///
/// Only ASCII bytes are inspected, so the returned length always lands on a
/// UTF-8 boundary.
fn matched_span_len(bytes: &[u8], mode: ScanMode) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if mode == ScanMode::LiteralAware => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn two_objects_in_one_fragment() {
        let mut extractor = JsonObjectExtractor::new();
        let values = extractor.push(r#"{"a":1}{"b":2}"#);
        assert_eq!(values, vec![json!({"a": 1}), json!({"b": 2})]);
        assert_eq!(extractor.stats().objects_emitted, 2);
        assert_eq!(extractor.pending(), "");
    }

    #[test]
    fn object_split_across_fragments() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor.push(r#"{"a""#).is_empty());
        assert_eq!(extractor.push(":1}"), vec![json!({"a": 1})]);
    }

    #[test]
    fn malformed_span_is_skipped() {
        let mut extractor = JsonObjectExtractor::new();
        let values = extractor.push(r#"{bad}{"a":1}"#);
        assert_eq!(values, vec![json!({"a": 1})]);
        assert_eq!(extractor.stats().malformed_spans, 1);
    }

    #[test]
    fn malformed_start_is_not_rescanned() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor.push("{bad}").is_empty());
        assert_eq!(extractor.stats().malformed_spans, 1);

        assert!(extractor.push(" more text ").is_empty());
        assert!(extractor.push("and more").is_empty());
        assert_eq!(extractor.stats().malformed_spans, 1);
    }

    #[test]
    fn prose_around_objects_is_ignored() {
        let mut extractor = JsonObjectExtractor::new();
        let values = extractor.push("Here you go:\n{\"n\":1}\nand\n{\"n\":2}\nDone.");
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn stray_close_brace_before_object() {
        let mut extractor = JsonObjectExtractor::new();
        assert_eq!(extractor.push(r#"} {"a":1}"#), vec![json!({"a": 1})]);
    }

    #[test]
    fn nested_objects_emit_outermost() {
        let mut extractor = JsonObjectExtractor::new();
        let values = extractor.push(r#"{"outer":{"inner":{"x":1}}}"#);
        assert_eq!(values, vec![json!({"outer": {"inner": {"x": 1}}})]);
    }

    #[test]
    fn literal_aware_ignores_quoted_braces() {
        let mut extractor = JsonObjectExtractor::new();
        let text = r#"{"name":"Brace","html":"<style>p}{</style>"}"#;
        let values = extractor.push(text);
        assert_eq!(values, vec![json!({"name": "Brace", "html": "<style>p}{</style>"})]);
    }

    #[test]
    fn literal_aware_handles_escaped_quotes() {
        let mut extractor = JsonObjectExtractor::new();
        let values = extractor.push(r#"{"html":"<a title=\"}\">x</a>"}"#);
        assert_eq!(values, vec![json!({"html": "<a title=\"}\">x</a>"})]);
    }

    #[test]
    fn unbalanced_quote_does_not_block_later_objects() {
        let mut extractor = JsonObjectExtractor::new();
        let values =
            extractor.push(r#"{"name":"Tall","html":"<p>5" tall</p>"}{"name":"B","html":"<b/>"}"#);
        assert_eq!(values, vec![json!({"name": "B", "html": "<b/>"})]);
        assert_eq!(extractor.stats().malformed_spans, 1);

        let values = extractor.push(r#"{"name":"C","html":"<i/>"}"#);
        assert_eq!(values, vec![json!({"name": "C", "html": "<i/>"})]);
    }

    #[test]
    fn unbalanced_quote_recovers_once_next_object_arrives() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor
            .push(r#"{"name":"Tall","html":"<p>5" tall</p>"}"#)
            .is_empty());
        assert!(extractor.push(r#"{"name":"B","#).is_empty());
        assert_eq!(
            extractor.push(r#""html":"<b/>"}"#),
            vec![json!({"name": "B", "html": "<b/>"})]
        );
    }

    #[test]
    fn empty_object_inside_open_string_does_not_trigger_recovery() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor.push(r#"{"name":"a}{}"#).is_empty());
        assert_eq!(
            extractor.push(r#"b","html":"<p/>"}"#),
            vec![json!({"name": "a}{}b", "html": "<p/>"})]
        );
        assert_eq!(extractor.stats().malformed_spans, 0);
    }

    #[test]
    fn quoted_close_brace_still_waits_for_rest_of_string() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor.push(r#"{"html":"<style>p}"#).is_empty());
        assert!(extractor.push(" h1{").is_empty());
        assert_eq!(
            extractor.push(r#"}</style>"}"#),
            vec![json!({"html": "<style>p} h1{}</style>"})]
        );
        assert_eq!(extractor.stats().malformed_spans, 0);
    }

    #[test]
    fn brace_only_miscounts_quoted_close_brace() {
        let mut extractor = JsonObjectExtractor::with_mode(ScanMode::BraceOnly);
        let values = extractor.push(r#"{"html":"}"}{"a":1}"#);
        assert_eq!(values, vec![json!({"a": 1})]);
        assert_eq!(extractor.stats().malformed_spans, 1);
    }

    #[test]
    fn brace_only_balanced_css_parses() {
        let mut extractor = JsonObjectExtractor::with_mode(ScanMode::BraceOnly);
        let values = extractor.push(r#"{"html":"<style>p{color:red}</style>"}"#);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn whitespace_fragments_are_kept_inside_strings() {
        let mut extractor = JsonObjectExtractor::new();
        assert!(extractor.push(r#"{"name":"two"#).is_empty());
        assert!(extractor.push("  ").is_empty());
        assert!(extractor.push("").is_empty());
        let values = extractor.push(r#"words"}"#);
        assert_eq!(values, vec![json!({"name": "two  words"})]);
    }

    #[test]
    fn unterminated_tail_is_dropped() {
        let mut extractor = JsonObjectExtractor::new();
        assert_eq!(extractor.push(r#"{"a":1}{"b":"#), vec![json!({"a": 1})]);
        assert_eq!(extractor.finish(), Some(r#"{"b":"#.to_string()));
    }

    #[test]
    fn finish_without_tail() {
        let mut extractor = JsonObjectExtractor::new();
        extractor.push(r#"{"a":1} trailing prose"#);
        assert_eq!(extractor.finish(), None);
    }

    #[test]
    fn multibyte_text_survives_splits() {
        let text = r#"{"name":"Café Ünïcode","html":"<p>→</p>"}"#;
        let boundaries: Vec<usize> = (0..=text.len())
            .filter(|&i| text.is_char_boundary(i))
            .collect();

        for &split in &boundaries {
            let mut extractor = JsonObjectExtractor::new();
            let mut values = extractor.push(&text[..split]);
            values.extend(extractor.push(&text[split..]));
            assert_eq!(values.len(), 1, "split at {split}");
            assert_eq!(values[0]["name"], "Café Ünïcode");
        }
    }

    #[test]
    fn matched_span_len_reports_incomplete() {
        assert_eq!(matched_span_len(b"{\"a\":{}", ScanMode::LiteralAware), None);
        assert_eq!(matched_span_len(b"{}", ScanMode::LiteralAware), Some(2));
        assert_eq!(matched_span_len(b"{\"}\"}", ScanMode::LiteralAware), Some(5));
        assert_eq!(matched_span_len(b"{\"}\"}", ScanMode::BraceOnly), Some(3));
    }
}
