//! Final markup normalization

/// Trim and strip a surrounding markdown code fence
///
/// A leading fence may carry a language tag (`html`, `svg+xml`, ...); the tag
/// is treated as one when followed by whitespace, markup (`<`) or end of text.
#[must_use]
pub fn normalize_markup(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = rest[fence_tag_len(rest)..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text.to_string()
}

fn fence_tag_len(rest: &str) -> usize {
    let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'+' | b'.'))
        .count();

    match rest.as_bytes().get(len) {
        None => len,
        Some(b) if b.is_ascii_whitespace() || *b == b'<' => len,
        Some(_) => 0,
    }
}
