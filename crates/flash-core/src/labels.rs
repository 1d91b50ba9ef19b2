//! Style label resolution
//!
//! Every artifact must end up with a non-empty label, whatever the naming
//! call returned.

use flash_extract::extract_string_array;

/// Labels for one session, one per slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleLabels {
    /// Exactly `count` non-empty labels in slot order
    pub labels: Vec<String>,
    /// Whether the whole set was replaced by generic labels
    pub fell_back: bool,
}

/// Generic labels `"<prefix> 1" ..= "<prefix> count"`
#[must_use]
pub fn fallback_labels(count: usize, prefix: &str) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix} {i}")).collect()
}

/// Resolve labels from the naming call's response text
///
/// The response must contain a JSON array of at least `count` strings;
/// otherwise every slot gets its generic label. Extra labels are dropped and a
/// blank label is replaced by that slot's generic label.
#[must_use]
pub fn resolve_style_labels(response: &str, count: usize, prefix: &str) -> StyleLabels {
    let fallback = fallback_labels(count, prefix);

    let parsed = match extract_string_array(response) {
        Ok(parsed) if parsed.len() >= count => parsed,
        Ok(parsed) => {
            tracing::warn!(
                received = parsed.len(),
                expected = count,
                "too few style labels, using generic labels"
            );
            return StyleLabels {
                labels: fallback,
                fell_back: true,
            };
        }
        Err(error) => {
            tracing::warn!(%error, "style labels unreadable, using generic labels");
            return StyleLabels {
                labels: fallback,
                fell_back: true,
            };
        }
    };

    let labels = parsed
        .into_iter()
        .zip(fallback)
        .map(|(label, generic)| {
            let label = label.trim();
            if label.is_empty() {
                generic
            } else {
                label.to_string()
            }
        })
        .collect();

    StyleLabels {
        labels,
        fell_back: false,
    }
}

/// Labels to use when the naming call itself failed
#[must_use]
pub fn fallback_style_labels(count: usize, prefix: &str) -> StyleLabels {
    StyleLabels {
        labels: fallback_labels(count, prefix),
        fell_back: true,
    }
}
