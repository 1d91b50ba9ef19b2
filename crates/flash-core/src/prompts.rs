//! Prompt builders for each call the orchestrator makes

/// Request `count` short style names as a JSON array
#[must_use]
pub fn style_names(subject: &str, count: usize) -> String {
    format!(
        "Propose {count} clearly different visual design directions for: \"{subject}\".\n\
         Answer with nothing but a raw JSON array of {count} short names. Avoid trademarks."
    )
}

/// Request one component rendered in a given direction
#[must_use]
pub fn artifact(subject: &str, direction: &str) -> String {
    format!(
        "Build a polished, self-contained UI component for: \"{subject}\", \
         following the design direction \"{direction}\".\n\
         Answer with raw HTML only (inline styles allowed). No markdown."
    )
}

/// Request a fresh take on an existing component
#[must_use]
pub fn regeneration(subject: &str, direction: &str) -> String {
    format!(
        "Build a new, polished UI component for: \"{subject}\" in the design direction \"{direction}\".\n\
         Do not repeat the previous attempt; aim higher.\n\
         Answer with raw HTML only (inline styles allowed). No markdown."
    )
}

/// Request `count` variations streamed as one JSON object per line
#[must_use]
pub fn variations(subject: &str, count: usize) -> String {
    format!(
        "You are an expert interface designer. Propose {count} radically different \
         conceptual variations of: \"{subject}\".\n\
         Describe each one through its materials and physical logic; never name real \
         artists, studios or brands.\n\
         Stream exactly one JSON object per line, shaped \
         {{\"name\": \"Persona name\", \"html\": \"...\"}}."
    )
}
