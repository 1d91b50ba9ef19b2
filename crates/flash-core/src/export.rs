//! Session export: one HTML file per artifact

use crate::error::FlashError;
use flash_artifact::Session;
use std::path::{Path, PathBuf};

/// Lowercase a label, replacing every non-alphanumeric character with `_`
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for the artifact at `slot`: `<slot + 1>_<sanitized label>.html`
#[must_use]
pub fn export_file_name(slot: usize, label: &str) -> String {
    format!("{}_{}.html", slot + 1, sanitize_label(label))
}

/// Directory name for a session's bundle
#[must_use]
pub fn bundle_dir_name(session: &Session) -> String {
    format!("flash_ui_{}", session.id())
}

/// Write every artifact of `session` into `dir/flash_ui_<session id>/`
///
/// Returns the bundle directory.
///
/// # Errors
/// [`FlashError::Io`] if the directory or a file cannot be written
pub async fn export_session(session: &Session, dir: &Path) -> Result<PathBuf, FlashError> {
    let bundle = dir.join(bundle_dir_name(session));
    tokio::fs::create_dir_all(&bundle).await?;

    for (slot, artifact) in session.artifacts().iter().enumerate() {
        let path = bundle.join(export_file_name(slot, artifact.style_name()));
        tokio::fs::write(&path, artifact.html()).await?;
    }

    tracing::info!(
        session = %session.id(),
        files = session.len(),
        path = %bundle.display(),
        "session exported"
    );
    Ok(bundle)
}
