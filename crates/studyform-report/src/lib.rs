//! studyform-report: CSV/JSON export generation.
//!
//! Turns a session's aggregated forms and instrument scores into export
//! text, and names the files they are written to.

pub mod csv;
pub mod filename;
pub mod json;

use std::path::Path;

use anyhow::{Context, Result};

/// Write export text to `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}
