//! Configuration loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studyform_core::aggregate::{ExportOptions, SubjectLabel};
use studyform_core::session::ResetPolicy;

/// Top-level studyform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyformConfig {
    /// Directory holding the active and saved session files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Quiet period before an edit is auto-saved.
    #[serde(default = "default_autosave_delay")]
    pub autosave_delay_ms: u64,
    /// Whether a reset keeps or re-mints form identities.
    #[serde(default)]
    pub reset_policy: ResetPolicy,
    /// What the Subject column of score exports shows.
    #[serde(default)]
    pub subject_label: SubjectLabel,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./studyform-data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./studyform-exports")
}
fn default_autosave_delay() -> u64 {
    1000
}

impl Default for StudyformConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            autosave_delay_ms: default_autosave_delay(),
            reset_policy: ResetPolicy::default(),
            subject_label: SubjectLabel::default(),
        }
    }
}

impl StudyformConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            subject: self.subject_label,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studyform.toml` in the current directory
/// 2. `~/.config/studyform/config.toml`
///
/// Environment variable overrides: `STUDYFORM_DATA_DIR`, `STUDYFORM_OUTPUT_DIR`.
pub fn load_config() -> Result<StudyformConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyformConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("studyform.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<StudyformConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyformConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("STUDYFORM_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("STUDYFORM_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyform"))
}
