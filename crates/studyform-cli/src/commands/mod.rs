//! Subcommand implementations.

pub mod export;
pub mod fill;
pub mod init;
pub mod record;
pub mod saved;
pub mod schemas;
pub mod session;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};

use studyform_core::model::InstanceId;
use studyform_core::persistence::{load_active, save_active};
use studyform_core::schema::SchemaRegistry;
use studyform_core::session::SessionState;
use studyform_core::StudyError;
use studyform_store::{load_config_from, FileStore, StudyformConfig};

/// Config, state store and schemas shared by the session commands.
pub struct Workspace {
    pub config: StudyformConfig,
    pub store: FileStore,
    pub registry: SchemaRegistry,
}

impl Workspace {
    pub fn open(config_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self {
            config,
            store,
            registry: SchemaRegistry::builtin(),
        })
    }

    /// The in-progress session; an error if none was started.
    pub fn active(&self) -> Result<SessionState> {
        load_active(&self.store)?
            .context("no active session (run `studyform start` or `studyform load` first)")
    }

    pub fn commit(&self, state: &SessionState) -> Result<()> {
        save_active(&self.store, state)
    }
}

/// Resolve `--form` given either a 1-based display position or an instance id.
pub fn resolve_form(session: &SessionState, form: &str) -> Result<InstanceId> {
    if let Ok(position) = form.trim().parse::<usize>() {
        return session
            .resolve_position(position)
            .with_context(|| format!("no form at position {position}"));
    }
    let id: InstanceId = form
        .parse()
        .with_context(|| format!("'{form}' is neither a position nor an instance id"))?;
    match session.instance(id) {
        Some(instance) => Ok(instance.id),
        None => Err(StudyError::UnknownInstance(id).into()),
    }
}

/// Parse a saved-session id argument.
pub fn parse_session_id(id: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(id.trim()).with_context(|| format!("invalid session id: {id}"))
}
