//! Study error types.
//!
//! Defined in `studyform-core` so every layer (session store, exporters, CLI)
//! can classify failures without string matching.

use thiserror::Error;

use crate::model::{InstanceId, ScoredInstrument};

/// Errors raised by the schema registry, the session store and the exporters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StudyError {
    /// No schema is registered under the requested name.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The participant name is empty or whitespace-only.
    #[error("participant name must not be empty")]
    InvalidParticipant,

    /// A response was written for an instance the session does not contain.
    #[error("unknown form instance: {0}")]
    UnknownInstance(InstanceId),

    /// A CSQ-VR export was requested but no baseline instance exists.
    #[error("no baseline CSQ-VR form found")]
    NoBaselineFound,

    /// No instances match the requested instrument export.
    #[error("no {0} forms found in the session")]
    EmptyExportSet(ScoredInstrument),
}

impl StudyError {
    /// Returns `true` if this error is a gap in the collected data that should
    /// be shown to the experimenter as a notice rather than treated as a bug.
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            StudyError::NoBaselineFound | StudyError::EmptyExportSet(_)
        )
    }
}
