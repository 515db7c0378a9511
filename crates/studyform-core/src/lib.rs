//! studyform-core: Questionnaire model, session state, and scoring.
//!
//! This crate defines the form schemas, the session state machine, the
//! per-instrument scorers and the aggregation that every export builds on.

pub mod aggregate;
pub mod autosave;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod persistence;
pub mod schema;
pub mod scoring;
pub mod session;

pub use error::StudyError;
