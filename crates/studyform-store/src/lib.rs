//! studyform-store: Filesystem persistence and configuration.
//!
//! Implements the core `StateStore` port on top of a data directory and
//! loads `studyform.toml` configuration.

pub mod config;
pub mod error;
pub mod file_store;

pub use config::{load_config, load_config_from, StudyformConfig};
pub use error::StoreError;
pub use file_store::FileStore;
