//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Configuration errors represent rule-model violations.
/// Raised when the pipeline is built, never mid-document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate sort parent: {0}")]
    DuplicateSortParent(String),

    #[error("cyclic sort dependency: {path}")]
    SortCycle { path: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
