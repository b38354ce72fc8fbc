//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::ConfigError;

/// Errors produced while building or running a normalization pipeline.
///
/// `Config` is raised at build time only; `Parse` and `Transform` are raised
/// per document and leave no partial state behind.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("transform failed in stage {stage}: {message}")]
    Transform { stage: &'static str, message: String },
}

impl From<roxmltree::Error> for NormalizeError {
    fn from(err: roxmltree::Error) -> Self {
        // roxmltree's Display names the offending line:column
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type for application layer operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;
