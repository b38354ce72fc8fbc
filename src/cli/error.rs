//! CLI-level errors (wraps infrastructure errors)

use std::io::ErrorKind;

use thiserror::Error;

use crate::application::NormalizeError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("file is not in canonical form: {0}")]
    NotCanonical(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotCanonical(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Rules { .. } => crate::exitcode::CONFIG,
                InfraError::Normalize(NormalizeError::Config(_)) => crate::exitcode::CONFIG,
                InfraError::Normalize(NormalizeError::Parse { .. }) => crate::exitcode::DATAERR,
                InfraError::Normalize(NormalizeError::Transform { .. }) => {
                    crate::exitcode::SOFTWARE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_missing_input_when_mapping_then_noinput_code() {
        let err = CliError::Infra(InfraError::io(
            "reading in.xml",
            std::io::Error::new(ErrorKind::NotFound, "no such file"),
        ));

        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_other_io_failure_when_mapping_then_ioerr_code() {
        let err = CliError::Infra(InfraError::io(
            "writing out.xml",
            std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        ));

        assert_eq!(err.exit_code(), exitcode::IOERR);
    }

    #[test]
    fn given_noncanonical_verdict_when_mapping_then_dataerr_code() {
        let err = CliError::NotCanonical("in.xml".to_string());

        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }
}
