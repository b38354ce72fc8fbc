//! Infrastructure layer: file I/O and rules-file loading
//!
//! This layer wraps the pure pipeline with filesystem concerns.

pub mod error;
pub mod fs;
pub mod settings;

pub use error::{InfraError, InfraResult};
pub use fs::{is_canonical, normalize_batch, normalize_file, BatchOutcome};
pub use settings::{load_rules, RulesFile};
