//! Domain layer: the rule model and sort-dependency resolution
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod resolver;

pub use entities::{Configuration, TagNode};
pub use error::{ConfigError, ConfigResult};
pub use resolver::{resolve_sort_order, SortRule};
