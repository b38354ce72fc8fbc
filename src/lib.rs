//! xmlnorm: canonical, diff-stable XML normalization.
//!
//! Given a declarative [`Configuration`] naming elements to discard and
//! repeated child lists to sort, semantically equivalent documents
//! normalize to byte-identical output regardless of original formatting,
//! namespace declarations, or list ordering.
//!
//! ```no_run
//! use xmlnorm::{Configuration, Normalizer, TagNode};
//!
//! let config = Configuration::new(
//!     vec![TagNode::new("price")],
//!     vec![TagNode::new("product").with_child(TagNode::new("catalog_item"))],
//! );
//! let normalizer = Normalizer::new(&config)?;
//! let canonical = normalizer.normalize_str("<product>...</product>")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{NormalizeError, NormalizeResult, Normalizer, Pipeline, Stage};
pub use domain::{Configuration, ConfigError, TagNode};
pub use infrastructure::{
    is_canonical, load_rules, normalize_batch, normalize_file, InfraError, InfraResult,
};
