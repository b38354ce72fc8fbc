//! Application layer: document model, stages, and the transform pipeline
//!
//! This layer orchestrates domain rules over parsed documents; it performs
//! no I/O of its own.

pub mod document;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use document::{XmlDocument, XmlElement, XmlNode};
pub use error::{NormalizeError, NormalizeResult};
pub use pipeline::{Normalizer, Pipeline};
pub use stages::Stage;
