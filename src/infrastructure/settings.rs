//! Rules file loading.
//!
//! The core takes a built [`Configuration`]; this is the CLI's on-disk
//! surface for it, a small TOML file:
//!
//! ```toml
//! ignore = ["item_number", "price"]
//!
//! [[sort]]
//! parent = "product"
//! children = ["catalog_item"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Configuration, TagNode};
use crate::infrastructure::error::{InfraError, InfraResult};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RulesFile {
    /// Tags whose elements are removed with their subtrees.
    pub ignore: Vec<String>,
    /// Sort forest: one entry per parent tag.
    pub sort: Vec<SortEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortEntry {
    pub parent: String,
    pub children: Vec<String>,
}

impl RulesFile {
    pub fn into_configuration(self) -> Configuration {
        let ignores = self.ignore.into_iter().map(TagNode::new).collect();
        let sorts = self
            .sort
            .into_iter()
            .map(|entry| {
                entry
                    .children
                    .into_iter()
                    .fold(TagNode::new(entry.parent), |n, c| {
                        n.with_child(TagNode::new(c))
                    })
            })
            .collect();
        Configuration::new(ignores, sorts)
    }
}

/// Load a rules file and map it into the domain configuration.
pub fn load_rules(path: &Path) -> InfraResult<Configuration> {
    let text = fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("reading rules file {}", path.display()), e))?;
    let rules: RulesFile = toml::from_str(&text).map_err(|e| InfraError::Rules {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(rules.into_configuration())
}
