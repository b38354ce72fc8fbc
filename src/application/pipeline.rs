//! Stage compilation and the transform pipeline runner.
//!
//! A [`Configuration`] compiles once into an ordered stage list; the
//! compiled pipeline carries no per-call state and can be shared across
//! threads and reused for any number of documents.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::application::document::XmlDocument;
use crate::application::error::{NormalizeError, NormalizeResult};
use crate::application::stages::{pretty_print, Stage};
use crate::domain::{resolve_sort_order, ConfigResult, Configuration};

/// The compiled, immutable stage sequence for one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Compile the stage list: namespace strip, canonicalize, ignore
    /// filter when ignores exist, one sort stage per resolved rule in
    /// inner-before-outer order, pretty print. Pure; fails only on an
    /// invalid sort forest.
    pub fn compile(config: &Configuration) -> ConfigResult<Self> {
        let mut stages = vec![Stage::NamespaceStrip, Stage::Canonicalize];

        if !config.ignores().is_empty() {
            let tags: HashSet<String> = config
                .ignores()
                .iter()
                .map(|n| n.name().to_string())
                .collect();
            stages.push(Stage::IgnoreFilter(tags));
        }

        for rule in resolve_sort_order(config.sorts())? {
            stages.push(Stage::SortLists(rule));
        }

        stages.push(Stage::PrettyPrint);
        debug!("compiled pipeline with {} stages", stages.len());
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the pipeline against one document.
    ///
    /// Stages execute in order over the parsed tree; the terminal stage
    /// serializes. Any stage failure aborts the run with a transform
    /// error, so no partial output is observable.
    pub fn run(&self, xml: &str) -> NormalizeResult<String> {
        let mut doc = XmlDocument::parse(xml)?;

        for stage in &self.stages {
            if let Stage::PrettyPrint = stage {
                return Ok(normalize_line_endings(pretty_print(&doc)));
            }
            stage.apply(&mut doc).map_err(|message| NormalizeError::Transform {
                stage: stage.name(),
                message,
            })?;
        }

        // compile() always terminates the list with PrettyPrint
        Ok(normalize_line_endings(pretty_print(&doc)))
    }
}

/// Collapse every line-terminator representation to plain LF. Carriage
/// returns only survive parsing via character references, and they would
/// break byte-stable diffs across platforms.
fn normalize_line_endings(text: String) -> String {
    if text.contains('\r') {
        text.replace('\r', "")
    } else {
        text
    }
}

/// Public entry point: a compiled pipeline behind a one-shot transform API.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pipeline: Pipeline,
}

impl Normalizer {
    /// Build a normalizer for the given configuration, compiling the
    /// pipeline once. Fails on duplicate sort parents or cyclic sort
    /// dependencies, never mid-document.
    pub fn new(config: &Configuration) -> ConfigResult<Self> {
        Ok(Self {
            pipeline: Pipeline::compile(config)?,
        })
    }

    /// Normalize one document given as text.
    #[instrument(level = "debug", skip(self, xml))]
    pub fn normalize_str(&self, xml: &str) -> NormalizeResult<String> {
        self.pipeline.run(xml)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TagNode;

    fn sort_rule(parent: &str, targets: &[&str]) -> TagNode {
        targets
            .iter()
            .fold(TagNode::new(parent), |n, t| n.with_child(TagNode::new(*t)))
    }

    #[test]
    fn given_empty_ignore_set_when_compiling_then_no_filter_stage() {
        let config = Configuration::default();

        let pipeline = Pipeline::compile(&config).unwrap();

        assert!(!pipeline
            .stages()
            .iter()
            .any(|s| matches!(s, Stage::IgnoreFilter(_))));
        assert!(matches!(pipeline.stages().last(), Some(Stage::PrettyPrint)));
    }

    #[test]
    fn given_nested_rules_when_compiling_then_sort_stages_inner_first() {
        let config = Configuration::new(
            vec![],
            vec![
                sort_rule("product", &["catalog_item"]),
                sort_rule("catalog_item", &["size"]),
            ],
        );

        let pipeline = Pipeline::compile(&config).unwrap();

        let sort_parents: Vec<_> = pipeline
            .stages()
            .iter()
            .filter_map(|s| match s {
                Stage::SortLists(rule) => Some(rule.parent.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sort_parents, vec!["catalog_item", "product"]);
    }

    #[test]
    fn given_cyclic_forest_when_building_normalizer_then_config_error() {
        let config = Configuration::new(
            vec![],
            vec![sort_rule("a", &["b"]), sort_rule("b", &["a"])],
        );

        assert!(Normalizer::new(&config).is_err());
    }

    #[test]
    fn given_document_emptied_by_filter_when_running_then_degenerate_result() {
        let config = Configuration::new(vec![TagNode::new("gone")], vec![]);
        let normalizer = Normalizer::new(&config).unwrap();

        let out = normalizer
            .normalize_str("<root><gone>1</gone><gone>2</gone></root>")
            .unwrap();

        assert_eq!(out, "<root/>\n");
    }

    #[test]
    fn given_ignored_root_when_running_then_empty_output() {
        let config = Configuration::new(vec![TagNode::new("gone")], vec![]);
        let normalizer = Normalizer::new(&config).unwrap();

        let out = normalizer.normalize_str("<gone><x>1</x></gone>").unwrap();

        assert_eq!(out, "");
    }

    #[test]
    fn given_carriage_return_entity_when_running_then_stripped_from_output() {
        let normalizer = Normalizer::new(&Configuration::default()).unwrap();

        let out = normalizer.normalize_str("<a>line&#13;\nnext</a>").unwrap();

        assert!(!out.contains('\r'));
    }
}
