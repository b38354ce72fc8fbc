//! Sort-dependency resolution.
//!
//! Linearizes the sort forest so that inner lists are sorted before the
//! lists that contain them. The sort key of a list item is its canonical
//! string value, so a nested sortable list must be in final order before
//! the enclosing item's key is read; otherwise the same logical document
//! could normalize differently depending on its input ordering.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use tracing::debug;

use crate::domain::entities::TagNode;
use crate::domain::error::{ConfigError, ConfigResult};

/// One resolved sort instruction: reorder the direct children of every
/// `parent`-named element whose tag is in `targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRule {
    pub parent: String,
    pub targets: Vec<String>,
}

/// Resolve the sort forest into execution order.
///
/// Parents are processed lexically so the output is reproducible for a
/// given forest. Each parent is visited depth-first through the targets
/// that are themselves rule parents; a tag reappearing on the visiting
/// path is a cyclic dependency and fails with [`ConfigError::SortCycle`]
/// naming the cycle.
pub fn resolve_sort_order(sorts: &[TagNode]) -> ConfigResult<Vec<SortRule>> {
    let rule_map = build_rule_map(sorts)?;

    let mut resolved = Vec::with_capacity(rule_map.len());
    let mut done: HashSet<String> = HashSet::new();
    let mut path: Vec<String> = Vec::new();

    // BTreeMap keys iterate lexically, like the fixed order required here.
    for parent in rule_map.keys() {
        visit(parent, &rule_map, &mut done, &mut path, &mut resolved)?;
    }

    debug!(
        "resolved sort order: {}",
        resolved.iter().map(|r| r.parent.as_str()).join(", ")
    );
    Ok(resolved)
}

/// Map each top-level sort parent to its ordered target tags,
/// rejecting duplicate parents.
fn build_rule_map(sorts: &[TagNode]) -> ConfigResult<BTreeMap<String, Vec<String>>> {
    let mut rule_map = BTreeMap::new();
    for parent in sorts {
        if rule_map.contains_key(parent.name()) {
            return Err(ConfigError::DuplicateSortParent(parent.name().to_string()));
        }
        let targets = parent
            .children()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        rule_map.insert(parent.name().to_string(), targets);
    }
    Ok(rule_map)
}

fn visit(
    tag: &str,
    rule_map: &BTreeMap<String, Vec<String>>,
    done: &mut HashSet<String>,
    path: &mut Vec<String>,
    resolved: &mut Vec<SortRule>,
) -> ConfigResult<()> {
    if done.contains(tag) {
        return Ok(());
    }
    if path.iter().any(|seen| seen == tag) {
        let cycle = path
            .iter()
            .skip_while(|seen| *seen != tag)
            .chain(std::iter::once(&tag.to_string()))
            .join(" -> ");
        return Err(ConfigError::SortCycle { path: cycle });
    }

    path.push(tag.to_string());
    for target in &rule_map[tag] {
        if rule_map.contains_key(target) {
            visit(target, rule_map, done, path, resolved)?;
        }
    }
    path.pop();

    done.insert(tag.to_string());
    resolved.push(SortRule {
        parent: tag.to_string(),
        targets: rule_map[tag].clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(parent: &str, targets: &[&str]) -> TagNode {
        targets
            .iter()
            .fold(TagNode::new(parent), |n, t| n.with_child(TagNode::new(*t)))
    }

    #[test]
    fn given_independent_rules_when_resolving_then_lexical_order() {
        let sorts = vec![rule("zoo", &["animal"]), rule("bar", &["drink"])];

        let order = resolve_sort_order(&sorts).unwrap();

        let parents: Vec<_> = order.iter().map(|r| r.parent.as_str()).collect();
        assert_eq!(parents, vec!["bar", "zoo"]);
    }

    #[test]
    fn given_nested_rules_when_resolving_then_inner_before_outer() {
        let sorts = vec![
            rule("product", &["catalog_item"]),
            rule("catalog_item", &["size"]),
            rule("size", &["color_swatch"]),
        ];

        let order = resolve_sort_order(&sorts).unwrap();

        let parents: Vec<_> = order.iter().map(|r| r.parent.as_str()).collect();
        // size sorts before catalog_item, catalog_item before product
        assert_eq!(parents, vec!["size", "catalog_item", "product"]);
    }

    #[test]
    fn given_duplicate_parent_when_resolving_then_config_error() {
        let sorts = vec![rule("product", &["a"]), rule("product", &["b"])];

        let err = resolve_sort_order(&sorts).unwrap_err();

        assert!(matches!(err, ConfigError::DuplicateSortParent(ref tag) if tag == "product"));
    }

    #[test]
    fn given_two_rule_cycle_when_resolving_then_cycle_named() {
        let sorts = vec![rule("a", &["b"]), rule("b", &["a"])];

        let err = resolve_sort_order(&sorts).unwrap_err();

        match err {
            ConfigError::SortCycle { path } => assert_eq!(path, "a -> b -> a"),
            other => panic!("expected SortCycle, got {other:?}"),
        }
    }

    #[test]
    fn given_self_cycle_when_resolving_then_config_error() {
        let sorts = vec![rule("a", &["a"])];

        let err = resolve_sort_order(&sorts).unwrap_err();

        assert!(matches!(err, ConfigError::SortCycle { .. }));
    }

    #[test]
    fn given_shared_inner_rule_when_resolving_then_resolved_once() {
        // Two outer rules both depend on "size"; it must appear exactly once,
        // before either of them.
        let sorts = vec![
            rule("product", &["size"]),
            rule("bundle", &["size"]),
            rule("size", &["color_swatch"]),
        ];

        let order = resolve_sort_order(&sorts).unwrap();

        let parents: Vec<_> = order.iter().map(|r| r.parent.as_str()).collect();
        assert_eq!(parents, vec!["size", "bundle", "product"]);
    }
}
