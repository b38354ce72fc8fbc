//! Typed pipeline stages.
//!
//! Each stage is one discrete, composable transformation over the owned
//! document tree; `PrettyPrint` is the terminal stage and serializes.
//! The stage list is a tagged enum interpreted by the pipeline runner, so
//! a compiled pipeline is plain data with no per-call state.

use std::collections::HashSet;

use crate::application::document::{XmlDocument, XmlElement, XmlNode};
use crate::domain::SortRule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Remove all namespace declarations and prefixes; local identity of
    /// elements and attributes is untouched.
    NamespaceStrip,
    /// Deterministic structural details unrelated to configured sorts:
    /// lexical attribute order, insignificant whitespace dropped.
    Canonicalize,
    /// Remove every element (subtree included) whose tag is in the set,
    /// at any depth.
    IgnoreFilter(HashSet<String>),
    /// Reorder target-named direct children of every parent-named element
    /// by canonical string value; stable, non-targets keep their places.
    SortLists(SortRule),
    /// Serialize with two-space indentation and a single trailing newline.
    PrettyPrint,
}

impl Stage {
    /// Stage name for error reporting and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::NamespaceStrip => "namespace-strip",
            Stage::Canonicalize => "canonicalize",
            Stage::IgnoreFilter(_) => "ignore-filter",
            Stage::SortLists(_) => "sort-lists",
            Stage::PrettyPrint => "pretty-print",
        }
    }

    /// Apply a tree-rewriting stage in place.
    ///
    /// `PrettyPrint` is not applicable here; the runner serializes when it
    /// reaches it. A failure message aborts the whole pipeline run.
    pub fn apply(&self, doc: &mut XmlDocument) -> Result<(), String> {
        if let Stage::PrettyPrint = self {
            return Err("pretty-print is the terminal stage".to_string());
        }
        // An ignored root leaves the degenerate empty document behind.
        if let Stage::IgnoreFilter(tags) = self {
            if doc.root.as_ref().is_some_and(|root| tags.contains(&root.name)) {
                doc.root = None;
                return Ok(());
            }
        }
        let Some(root) = doc.root.as_mut() else {
            return Ok(());
        };
        match self {
            Stage::NamespaceStrip => strip_namespaces(root),
            Stage::Canonicalize => canonicalize(root),
            Stage::IgnoreFilter(tags) => filter_ignored(root, tags),
            Stage::SortLists(rule) => sort_lists(root, rule),
            Stage::PrettyPrint => {}
        }
        Ok(())
    }
}

fn strip_namespaces(el: &mut XmlElement) {
    el.prefix = None;
    el.namespaces.clear();
    for attr in &mut el.attributes {
        attr.prefix = None;
    }
    for child in &mut el.children {
        if let XmlNode::Element(inner) = child {
            strip_namespaces(inner);
        }
    }
}

fn canonicalize(el: &mut XmlElement) {
    el.attributes.sort_by(|a, b| a.qname().cmp(&b.qname()));

    // Whitespace-only text between elements is formatting noise unless the
    // element has mixed content; dropping it makes output independent of
    // input indentation.
    let mixed = el.children.iter().any(|c| match c {
        XmlNode::Text(t) => !t.trim().is_empty(),
        _ => false,
    });
    if !mixed {
        el.children.retain(|c| match c {
            XmlNode::Text(t) => !t.trim().is_empty(),
            _ => true,
        });
    }

    for child in &mut el.children {
        if let XmlNode::Element(inner) = child {
            canonicalize(inner);
        }
    }
}

fn filter_ignored(el: &mut XmlElement, tags: &HashSet<String>) {
    el.children.retain(|c| match c {
        XmlNode::Element(inner) => !tags.contains(&inner.name),
        _ => true,
    });
    for child in &mut el.children {
        if let XmlNode::Element(inner) = child {
            filter_ignored(inner, tags);
        }
    }
}

fn sort_lists(el: &mut XmlElement, rule: &SortRule) {
    if el.name == rule.parent {
        sort_target_children(el, rule);
    }
    for child in &mut el.children {
        if let XmlNode::Element(inner) = child {
            sort_lists(inner, rule);
        }
    }
}

/// Reorder the target-named children of one parent element.
///
/// The sorted block is written back into the positions the targets held,
/// so non-target siblings keep their relative position around it. All
/// target tags of the rule sort together as one block, keyed by canonical
/// string value; `sort_by` is stable, so equal keys keep input order.
fn sort_target_children(el: &mut XmlElement, rule: &SortRule) {
    let slots: Vec<usize> = el
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c {
            XmlNode::Element(inner) if rule.targets.contains(&inner.name) => Some(i),
            _ => None,
        })
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut keyed: Vec<(String, XmlNode)> = slots
        .iter()
        .map(|&i| {
            let node = std::mem::replace(&mut el.children[i], XmlNode::Text(String::new()));
            let key = match &node {
                XmlNode::Element(inner) => inner.canonical_string_value(),
                _ => String::new(),
            };
            (key, node)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    for (&slot, (_, node)) in slots.iter().zip(keyed) {
        el.children[slot] = node;
    }
}

/// Serialize the tree as indented text.
///
/// Elements with any non-empty text content render inline so character
/// data survives byte-for-byte; element-only content goes one child per
/// line at two spaces per depth. Output ends with exactly one newline;
/// the degenerate empty document serializes to the empty string.
pub fn pretty_print(doc: &XmlDocument) -> String {
    let mut out = String::new();
    if let Some(root) = &doc.root {
        write_element(&mut out, root, 0);
    }
    out
}

fn write_element(out: &mut String, el: &XmlElement, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&el.qname());
    for (prefix, uri) in &el.namespaces {
        match prefix {
            Some(p) => out.push_str(&format!(" xmlns:{p}=\"{}\"", escape_attr(uri))),
            None => out.push_str(&format!(" xmlns=\"{}\"", escape_attr(uri))),
        }
    }
    for attr in &el.attributes {
        out.push_str(&format!(" {}=\"{}\"", attr.qname(), escape_attr(&attr.value)));
    }

    if el.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    let has_text = el
        .children
        .iter()
        .any(|c| matches!(c, XmlNode::Text(t) if !t.is_empty()));
    if has_text {
        out.push('>');
        for child in &el.children {
            write_inline(out, child);
        }
        out.push_str(&format!("</{}>\n", el.qname()));
        return;
    }

    out.push_str(">\n");
    for child in &el.children {
        match child {
            XmlNode::Element(inner) => write_element(out, inner, depth + 1),
            XmlNode::Comment(text) => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&format!("<!--{text}-->\n"));
            }
            XmlNode::Text(_) => {}
        }
    }
    out.push_str(&format!("{indent}</{}>\n", el.qname()));
}

fn write_inline(out: &mut String, node: &XmlNode) {
    match node {
        XmlNode::Text(t) => out.push_str(&escape_text(t)),
        XmlNode::Comment(text) => out.push_str(&format!("<!--{text}-->")),
        XmlNode::Element(el) => {
            out.push('<');
            out.push_str(&el.qname());
            for (prefix, uri) in &el.namespaces {
                match prefix {
                    Some(p) => out.push_str(&format!(" xmlns:{p}=\"{}\"", escape_attr(uri))),
                    None => out.push_str(&format!(" xmlns=\"{}\"", escape_attr(uri))),
                }
            }
            for attr in &el.attributes {
                out.push_str(&format!(" {}=\"{}\"", attr.qname(), escape_attr(&attr.value)));
            }
            if el.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &el.children {
                    write_inline(out, child);
                }
                out.push_str(&format!("</{}>", el.qname()));
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// Literal whitespace in attribute values would be turned into spaces by
// attribute-value normalization on the next parse, so it must go out as
// character references to keep output stable under re-normalization.
fn escape_attr(s: &str) -> String {
    escape_text(s)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
        .replace('\r', "&#13;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    fn run(doc: &mut XmlDocument, stage: Stage) {
        stage.apply(doc).unwrap();
    }

    fn root(doc: &XmlDocument) -> &XmlElement {
        doc.root.as_ref().unwrap()
    }

    #[test]
    fn given_prefixed_document_when_stripping_then_no_namespaces_remain() {
        let mut doc = parse("<p:a xmlns:p=\"urn:x\" p:attr=\"1\"><p:b/></p:a>");

        run(&mut doc, Stage::NamespaceStrip);

        assert!(root(&doc).prefix.is_none());
        assert!(root(&doc).namespaces.is_empty());
        assert!(root(&doc).attributes[0].prefix.is_none());
        assert!(root(&doc).child_elements().next().unwrap().prefix.is_none());
    }

    #[test]
    fn given_unordered_attributes_when_canonicalizing_then_lexical_order() {
        let mut doc = parse("<a c=\"3\" a=\"1\" b=\"2\"/>");

        run(&mut doc, Stage::Canonicalize);

        let names: Vec<_> = root(&doc).attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn given_indented_input_when_canonicalizing_then_layout_whitespace_dropped() {
        let mut doc = parse("<a>\n  <b>x</b>\n  <c> keep me </c>\n</a>");

        run(&mut doc, Stage::Canonicalize);

        assert_eq!(root(&doc).children.len(), 2);
        let c = root(&doc).child_elements().nth(1).unwrap();
        // text inside a leaf is content, not layout
        assert_eq!(c.canonical_string_value(), " keep me ");
    }

    #[test]
    fn given_ignored_tag_when_filtering_then_removed_at_any_depth() {
        let mut doc = parse("<a><price>1</price><b><price>2</price><c/></b></a>");
        let tags: HashSet<String> = ["price".to_string()].into();

        run(&mut doc, Stage::IgnoreFilter(tags));

        let rendered = pretty_print(&doc);
        assert!(!rendered.contains("price"));
        assert!(rendered.contains("<c/>"));
    }

    #[test]
    fn given_ignored_root_when_filtering_then_document_becomes_empty() {
        let mut doc = parse("<gone><x>1</x></gone>");
        let tags: HashSet<String> = ["gone".to_string()].into();

        run(&mut doc, Stage::IgnoreFilter(tags));

        assert!(doc.root.is_none());
        assert_eq!(pretty_print(&doc), "");
    }

    #[test]
    fn given_empty_document_when_applying_stages_then_noop() {
        let mut doc = XmlDocument { root: None };

        run(&mut doc, Stage::NamespaceStrip);
        run(&mut doc, Stage::Canonicalize);

        assert!(doc.root.is_none());
    }

    #[test]
    fn given_unsorted_list_when_sorting_then_ascending_by_string_value() {
        let mut doc = parse("<list><item>b</item><item>a</item><item>c</item></list>");
        let rule = SortRule {
            parent: "list".into(),
            targets: vec!["item".into()],
        };

        run(&mut doc, Stage::SortLists(rule));

        let values: Vec<_> = root(&doc)
            .child_elements()
            .map(XmlElement::canonical_string_value)
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn given_non_target_siblings_when_sorting_then_their_positions_survive() {
        let mut doc =
            parse("<list><other>z</other><item>b</item><note/><item>a</item></list>");
        let rule = SortRule {
            parent: "list".into(),
            targets: vec!["item".into()],
        };

        run(&mut doc, Stage::SortLists(rule));

        let names: Vec<_> = root(&doc).child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["other", "item", "note", "item"]);
        let items: Vec<_> = root(&doc)
            .child_elements()
            .filter(|e| e.name == "item")
            .map(XmlElement::canonical_string_value)
            .collect();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn given_equal_keys_when_sorting_then_input_order_kept() {
        let mut doc = parse(
            "<list><item id=\"1\">same</item><item id=\"2\">same</item></list>",
        );
        let rule = SortRule {
            parent: "list".into(),
            targets: vec!["item".into()],
        };

        run(&mut doc, Stage::SortLists(rule));

        let ids: Vec<_> = root(&doc)
            .child_elements()
            .map(|e| e.attributes[0].value.clone())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn given_two_target_tags_when_sorting_then_merged_into_one_block() {
        let mut doc = parse("<list><b>2</b><a>3</a><b>1</b></list>");
        let rule = SortRule {
            parent: "list".into(),
            targets: vec!["a".into(), "b".into()],
        };

        run(&mut doc, Stage::SortLists(rule));

        let values: Vec<_> = root(&doc)
            .child_elements()
            .map(XmlElement::canonical_string_value)
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn given_element_only_content_when_printing_then_indented_block() {
        let mut doc = parse("<a><b><c/></b></a>");
        run(&mut doc, Stage::Canonicalize);

        let rendered = pretty_print(&doc);

        assert_eq!(rendered, "<a>\n  <b>\n    <c/>\n  </b>\n</a>\n");
    }

    #[test]
    fn given_text_content_when_printing_then_inline_and_escaped() {
        let doc = parse("<a>1 &lt; 2 &amp; so</a>");

        let rendered = pretty_print(&doc);

        assert_eq!(rendered, "<a>1 &lt; 2 &amp; so</a>\n");
    }

    #[test]
    fn given_whitespace_in_attribute_when_printing_then_character_references() {
        let doc = parse("<a x=\"1&#10;2&#9;3\"/>");

        let rendered = pretty_print(&doc);

        assert_eq!(rendered, "<a x=\"1&#10;2&#9;3\"/>\n");
    }

    #[test]
    fn given_namespaced_inline_element_when_printing_then_declarations_emitted() {
        // mixed content forces the inline path
        let doc = parse("<a>t<q:b xmlns:q=\"urn:q\">y</q:b></a>");

        let rendered = pretty_print(&doc);

        assert_eq!(rendered, "<a>t<q:b xmlns:q=\"urn:q\">y</q:b></a>\n");
    }
}
