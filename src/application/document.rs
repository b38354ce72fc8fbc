//! Owned XML document tree.
//!
//! The parser collaborator is `roxmltree`; parsed input is converted once
//! into this owned tree so pipeline stages can rewrite it in place. The
//! tree keeps element/attribute prefixes and per-element namespace
//! declarations so namespace stripping is an explicit stage, not a side
//! effect of parsing. The XML declaration and DOCTYPE are not retained;
//! the canonical form owns its prolog.

use crate::application::error::NormalizeResult;

/// One node in element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    /// Qualified name as serialized.
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub prefix: Option<String>,
    /// Local name; element identity is not affected by prefixes.
    pub name: String,
    /// Namespace declarations made on this element: (prefix, uri),
    /// prefix `None` for the default namespace.
    pub namespaces: Vec<(Option<String>, String)>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Canonical string value: all descendant text, concatenated in
    /// document order. This is the sort key for list items.
    pub fn canonical_string_value(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &XmlElement, out: &mut String) {
    for child in &el.children {
        match child {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(inner) => collect_text(inner, out),
            XmlNode::Comment(_) => {}
        }
    }
}

/// A parsed document: the root element.
///
/// Document-level comments and processing instructions are not carried
/// over; only the root element subtree is normalized. `root` is `None`
/// when filtering removed the root element itself, the degenerate empty
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: Option<XmlElement>,
}

impl XmlDocument {
    /// Parse XML text into an owned tree.
    pub fn parse(text: &str) -> NormalizeResult<Self> {
        let doc = roxmltree::Document::parse(text)?;
        let root = Some(convert_element(doc.root_element()));
        Ok(Self { root })
    }
}

const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";

fn convert_element(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let prefix = tag
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let attributes = node
        .attributes()
        .map(|attr| XmlAttribute {
            prefix: attr
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            name: attr.name().to_string(),
            value: attr.value().to_string(),
        })
        .collect();

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(XmlNode::Element(convert_element(child)))
            } else if child.is_text() {
                child.text().map(|t| XmlNode::Text(t.to_string()))
            } else if child.is_comment() {
                child.text().map(|t| XmlNode::Comment(t.to_string()))
            } else {
                None
            }
        })
        .collect();

    XmlElement {
        prefix,
        name: tag.name().to_string(),
        namespaces: declared_namespaces(node),
        attributes,
        children,
    }
}

/// Namespaces declared on this element: the in-scope set minus what the
/// parent already had in scope. The implicit `xml` namespace is excluded.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<(Option<String>, String)> {
    let parent_scope: Vec<(Option<&str>, &str)> = node
        .parent()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.uri() != XML_NS_URI)
        .filter(|ns| !parent_scope.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_xml_when_parsed_then_tree_matches() {
        let doc = XmlDocument::parse("<a x=\"1\"><b>hi</b></a>").unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attributes[0].name, "x");
        let b = root.child_elements().next().unwrap();
        assert_eq!(b.name, "b");
        assert_eq!(b.children, vec![XmlNode::Text("hi".into())]);
    }

    #[test]
    fn given_namespaced_xml_when_parsed_then_declarations_are_retained() {
        let doc = XmlDocument::parse(
            "<p:a xmlns:p=\"urn:x\" xmlns=\"urn:d\"><b/></p:a>",
        )
        .unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.prefix.as_deref(), Some("p"));
        assert_eq!(root.namespaces.len(), 2);
        // inherited scope is not re-declared on children
        let b = root.child_elements().next().unwrap();
        assert!(b.namespaces.is_empty());
    }

    #[test]
    fn given_nested_text_when_reading_key_then_concatenated_in_document_order() {
        let doc = XmlDocument::parse("<a>x<b>y<c>z</c></b>w</a>").unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.canonical_string_value(), "xyzw");
    }

    #[test]
    fn given_malformed_xml_when_parsed_then_parse_error_names_location() {
        let err = XmlDocument::parse("<a><b></a>").unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with("parse error:"), "got: {msg}");
    }
}
