//! Domain entities: the normalization rule model

/// A tag name with an ordered list of child tag nodes.
///
/// Used both for flat ignore entries (no children) and for sort-forest
/// entries, where the direct children name the tags that form a sortable
/// list under the parent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    name: String,
    children: Vec<TagNode>,
}

impl TagNode {
    /// Create a leaf node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style child append, mirrors nested rule declarations.
    pub fn with_child(mut self, child: TagNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[TagNode] {
        &self.children
    }
}

/// Declarative description of one normalization run.
///
/// Holds the ignore set (flat nodes; elements to drop with their subtrees)
/// and the sort forest (nested nodes; repeated child lists to sort).
/// Built once, read-only afterwards. Duplicate top-level sort parents are
/// rejected later, when the sort order is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    ignores: Vec<TagNode>,
    sorts: Vec<TagNode>,
}

impl Configuration {
    pub fn new(ignores: Vec<TagNode>, sorts: Vec<TagNode>) -> Self {
        Self { ignores, sorts }
    }

    pub fn ignores(&self) -> &[TagNode] {
        &self.ignores
    }

    pub fn sorts(&self) -> &[TagNode] {
        &self.sorts
    }
}
