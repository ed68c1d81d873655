//! The declared document structure.
//!
//! A structure table lists every Part (`G`) and Section (`G.1`) a document
//! may contain. Requirements are bound against it by id, and required nodes
//! must end up with at least one requirement.

use std::{collections::HashMap, fmt};

use serde::Deserialize;

/// The two kinds of structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A top-level unit with a dot-free id.
    Part,
    /// A unit nested under a Part (or, rarely, another Section).
    Section,
}

impl NodeKind {
    /// Parses a declared `type` cell (case-insensitive).
    ///
    /// Returns `None` when the cell is empty or not a known kind.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("part") {
            Some(Self::Part)
        } else if raw.eq_ignore_ascii_case("section") {
            Some(Self::Section)
        } else {
            None
        }
    }

    /// Infers the kind from the shape of an id: dotted ids are Sections.
    #[must_use]
    pub fn infer(id: &str) -> Self {
        if id.contains('.') {
            Self::Section
        } else {
            Self::Part
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part => f.write_str("Part"),
            Self::Section => f.write_str("Section"),
        }
    }
}

/// One raw row of the structure table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StructureRow {
    /// The node id, e.g. `G` or `G.1`.
    #[serde(default)]
    pub id: Option<String>,
    /// The declared kind (`Part` or `Section`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Human readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free text description.
    #[serde(default)]
    pub description: Option<String>,
    /// `"true"` (any case) marks the node as required.
    #[serde(default)]
    pub required: Option<String>,
}

impl StructureRow {
    /// A row declaring a Part.
    #[must_use]
    pub fn part(id: &str, title: &str) -> Self {
        Self::new(id, "Part", title)
    }

    /// A row declaring a Section.
    #[must_use]
    pub fn section(id: &str, title: &str) -> Self {
        Self::new(id, "Section", title)
    }

    fn new(id: &str, kind: &str, title: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            kind: Some(kind.to_string()),
            title: Some(title.to_string()),
            description: None,
            required: None,
        }
    }

    /// Marks the row as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = Some("true".to_string());
        self
    }

    fn is_required(&self) -> bool {
        self.required
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// A node in the declared document hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    /// Dotted id, e.g. `G` or `G.1`.
    pub id: String,
    /// Part or Section.
    pub kind: NodeKind,
    /// Human readable title.
    pub title: String,
    /// Free text description.
    pub description: String,
    /// Whether at least one requirement must be bound to this node.
    pub required: bool,
    children: Vec<usize>,
}

/// Non-fatal problems found while loading a structure table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureWarning {
    /// The row has no id and was skipped.
    #[error("Structure row {row}: missing id, row skipped")]
    MissingId {
        /// 1-based data row number.
        row: usize,
    },

    /// A second row reused an id; the first declaration is kept.
    #[error("Structure node {id}: duplicate id, keeping the first declaration")]
    DuplicateId {
        /// The duplicated id.
        id: String,
    },

    /// The `type` cell was missing or unrecognised.
    #[error("Structure node {id}: type '{declared}' not recognised, inferred {inferred}")]
    InferredKind {
        /// The node id.
        id: String,
        /// The raw cell content (empty when missing).
        declared: String,
        /// The kind inferred from the id.
        inferred: NodeKind,
    },

    /// A Section whose parent could not be found.
    #[error("Section {id} has no parent node {parent}; it will not appear in the document")]
    Orphan {
        /// The Section id.
        id: String,
        /// The parent id that was looked up.
        parent: String,
    },
}

/// The declared Parts and Sections of a document, plus an id index.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    nodes: Vec<StructureNode>,
    roots: Vec<usize>,
    orphans: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Structure {
    /// Builds the structure from table rows.
    ///
    /// Loading is lenient: malformed rows and unresolvable parents degrade to
    /// warnings rather than errors.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = StructureRow>) -> (Self, Vec<StructureWarning>) {
        let mut structure = Self::default();
        let mut warnings = Vec::new();

        // First pass: one node per row.
        for (i, row) in rows.into_iter().enumerate() {
            let required = row.is_required();
            let Some(id) = row.id.filter(|id| !id.is_empty()) else {
                warnings.push(StructureWarning::MissingId { row: i + 1 });
                continue;
            };

            if structure.index.contains_key(&id) {
                warnings.push(StructureWarning::DuplicateId { id });
                continue;
            }

            let declared = row.kind.unwrap_or_default();
            let kind = NodeKind::parse(&declared).unwrap_or_else(|| {
                let inferred = NodeKind::infer(&id);
                warnings.push(StructureWarning::InferredKind {
                    id: id.clone(),
                    declared,
                    inferred,
                });
                inferred
            });

            structure.index.insert(id.clone(), structure.nodes.len());
            structure.nodes.push(StructureNode {
                id,
                kind,
                title: row.title.unwrap_or_default(),
                description: row.description.unwrap_or_default(),
                required,
                children: Vec::new(),
            });
        }

        // Second pass: parentage.
        for i in 0..structure.nodes.len() {
            let node = &structure.nodes[i];
            if node.kind == NodeKind::Part {
                structure.roots.push(i);
                continue;
            }

            let Some(parent) = structure.parent_of(node) else {
                let id = node.id.clone();
                let parent = first_segment(&id).to_string();
                warnings.push(StructureWarning::Orphan { id, parent });
                structure.orphans.push(i);
                continue;
            };
            structure.nodes[parent].children.push(i);
        }

        (structure, warnings)
    }

    /// Resolves the node a Section hangs under.
    ///
    /// The id minus its last segment is tried first, then the Part named by
    /// the first segment.
    fn parent_of(&self, node: &StructureNode) -> Option<usize> {
        let (immediate, _) = node.id.rsplit_once('.')?;
        if let Some(&parent) = self.index.get(immediate) {
            return Some(parent);
        }

        let first = first_segment(&node.id);
        self.index
            .get(first)
            .copied()
            .filter(|&parent| self.nodes[parent].kind == NodeKind::Part)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StructureNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// The Parts, in declaration order.
    pub fn parts(&self) -> impl Iterator<Item = &StructureNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    /// The direct children of `node`, in declaration order.
    pub fn children<'a>(
        &'a self,
        node: &'a StructureNode,
    ) -> impl Iterator<Item = &'a StructureNode> + 'a {
        node.children.iter().map(|&i| &self.nodes[i])
    }

    /// Sections that could not be attached to any Part.
    pub fn orphans(&self) -> impl Iterator<Item = &StructureNode> {
        self.orphans.iter().map(|&i| &self.nodes[i])
    }

    /// Every node below `node`, depth-first pre-order, excluding `node`.
    #[must_use]
    pub fn descendants<'a>(&'a self, node: &'a StructureNode) -> Vec<&'a StructureNode> {
        let mut out = Vec::new();
        self.collect_preorder(node, &mut out);
        out.remove(0);
        out
    }

    /// Every node, depth-first pre-order from the Parts, followed by orphans.
    #[must_use]
    pub fn walk(&self) -> Vec<&StructureNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in self.parts().chain(self.orphans()) {
            self.collect_preorder(root, &mut out);
        }
        out
    }

    fn collect_preorder<'a>(&'a self, node: &'a StructureNode, out: &mut Vec<&'a StructureNode>) {
        out.push(node);
        for child in self.children(node) {
            self.collect_preorder(child, out);
        }
    }

    /// Number of declared nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the structure declares no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn first_segment(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}
