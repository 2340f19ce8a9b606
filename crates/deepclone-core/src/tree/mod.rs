//! Reference tree
//!
//! A selection view over a [`ReferenceClosure`]: the graph unrolled into a
//! tree from the root, so a user can pick which records to clone.
//!
//! - The cycle guard is per path: a record already on the path from the root
//!   is shown again without children, and the same record can appear in
//!   several branches.
//! - Below [`MAX_TREE_DEPTH`] levels, children collapse into a single
//!   [`NodeKind::More`] placeholder.
//! - Nodes are addressed by [`TreePath`].

mod path;

pub use path::{PathError, TreePath, PATH_SEPARATOR};

use crate::discovery::ReferenceClosure;
use deepclone_model::{ContentTypeId, Record, RecordId};
use indexmap::IndexSet;
use serde::Serialize;

/// Depth at which children are replaced by a placeholder
pub const MAX_TREE_DEPTH: usize = 10;

/// Fields tried, in order, for a node's internal name
pub const COMMON_NAME_FIELDS: [&str; 3] = ["internalName", "name", "title"];

/// Locale preferred for the internal name
pub const DEFAULT_LOCALE: &str = "en-US";

/// Kind of tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A record with its children
    Entry,
    /// A record already on the path from the root; shown without children
    Repeated,
    /// Stands in for children below the depth limit
    More,
}

/// Node of a [`ReferenceTree`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Record id, or `more-{parent}` for a placeholder
    pub entry_id: RecordId,
    /// Content type (empty for a placeholder)
    pub content_type_id: ContentTypeId,
    /// Human-readable name, possibly empty
    pub internal_name: String,
    /// Node kind
    pub kind: NodeKind,
    /// Child nodes in field order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Whether this node stands for a record
    #[inline]
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.kind != NodeKind::More
    }

    fn more(parent: &RecordId) -> Self {
        Self {
            entry_id: RecordId::new(format!("more-{parent}")),
            content_type_id: ContentTypeId::new(""),
            internal_name: String::new(),
            kind: NodeKind::More,
            children: Vec::new(),
        }
    }

    fn find(&self, id: &RecordId) -> Option<&Self> {
        if self.entry_id == *id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn walk<'a>(&'a self, path: TreePath, out: &mut Vec<(TreePath, &'a TreeNode)>) {
        out.push((path.clone(), self));
        for child in &self.children {
            child.walk(path.child(child.entry_id.as_str()), out);
        }
    }

    fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    fn parent_ids(&self, target: &RecordId, ancestors: &mut Vec<RecordId>) -> bool {
        if self.entry_id == *target {
            return true;
        }
        ancestors.push(self.entry_id.clone());
        if self.children.iter().any(|child| child.parent_ids(target, ancestors)) {
            return true;
        }
        ancestors.pop();
        false
    }
}

/// Reference graph unrolled into a tree from its root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTree {
    root: TreeNode,
}

impl ReferenceTree {
    /// Build the tree of `root`, or `None` if the root is not in the closure
    #[must_use]
    pub fn build(closure: &ReferenceClosure, root: &RecordId) -> Option<Self> {
        build_node(closure, root, &[], 0).map(|root| Self { root })
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// First node for `id` in depth-first order
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&TreeNode> {
        self.root.find(id)
    }

    /// Every `(path, node)` pair in depth-first order
    #[must_use]
    pub fn nodes(&self) -> Vec<(TreePath, &TreeNode)> {
        let mut out = Vec::with_capacity(self.root.subtree_len());
        self.root
            .walk(TreePath::single(self.root.entry_id.as_str()), &mut out);
        out
    }

    /// Ids of every record node
    #[must_use]
    pub fn all_ids(&self) -> IndexSet<RecordId> {
        self.nodes()
            .into_iter()
            .filter(|(_, node)| node.is_record())
            .map(|(_, node)| node.entry_id.clone())
            .collect()
    }

    /// Ids of every record below the first node for `id`
    #[must_use]
    pub fn descendant_ids(&self, id: &RecordId) -> IndexSet<RecordId> {
        let Some(node) = self.find(id) else {
            return IndexSet::new();
        };
        Self { root: node.clone() }
            .nodes()
            .into_iter()
            .skip(1)
            .filter(|(_, node)| node.is_record())
            .map(|(_, node)| node.entry_id.clone())
            .collect()
    }

    /// Ancestors of the first node for `id`, from the root down.
    ///
    /// Empty for the root and for unknown ids.
    #[must_use]
    pub fn parent_ids(&self, id: &RecordId) -> Vec<RecordId> {
        let mut ancestors = Vec::new();
        if self.root.parent_ids(id, &mut ancestors) {
            ancestors
        } else {
            Vec::new()
        }
    }

    /// Path of every node
    #[must_use]
    pub fn all_paths(&self) -> Vec<TreePath> {
        self.nodes().into_iter().map(|(path, _)| path).collect()
    }

    /// Paths whose node, or any ancestor, has a blocked content type
    #[must_use]
    pub fn disabled_paths(&self, blocked: &[ContentTypeId]) -> IndexSet<TreePath> {
        if blocked.is_empty() {
            return IndexSet::new();
        }
        let mut disabled = IndexSet::new();
        for (path, node) in self.nodes() {
            let inherited = path
                .parent()
                .is_some_and(|parent| disabled.contains(&parent));
            if inherited || blocked.contains(&node.content_type_id) {
                disabled.insert(path);
            }
        }
        disabled
    }

    /// Record ids selected by `paths`.
    ///
    /// Disabled paths, placeholder nodes and paths not in the tree are ignored.
    #[must_use]
    pub fn selection_from_paths<'a, I>(&self, paths: I, blocked: &[ContentTypeId]) -> IndexSet<RecordId>
    where
        I: IntoIterator<Item = &'a TreePath>,
    {
        let disabled = self.disabled_paths(blocked);
        let nodes = self.nodes();
        paths
            .into_iter()
            .filter(|path| !disabled.contains(*path))
            .filter_map(|path| {
                nodes
                    .iter()
                    .find(|(candidate, _)| candidate == path)
                    .filter(|(_, node)| node.is_record())
                    .map(|(_, node)| node.entry_id.clone())
            })
            .collect()
    }
}

fn build_node(closure: &ReferenceClosure, id: &RecordId, path: &[&RecordId], level: usize) -> Option<TreeNode> {
    let record = closure.get(id)?;
    let mut node = TreeNode {
        entry_id: id.clone(),
        content_type_id: record.content_type_id.clone(),
        internal_name: internal_name(record),
        kind: NodeKind::Entry,
        children: Vec::new(),
    };

    if path.contains(&id) {
        node.kind = NodeKind::Repeated;
        return Some(node);
    }

    let child_ids: Vec<RecordId> = record
        .referenced_ids()
        .into_iter()
        .filter(|child| closure.contains(child))
        .collect();
    if child_ids.is_empty() {
        return Some(node);
    }

    if level >= MAX_TREE_DEPTH {
        node.children.push(TreeNode::more(id));
        return Some(node);
    }

    let mut child_path = path.to_vec();
    child_path.push(id);
    node.children = child_ids
        .iter()
        .filter_map(|child| build_node(closure, child, &child_path, level + 1))
        .collect();
    Some(node)
}

/// Name shown for a record: the first of [`COMMON_NAME_FIELDS`] it has, in
/// [`DEFAULT_LOCALE`] when present, else its first locale.
#[must_use]
pub fn internal_name(record: &Record) -> String {
    let Some(values) = COMMON_NAME_FIELDS
        .iter()
        .find_map(|field| record.fields.get(field))
    else {
        return String::new();
    };
    values
        .get(DEFAULT_LOCALE)
        .or_else(|| values.values().next())
        .and_then(|value| value.as_text())
        .unwrap_or_default()
        .to_string()
}
