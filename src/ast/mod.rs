//! Document tree consumed by the LaTeX renderer.
//!
//! The tree is an arena of [`Node`]s using a parent-pointer / first-child /
//! next-sibling representation. Text attributes are [`Span`]s into the raw
//! source the tree was parsed from, not copies:
//! - Nodes carry a tagged [`NodeKind`] with kind-specific attributes
//! - Code blocks hold their content as an ordered list of source lines
//! - Text that does not exist verbatim in the source is a `StringLiteral`
//!
//! # Example
//!
//! ```
//! use mdlatex::ast::{NodeId, NodeKind, Span, Tree};
//!
//! let source = b"Hello";
//! let mut tree = Tree::new();
//! let para = tree.push(NodeId::ROOT, NodeKind::Paragraph);
//! tree.push(para, NodeKind::text(Span::new(0, 5)));
//! assert_eq!(tree.children(NodeId::ROOT).count(), 1);
//! # let _ = source;
//! ```

mod node;

pub use node::{AutoLinkType, Node, NodeId, NodeKind, Span};

/// A parsed document tree.
///
/// Index 0 is always the root `Document` node.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a new tree holding only the root Document.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get the kind of a node by ID.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// Get the number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a new detached node and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds `u32::MAX` nodes.
    pub fn alloc_node(&mut self, node: Node) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        assert!(index < u32::MAX, "document tree node limit reached");
        let id = NodeId(index);
        self.nodes.push(node);
        id
    }

    /// Append a detached child node to a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(prev_last) = self.nodes.get(parent.0 as usize).map(|p| p.last_child) else {
            return;
        };

        if let Some(child_node) = self.nodes.get_mut(child.0 as usize) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = prev_last;
            child_node.next_sibling = None;
        }

        match prev_last {
            Some(last) => {
                if let Some(last_node) = self.nodes.get_mut(last.0 as usize) {
                    last_node.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(parent_node) = self.nodes.get_mut(parent.0 as usize) {
                    parent_node.first_child = Some(child);
                }
            }
        }

        if let Some(parent_node) = self.nodes.get_mut(parent.0 as usize) {
            parent_node.last_child = Some(child);
        }
    }

    /// Allocate a node of `kind` and append it under `parent`.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc_node(Node::new(kind));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Get the first child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.first_child)
    }

    /// Get the next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.first_child(parent),
        }
    }

    /// Iterate over all nodes in depth-first pre-order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Depth-first iterator over all nodes.
pub struct DfsIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        let mut children: Vec<NodeId> = self.tree.children(current).collect();
        children.reverse();
        self.stack.extend(children);

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_creation() {
        let tree = Tree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);

        let root = tree.node(NodeId::ROOT).unwrap();
        assert_eq!(root.kind, NodeKind::Document);
        assert!(root.parent.is_none());
    }

    #[test]
    fn test_span_value() {
        let source = b"Hello, World!";
        assert_eq!(Span::new(7, 5).value(source), b"World");
        assert_eq!(Span::from_range(0, 5).value(source), b"Hello");
        assert!(Span::new(10, 10).value(source).is_empty());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_span_offsets_past_limit_saturate() {
        let span = Span::from_range(5_000_000_000, 5_000_000_010);
        assert_eq!(span.start, u32::MAX);
        assert!(span.is_empty());
        assert_eq!(span.end(), u32::MAX);
        assert!(span.value(b"abc").is_empty());

        let span = Span::from_range(10, 5_000_000_000);
        assert_eq!(span.start, 10);
        assert_eq!(span.end(), u32::MAX);
    }

    #[test]
    fn test_sibling_links() {
        let mut tree = Tree::new();
        let a = tree.push(NodeId::ROOT, NodeKind::Paragraph);
        let b = tree.push(NodeId::ROOT, NodeKind::ThematicBreak);
        let c = tree.push(NodeId::ROOT, NodeKind::Paragraph);

        assert_eq!(tree.first_child(NodeId::ROOT), Some(a));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.next_sibling(c), None);
        assert_eq!(tree.prev_sibling(c), Some(b));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.parent(b), Some(NodeId::ROOT));
        assert_eq!(tree.node(NodeId::ROOT).unwrap().last_child, Some(c));
    }

    #[test]
    fn test_dfs_iteration() {
        let mut tree = Tree::new();

        let para1 = tree.push(NodeId::ROOT, NodeKind::Paragraph);
        let para2 = tree.push(NodeId::ROOT, NodeKind::Paragraph);
        let text = tree.push(para1, NodeKind::text(Span::new(0, 4)));

        let nodes: Vec<_> = tree.iter_dfs().collect();
        assert_eq!(nodes, vec![NodeId::ROOT, para1, text, para2]);
    }
}
