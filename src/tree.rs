//! In-memory element tree implementation for reference resolution
//!
//! `ElementTree` is an arena-backed tree of tagged, attributed nodes. It is
//! the crate's reference [`Document`] implementation: tests, doctests and
//! hosts without their own tree model build one of these, mutate it freely
//! (append, detach, re-parent, attach shadow roots) and point the engine at
//! any node as a query root.
//!
//! Node handles ([`NodeId`]) are arena indices. Slots are never freed, so a
//! handle held by a cache entry stays valid after its node is detached,
//! which is exactly what the validity check needs to observe.

use std::collections::HashMap;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::selector::Selector;

/// Handle to a node within one `ElementTree`.
///
/// Handles are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Shadow subtree root hosted by this node, if any. Shadow content is a
    /// separate tree: it is invisible to queries and containment checks run
    /// against the host's tree.
    shadow: Option<NodeId>,
}

/// In-memory element tree for fast node manipulation
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    nodes: Vec<NodeData>,
}

impl ElementTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element with the given tag
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_string(),
            attrs: HashMap::new(),
            parent: None,
            children: Vec::new(),
            shadow: None,
        });
        id
    }

    /// Create an element with attributes already set
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(id, name, value);
        }
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Re-parents like a real document tree: if `child` is currently attached
    /// elsewhere it is detached first. Appending a node under itself or under
    /// one of its own descendants is an error.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child {
            return Err(Error::Tree {
                message: format!("cannot append node {:?} under itself", child),
            });
        }
        if self.is_strict_descendant(child, parent) {
            return Err(Error::Tree {
                message: format!(
                    "cannot append node {:?} under its own descendant {:?}",
                    child, parent
                ),
            });
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detach a node from its parent, leaving its subtree intact.
    ///
    /// Detaching an already-detached node is a no-op.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Remove an attribute if present
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attrs.remove(name);
    }

    /// Get an attribute value
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attrs.get(name).map(String::as_str)
    }

    /// Get a node's tag
    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    /// Get a node's parent
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Get a node's children in document order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Attach a shadow root to `host`, or return the existing one.
    ///
    /// The shadow root is a parentless node; its subtree is reachable only
    /// through [`Document::shadow_root`], never through queries against the
    /// host's tree.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.nodes[host.0].shadow {
            return existing;
        }
        let shadow = self.create_element("shadow-root");
        self.nodes[host.0].shadow = Some(shadow);
        shadow
    }

    /// Number of nodes ever created in this tree's arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strict descendants of `root` in document order (pre-order), not
    /// descending into shadow subtrees.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    fn is_strict_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes[parent.0].parent;
        }
        false
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let data = &self.nodes[node.0];
        selector.matches_with(Some(&data.tag), |name| data.attrs.get(name).cloned())
    }
}

impl Document for ElementTree {
    type Node = NodeId;

    fn contains(&self, root: NodeId, node: NodeId) -> bool {
        self.is_strict_descendant(root, node)
    }

    fn query_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].shadow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ElementTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = ElementTree::new();
        let root = tree.create_element("root");
        let a = tree.create_element_with("section", &[("ref", "a")]);
        let b = tree.create_element_with("section", &[("ref", "b")]);
        let c = tree.create_element_with("item", &[("ref", "a")]);
        tree.append(root, a).unwrap();
        tree.append(root, b).unwrap();
        tree.append(b, c).unwrap();
        (tree, root, a, b, c)
    }

    #[test]
    fn test_document_order_traversal() {
        let (tree, root, a, b, c) = sample();
        assert_eq!(tree.descendants(root), vec![a, b, c]);
        assert_eq!(tree.descendants(b), vec![c]);
        assert!(tree.descendants(c).is_empty());
    }

    #[test]
    fn test_query_first_and_all() {
        let (tree, root, a, _b, c) = sample();
        let sel = Selector::attr_eq("ref", "a");
        assert_eq!(tree.query_first(root, &sel), Some(a));
        assert_eq!(tree.query_all(root, &sel), vec![a, c]);
        // Root itself is never a match target.
        let root_sel = Selector::parse("root").unwrap();
        assert_eq!(tree.query_first(root, &root_sel), None);
    }

    #[test]
    fn test_contains_is_strict() {
        let (tree, root, a, b, c) = sample();
        assert!(tree.contains(root, c));
        assert!(tree.contains(b, c));
        assert!(!tree.contains(a, c));
        assert!(!tree.contains(root, root));
        assert!(!tree.contains(c, b));
    }

    #[test]
    fn test_detach_breaks_containment() {
        let (mut tree, root, _a, b, c) = sample();
        tree.detach(b);
        assert!(!tree.contains(root, b));
        // The subtree stays intact under the detached node.
        assert!(!tree.contains(root, c));
        assert!(tree.contains(b, c));
        assert_eq!(tree.children(b), &[c]);
    }

    #[test]
    fn test_append_reparents() {
        let (mut tree, root, a, b, c) = sample();
        tree.append(a, c).unwrap();
        assert!(tree.contains(a, c));
        assert!(!tree.contains(b, c));
        assert_eq!(tree.descendants(root), vec![a, c, b]);
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut tree, _root, _a, b, c) = sample();
        assert!(tree.append(b, b).is_err());
        assert!(tree.append(c, b).is_err());
    }

    #[test]
    fn test_attributes() {
        let (mut tree, _root, a, _b, _c) = sample();
        assert_eq!(tree.attribute(a, "ref"), Some("a"));
        tree.set_attribute(a, "ref", "renamed");
        assert_eq!(tree.attribute(a, "ref"), Some("renamed"));
        tree.remove_attribute(a, "ref");
        assert_eq!(tree.attribute(a, "ref"), None);
    }

    #[test]
    fn test_shadow_content_is_hidden_from_queries() {
        let (mut tree, root, a, _b, _c) = sample();
        let shadow = tree.attach_shadow(a);
        let inner = tree.create_element_with("item", &[("ref", "hidden")]);
        tree.append(shadow, inner).unwrap();

        let sel = Selector::attr_eq("ref", "hidden");
        assert_eq!(tree.query_first(root, &sel), None);
        assert_eq!(tree.query_first(shadow, &sel), Some(inner));
        assert!(!tree.contains(root, inner));
        assert!(tree.contains(shadow, inner));
    }

    #[test]
    fn test_attach_shadow_is_idempotent() {
        let (mut tree, _root, a, _b, _c) = sample();
        let first = tree.attach_shadow(a);
        assert_eq!(tree.attach_shadow(a), first);
        assert_eq!(tree.shadow_root(a), Some(first));
    }
}
