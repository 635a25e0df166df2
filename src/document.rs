//! # Document Capability
//!
//! The engine does not own a tree model; it consumes one through the
//! [`Document`] trait. Anything that can answer "is this node still a
//! descendant of that root" and run a selector query over descendants can
//! host named references.
//!
//! The crate ships one complete implementation, [`crate::tree::ElementTree`],
//! and the query primitives are additionally overridable per view through
//! [`crate::config::Options`], so a custom traversal strategy does not
//! require a custom `Document`.

use std::fmt::Debug;
use std::hash::Hash;

use crate::selector::Selector;

/// The tree capability consumed by the reference engine.
///
/// `Node` is a cheap copyable handle (an arena index, a slotmap key, an
/// interned id). Handles must remain stable for detached nodes: the validity
/// check relies on asking `contains` about nodes that may have left the tree.
pub trait Document {
    /// Node handle type. Identity of a resolved reference is identity of its
    /// handle.
    type Node: Copy + Eq + Hash + Debug;

    /// Whether `node` is currently a strict descendant of `root`.
    ///
    /// A node is never a descendant of itself. Detached nodes are descendants
    /// of nothing.
    fn contains(&self, root: Self::Node, node: Self::Node) -> bool;

    /// First strict descendant of `root` matching `selector`, in document
    /// order.
    fn query_first(&self, root: Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// All strict descendants of `root` matching `selector`, in document
    /// order. Empty when nothing matches.
    fn query_all(&self, root: Self::Node, selector: &Selector) -> Vec<Self::Node>;

    /// Nested query root exposed by `node`, if any (a shadow boundary).
    ///
    /// When a view is constructed over a node that reports one, the engine
    /// transparently descends into it. The default is no indirection.
    fn shadow_root(&self, node: Self::Node) -> Option<Self::Node> {
        let _ = node;
        None
    }
}
