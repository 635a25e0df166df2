//! # Reference Resolver
//!
//! Given a document, a query root, a selector and a mode, compute the
//! resolution result: the first matching strict descendant (singular mode)
//! or all matching strict descendants in document order (list mode).
//!
//! Zero matches is a normal, representable result in both modes, never an
//! error. The query primitives default to the [`Document`] implementation
//! but can be overridden per view through [`Queries`] to plug in a
//! non-standard traversal strategy.

use std::rc::Rc;

use crate::document::Document;
use crate::selector::Selector;

/// Whether a view resolves one node per name or all matching nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    List,
}

/// Outcome of resolving one name: absent, one node, or an ordered sequence.
///
/// Doubles as the cached representation; cache validity is a predicate over
/// exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<N> {
    /// No matching descendant (singular mode only).
    None,
    /// The first matching descendant (singular mode).
    Node(N),
    /// All matching descendants in document order (list mode; may be empty).
    Nodes(Vec<N>),
}

impl<N: Copy> Resolved<N> {
    /// True when there is nothing here: absent, or an empty sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            Resolved::None => true,
            Resolved::Node(_) => false,
            Resolved::Nodes(nodes) => nodes.is_empty(),
        }
    }

    /// The held nodes as a uniform sequence view, for containment checking.
    pub fn nodes(&self) -> Vec<N> {
        match self {
            Resolved::None => Vec::new(),
            Resolved::Node(node) => vec![*node],
            Resolved::Nodes(nodes) => nodes.clone(),
        }
    }
}

/// Override for the singular query primitive.
pub type SingleQuery<D> =
    Rc<dyn Fn(&D, <D as Document>::Node, &Selector) -> Option<<D as Document>::Node>>;

/// Override for the list query primitive.
pub type ListQuery<D> =
    Rc<dyn Fn(&D, <D as Document>::Node, &Selector) -> Vec<<D as Document>::Node>>;

/// Optional caller overrides for the two query primitives.
pub struct Queries<D: Document> {
    pub single: Option<SingleQuery<D>>,
    pub list: Option<ListQuery<D>>,
}

impl<D: Document> Queries<D> {
    fn query_first(&self, doc: &D, root: D::Node, selector: &Selector) -> Option<D::Node> {
        match &self.single {
            Some(query) => query(doc, root, selector),
            None => doc.query_first(root, selector),
        }
    }

    fn query_all(&self, doc: &D, root: D::Node, selector: &Selector) -> Vec<D::Node> {
        match &self.list {
            Some(query) => query(doc, root, selector),
            None => doc.query_all(root, selector),
        }
    }
}

impl<D: Document> Default for Queries<D> {
    fn default() -> Self {
        Self {
            single: None,
            list: None,
        }
    }
}

impl<D: Document> Clone for Queries<D> {
    fn clone(&self) -> Self {
        Self {
            single: self.single.clone(),
            list: self.list.clone(),
        }
    }
}

/// Execute the query for one selector against `root`.
pub fn resolve<D: Document>(
    doc: &D,
    root: D::Node,
    selector: &Selector,
    mode: Mode,
    queries: &Queries<D>,
) -> Resolved<D::Node> {
    match mode {
        Mode::Single => match queries.query_first(doc, root, selector) {
            Some(node) => Resolved::Node(node),
            None => Resolved::None,
        },
        Mode::List => Resolved::Nodes(queries.query_all(doc, root, selector)),
    }
}
