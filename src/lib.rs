//! # Treeref Library
//!
//! This library provides lazy, auto-invalidating named references to
//! descendant nodes of a tree-shaped document. Nodes are addressed by a
//! declared attribute (`ref` by default) rather than by repeated manual
//! traversal: the first read of a name resolves and memoizes it, and every
//! later read re-checks that the memoized nodes are still attached under the
//! view's root before handing them back.
//!
//! ## Quick Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use treeref::config::Options;
//! use treeref::refs::Refs;
//! use treeref::tree::ElementTree;
//!
//! // Build a small document tree
//! let mut tree = ElementTree::new();
//! let farm = tree.create_element("farm");
//! let cow = tree.create_element_with("animal", &[("ref", "cow")]);
//! tree.append(farm, cow).unwrap();
//!
//! // Attach an access surface to it
//! let doc = Rc::new(RefCell::new(tree));
//! let refs = Refs::new(Rc::clone(&doc), farm, Options::new());
//!
//! // Named reads resolve lazily and are cached while valid
//! assert_eq!(refs.get("cow").node(), Some(cow));
//!
//! // Detaching the node invalidates the entry; the next read re-resolves
//! {
//!     let mut tree = doc.borrow_mut();
//!     tree.detach(cow);
//!     let calf = tree.create_element_with("animal", &[("ref", "cow")]);
//!     tree.append(farm, calf).unwrap();
//! }
//! assert_ne!(refs.get("cow").node(), Some(cow));
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Document (`document`, `tree`)**: the consumed tree capability, a
//!   containment test plus first/all descendant queries. `ElementTree` is
//!   the in-crate implementation; any tree model can implement the trait.
//! - **Selectors (`selector`)**: the compound-selector subset used to locate
//!   nodes. The default per-name selector `[ref="name"]` is built
//!   structurally; `select()` accepts parsed strings.
//! - **Resolution (`resolver`)**: one query execution, first match or all
//!   matches in document order, with pluggable query primitives.
//! - **Validity-Checked Cache (`cache`)**: name-to-nodes memoization that
//!   discards an entry the moment any of its nodes leaves the root's
//!   subtree.
//! - **Access Surface (`refs`)**: the key-based façade: `get`/`set`,
//!   forced `update`, and the derived views `scope`, `select`, `list` and
//!   `wait`.
//! - **Deferred Access (`deferred`, `scheduler`)**: reads that stay pending
//!   until a name appears, polled with backoff through an injected
//!   scheduler.
//!
//! ## Resolution Flow
//!
//! A read through the access surface takes the following steps:
//!
//! 1.  **Bindings**: a caller-assigned value or materialized capability view
//!     under that key is returned verbatim.
//! 2.  **Validity check**: a cached entry is returned as-is while it is
//!     non-empty and every node in it is still a strict descendant of the
//!     view's root.
//! 3.  **Resolution**: otherwise the effective selector (custom, or built
//!     from the attribute and the name) runs against the root and the result
//!     overwrites the cache entry.
//!
//! Absence is a normal result at every step: an absent singular node, an
//! empty sequence, or a still-pending deferred read. The only errors this
//! library surfaces are misconfiguration: an unparseable selector, a
//! structurally invalid tree mutation, or deferred access without a
//! scheduler.

pub mod cache;
pub mod config;
pub mod deferred;
pub mod document;
pub mod error;
pub mod refs;
pub mod resolver;
pub mod scheduler;
pub mod selector;
pub mod tree;

#[cfg(test)]
mod refs_proptest;
