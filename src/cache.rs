//! Validity-checked memoization of resolved references
//!
//! `SharedCache` maps names to previously resolved nodes. On each access the
//! entry is re-checked against the live document: it is returned as-is only
//! while it is non-empty and every node it holds is still a strict descendant
//! of the view's root. Anything else (a missing entry, a detached node, an
//! empty previous result) falls through to the resolver and overwrites the
//! entry.
//!
//! This is lazy, pull-based invalidation: no mutation observer is needed, at
//! the cost of a containment walk per cached node on every access. The hit
//! path returns the cached handles unchanged, so repeated reads of a valid
//! name are identical by reference.
//!
//! The mapping itself is shared by handle (`Clone` is identity): a deferred
//! view and the synchronous view it wraps observe the same entries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::document::Document;
use crate::resolver::Resolved;

/// Whether a cached entry may still be handed out against `root`.
///
/// Valid iff non-empty and every held node is still a strict descendant of
/// `root`.
pub fn still_valid<D: Document>(doc: &D, root: D::Node, entry: &Resolved<D::Node>) -> bool {
    !entry.is_empty() && entry.nodes().iter().all(|node| doc.contains(root, *node))
}

/// Shared name-to-resolution cache for one view (or a view and its deferred
/// wrapper).
pub struct SharedCache<D: Document> {
    entries: Rc<RefCell<HashMap<String, Resolved<D::Node>>>>,
}

impl<D: Document> SharedCache<D> {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Return the cached entry for `name` if it is still valid, otherwise
    /// run `resolve`, overwrite the entry and return the fresh value.
    pub fn get_with_update<F>(
        &self,
        doc: &D,
        root: D::Node,
        name: &str,
        resolve: F,
    ) -> Resolved<D::Node>
    where
        F: FnOnce(&D) -> Resolved<D::Node>,
    {
        {
            let entries = self.entries.borrow();
            if let Some(entry) = entries.get(name) {
                if still_valid(doc, root, entry) {
                    return entry.clone();
                }
                log::trace!("cache entry for '{}' is stale, re-resolving", name);
            }
        }

        let fresh = resolve(doc);
        self.entries
            .borrow_mut()
            .insert(name.to_string(), fresh.clone());
        fresh
    }

    /// Unconditionally overwrite the entry for `name`.
    pub fn insert(&self, name: &str, value: Resolved<D::Node>) {
        self.entries.borrow_mut().insert(name.to_string(), value);
    }

    /// Peek at the current entry without validity checking or resolution
    pub fn peek(&self, name: &str) -> Option<Resolved<D::Node>> {
        self.entries.borrow().get(name).cloned()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<D: Document> Default for SharedCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> Clone for SharedCache<D> {
    /// Identity clone: both handles observe the same entries.
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}
