//! # The Access Surface
//!
//! `Refs` is the single entry point of the engine: a key-based lookup façade
//! over one query root. A read first consults the view's bindings (caller-
//! assigned values and materialized capability views), then falls through to
//! the validity-checked cache, which re-resolves on miss or staleness.
//!
//! ## Reads and writes
//!
//! - [`Refs::get`] resolves a name to a [`Ref`]: a node, an ordered node
//!   sequence (list views), an absent result, a caller-assigned value, or a
//!   bound sub-view.
//! - [`Refs::set`] binds an arbitrary value to a name. A bound name
//!   permanently shadows resolution: later reads return the value verbatim
//!   even if a matching descendant appears.
//!
//! ## Derived views
//!
//! Each derivation is a cheap new view, never a mutation of the existing
//! one. `scope` re-roots, `select` substitutes a custom selector, `list`
//! switches to the list query primitive, and `wait` wraps the same view for
//! deferred access. Every derived view owns an independent cache except
//! `wait`, which deliberately shares the cache of the view it wraps so a
//! satisfied deferred read also satisfies later synchronous reads.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::cache::SharedCache;
use crate::config::Options;
use crate::deferred::DeferredRefs;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::resolver::{self, Mode, Resolved};
use crate::selector::Selector;

/// Result of one read through the access surface.
pub enum Ref<D: Document> {
    /// No matching descendant (singular views).
    None,
    /// The resolved node (singular views).
    Node(D::Node),
    /// All matching nodes in document order (list views; may be empty).
    Nodes(Vec<D::Node>),
    /// A caller-assigned value, returned verbatim.
    Value(Rc<dyn Any>),
    /// A derived view bound under a capability key (e.g. the list key).
    View(Refs<D>),
}

impl<D: Document> Ref<D> {
    /// The singular node, if this read resolved one
    pub fn node(&self) -> Option<D::Node> {
        match self {
            Ref::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// The resolved nodes as a sequence (one-element for a singular hit,
    /// empty for absence, values and views)
    pub fn nodes(&self) -> Vec<D::Node> {
        match self {
            Ref::Node(node) => vec![*node],
            Ref::Nodes(nodes) => nodes.clone(),
            _ => Vec::new(),
        }
    }

    /// Downcast a caller-assigned value
    pub fn value<T: Any>(&self) -> Option<Rc<T>> {
        match self {
            Ref::Value(value) => Rc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// The bound sub-view, if this key named one
    pub fn view(&self) -> Option<Refs<D>> {
        match self {
            Ref::View(view) => Some(view.clone()),
            _ => None,
        }
    }

    /// False only for absence: a missing singular node or an empty list.
    ///
    /// This is the emptiness criterion deferred reads poll on.
    pub fn is_present(&self) -> bool {
        match self {
            Ref::None => false,
            Ref::Nodes(nodes) => !nodes.is_empty(),
            _ => true,
        }
    }
}

impl<D: Document> Clone for Ref<D> {
    fn clone(&self) -> Self {
        match self {
            Ref::None => Ref::None,
            Ref::Node(node) => Ref::Node(*node),
            Ref::Nodes(nodes) => Ref::Nodes(nodes.clone()),
            Ref::Value(value) => Ref::Value(Rc::clone(value)),
            Ref::View(view) => Ref::View(view.clone()),
        }
    }
}

impl<D: Document> fmt::Debug for Ref<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::None => write!(f, "Ref::None"),
            Ref::Node(node) => f.debug_tuple("Ref::Node").field(node).finish(),
            Ref::Nodes(nodes) => f.debug_tuple("Ref::Nodes").field(nodes).finish(),
            Ref::Value(_) => write!(f, "Ref::Value(..)"),
            Ref::View(view) => f.debug_tuple("Ref::View").field(view).finish(),
        }
    }
}

/// A name bound in the view's namespace, shadowing resolution.
enum Binding<D: Document> {
    Value(Rc<dyn Any>),
    View(Refs<D>),
}

impl<D: Document> Binding<D> {
    fn to_ref(&self) -> Ref<D> {
        match self {
            Binding::Value(value) => Ref::Value(Rc::clone(value)),
            Binding::View(view) => Ref::View(view.clone()),
        }
    }
}

struct Inner<D: Document> {
    doc: Rc<RefCell<D>>,
    root: D::Node,
    mode: Mode,
    config: Options<D>,
    cache: SharedCache<D>,
    bindings: RefCell<HashMap<String, Binding<D>>>,
}

/// Key-based access surface over one query root.
///
/// Cheap to clone: clones are handles to the same view. Construct with
/// [`Refs::new`]; derive narrower or differently-configured views with
/// [`scope`](Refs::scope), [`select`](Refs::select), [`list`](Refs::list)
/// and [`wait`](Refs::wait).
pub struct Refs<D: Document> {
    inner: Rc<Inner<D>>,
}

impl<D: Document> Refs<D> {
    /// Create an access surface over `root` within `doc`.
    ///
    /// If `root` exposes a shadow root, the view transparently descends into
    /// it.
    pub fn new(doc: Rc<RefCell<D>>, root: D::Node, options: Options<D>) -> Refs<D> {
        let cache = options.cache.clone().unwrap_or_default();
        let mut config = options;
        // The seed is consumed here; derived views always build fresh caches.
        config.cache = None;
        Self::with_parts(doc, root, Mode::Single, config, cache)
    }

    fn with_parts(
        doc: Rc<RefCell<D>>,
        root: D::Node,
        mode: Mode,
        config: Options<D>,
        cache: SharedCache<D>,
    ) -> Refs<D> {
        let root = {
            let borrowed = doc.borrow();
            borrowed.shadow_root(root).unwrap_or(root)
        };
        Refs {
            inner: Rc::new(Inner {
                doc,
                root,
                mode,
                config,
                cache,
                bindings: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The node queries run against
    pub fn root(&self) -> D::Node {
        self.inner.root
    }

    /// Whether this is a singular or list view
    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    /// The attribute the default per-name selector matches on
    pub fn attribute(&self) -> &str {
        &self.inner.config.attribute
    }

    /// Handle to the shared document
    pub fn document(&self) -> Rc<RefCell<D>> {
        Rc::clone(&self.inner.doc)
    }

    /// Read `name`.
    ///
    /// Bound names (caller values, materialized capability views) win over
    /// resolution. Otherwise the validity-checked cache answers, re-resolving
    /// when the entry is missing, stale or empty. Absence is a normal result,
    /// never an error.
    pub fn get(&self, name: &str) -> Ref<D> {
        if let Some(bound) = self.reserved(name) {
            return bound;
        }
        match self.lookup(name) {
            Resolved::None => Ref::None,
            Resolved::Node(node) => Ref::Node(node),
            Resolved::Nodes(nodes) => Ref::Nodes(nodes),
        }
    }

    /// Bind `value` to `name`, permanently shadowing resolution for it.
    ///
    /// This is the caller-defined namespace: any `'static` value can be
    /// stored and is returned verbatim by every later read, bypassing
    /// validity checking entirely. Binding the configured list key is
    /// allowed and shadows the capability.
    pub fn set<T: Any>(&self, name: &str, value: T) {
        self.inner
            .bindings
            .borrow_mut()
            .insert(name.to_string(), Binding::Value(Rc::new(value)));
    }

    /// Unconditionally re-resolve `name` and overwrite its cache entry.
    ///
    /// Returns the surface for chaining: `refs.update("a").update("b")`.
    /// Use after an external bulk mutation the containment check cannot
    /// observe in time.
    pub fn update(&self, name: &str) -> &Self {
        let fresh = {
            let doc = self.inner.doc.borrow();
            self.resolve(&doc, name)
        };
        log::debug!("update('{}') resolved {} node(s)", name, fresh.nodes().len());
        self.inner.cache.insert(name, fresh);
        self
    }

    /// Derive a view rooted at `root` with the same configuration.
    ///
    /// Queries through the new view resolve strictly within the new root's
    /// subtree. The derived view starts with an empty cache.
    pub fn scope(&self, root: D::Node) -> Refs<D> {
        Self::with_parts(
            Rc::clone(&self.inner.doc),
            root,
            self.inner.mode,
            self.inner.config.clone(),
            SharedCache::new(),
        )
    }

    /// Derive a view resolving `selector` for every name.
    ///
    /// The selector is parsed eagerly; an invalid string is the one
    /// misconfiguration this surface reports.
    pub fn select(&self, selector: &str) -> Result<Refs<D>> {
        let parsed = Selector::parse(selector)?;
        let mut config = self.inner.config.clone();
        config.custom_selector = Some(parsed);
        Ok(Self::with_parts(
            Rc::clone(&self.inner.doc),
            self.inner.root,
            self.inner.mode,
            config,
            SharedCache::new(),
        ))
    }

    /// Derive the list-mode sibling view.
    ///
    /// The sibling has its own cache (a name can validly resolve to
    /// different singular and plural results) and no list key of its own, so
    /// list views do not nest. Idempotent on a view already in list mode.
    pub fn list(&self) -> Refs<D> {
        if self.inner.mode == Mode::List {
            return self.clone();
        }
        let mut config = self.inner.config.clone();
        config.list_key = None;
        Self::with_parts(
            Rc::clone(&self.inner.doc),
            self.inner.root,
            Mode::List,
            config,
            SharedCache::new(),
        )
    }

    /// Wrap this view for deferred access.
    ///
    /// Reads through the wrapper return pending results that complete once
    /// the name resolves non-empty. Requires a scheduler in the options;
    /// without one this is a misconfiguration.
    pub fn wait(&self) -> Result<DeferredRefs<D>>
    where
        D: 'static,
    {
        match &self.inner.config.scheduler {
            Some(scheduler) => Ok(DeferredRefs::new(
                self.clone(),
                Rc::clone(scheduler),
                self.inner.config.poll_initial,
                self.inner.config.poll_max,
            )),
            None => Err(Error::SchedulerMissing),
        }
    }

    /// Bindings first; the list capability materializes lazily on first read
    /// of its (unbound) key and is memoized as a binding from then on.
    fn reserved(&self, name: &str) -> Option<Ref<D>> {
        if let Some(binding) = self.inner.bindings.borrow().get(name) {
            return Some(binding.to_ref());
        }
        if self.inner.config.list_key.as_deref() == Some(name) {
            let view = self.list();
            self.inner
                .bindings
                .borrow_mut()
                .insert(name.to_string(), Binding::View(view.clone()));
            return Some(Ref::View(view));
        }
        None
    }

    fn effective_selector(&self, name: &str) -> Selector {
        match &self.inner.config.custom_selector {
            Some(selector) => selector.clone(),
            None => Selector::attr_eq(&self.inner.config.attribute, name),
        }
    }

    fn resolve(&self, doc: &D, name: &str) -> Resolved<D::Node> {
        let selector = self.effective_selector(name);
        resolver::resolve(
            doc,
            self.inner.root,
            &selector,
            self.inner.mode,
            &self.inner.config.queries,
        )
    }

    fn lookup(&self, name: &str) -> Resolved<D::Node> {
        let doc = self.inner.doc.borrow();
        self.inner
            .cache
            .get_with_update(&doc, self.inner.root, name, |doc| self.resolve(doc, name))
    }
}

impl<D: Document> Clone for Refs<D> {
    /// Identity clone: a handle to the same view.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Document> fmt::Debug for Refs<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refs")
            .field("root", &self.inner.root)
            .field("mode", &self.inner.mode)
            .field("attribute", &self.inner.config.attribute)
            .finish()
    }
}
