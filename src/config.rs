//! # View Configuration
//!
//! This module defines the options bag accepted at construction of an access
//! surface. `Options` is an immutable value type: every `with_*` method
//! consumes and returns it, and derived views copy it wholesale rather than
//! mutating anything shared.
//!
//! ## Recognized options
//!
//! - `attribute`: the attribute the default per-name selector matches on
//!   (`ref` unless overridden).
//! - `list_key`: the key under which the list-mode sibling view is exposed
//!   (`list` unless overridden; can be disabled entirely).
//! - `custom_selector`: a selector resolved for every name instead of the
//!   attribute selector.
//! - query primitive overrides for non-standard traversal strategies.
//! - `scheduler` and polling tunables, only needed for `wait()` views.
//! - `cache`: an explicit cache handle, for callers that want to seed or
//!   share one.

use std::rc::Rc;
use std::time::Duration;

use crate::cache::SharedCache;
use crate::document::Document;
use crate::resolver::{ListQuery, Queries, SingleQuery};
use crate::scheduler::Scheduler;
use crate::selector::Selector;

/// Attribute consulted by the default per-name selector.
pub const DEFAULT_ATTRIBUTE: &str = "ref";
/// Key under which the list-mode view is exposed.
pub const DEFAULT_LIST_KEY: &str = "list";
/// First deferred poll interval.
pub const DEFAULT_POLL_INITIAL: Duration = Duration::from_millis(10);
/// Ceiling for the doubling poll backoff.
pub const DEFAULT_POLL_MAX: Duration = Duration::from_secs(1);

/// Construction options for an access surface.
pub struct Options<D: Document> {
    pub(crate) attribute: String,
    pub(crate) list_key: Option<String>,
    pub(crate) custom_selector: Option<Selector>,
    pub(crate) queries: Queries<D>,
    pub(crate) scheduler: Option<Rc<dyn Scheduler>>,
    pub(crate) poll_initial: Duration,
    pub(crate) poll_max: Duration,
    pub(crate) cache: Option<SharedCache<D>>,
}

impl<D: Document> Options<D> {
    /// Options with all defaults
    pub fn new() -> Self {
        Self {
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            list_key: Some(DEFAULT_LIST_KEY.to_string()),
            custom_selector: None,
            queries: Queries::default(),
            scheduler: None,
            poll_initial: DEFAULT_POLL_INITIAL,
            poll_max: DEFAULT_POLL_MAX,
            cache: None,
        }
    }

    /// Use a different attribute for the default per-name selector
    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = attribute.to_string();
        self
    }

    /// Expose the list-mode view under a different key
    pub fn with_list_key(mut self, key: &str) -> Self {
        self.list_key = Some(key.to_string());
        self
    }

    /// Do not expose a list-mode view by key at all
    pub fn without_list_key(mut self) -> Self {
        self.list_key = None;
        self
    }

    /// Resolve every name through `selector` instead of the attribute
    /// selector
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.custom_selector = Some(selector);
        self
    }

    /// Override the singular query primitive
    pub fn with_single_query(mut self, query: SingleQuery<D>) -> Self {
        self.queries.single = Some(query);
        self
    }

    /// Override the list query primitive
    pub fn with_list_query(mut self, query: ListQuery<D>) -> Self {
        self.queries.list = Some(query);
        self
    }

    /// Provide the scheduler that makes `wait()` views available
    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Tune the deferred polling backoff: first interval and its ceiling.
    ///
    /// The interval doubles after every unsuccessful poll until it reaches
    /// `max`.
    pub fn with_poll_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.poll_initial = initial;
        self.poll_max = max;
        self
    }

    /// Seed the view with an existing cache handle
    pub fn with_cache(mut self, cache: SharedCache<D>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl<D: Document> Default for Options<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> Clone for Options<D> {
    fn clone(&self) -> Self {
        Self {
            attribute: self.attribute.clone(),
            list_key: self.list_key.clone(),
            custom_selector: self.custom_selector.clone(),
            queries: self.queries.clone(),
            scheduler: self.scheduler.clone(),
            poll_initial: self.poll_initial,
            poll_max: self.poll_max,
            cache: self.cache.clone(),
        }
    }
}

impl<D: Document> std::fmt::Debug for Options<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("attribute", &self.attribute)
            .field("list_key", &self.list_key)
            .field("custom_selector", &self.custom_selector)
            .field("single_query_override", &self.queries.single.is_some())
            .field("list_query_override", &self.queries.list.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("poll_initial", &self.poll_initial)
            .field("poll_max", &self.poll_max)
            .field("seeded_cache", &self.cache.is_some())
            .finish()
    }
}
