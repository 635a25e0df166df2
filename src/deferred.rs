//! # Deferred Resolution
//!
//! A `wait`-derived view answers reads with [`Pending`] handles instead of
//! immediate values. The name is polled through the normal validity-checked
//! path: an immediate non-empty result completes the handle on the spot;
//! otherwise a poll is registered with the injected scheduler and retried
//! with a doubling interval, capped at the configured maximum.
//!
//! A pending handle never times out and cannot be cancelled: a name that
//! never appears simply never completes, which is the accepted contract.
//! Successful polls populate the shared cache, so once a deferred read is
//! satisfied, synchronous reads of the same name are satisfied too.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::document::Document;
use crate::refs::{Ref, Refs};
use crate::scheduler::Scheduler;

struct PendingState<T> {
    value: Option<T>,
    callbacks: Vec<Box<dyn FnOnce(&T)>>,
}

/// A read that completes once its name resolves non-empty.
///
/// Consumers either poll ([`is_ready`](Pending::is_ready) /
/// [`value`](Pending::value)) or register a completion callback
/// ([`on_ready`](Pending::on_ready)). Handles are cheap to clone; all clones
/// observe the same completion.
pub struct Pending<T> {
    state: Rc<RefCell<PendingState<T>>>,
}

impl<T> Pending<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(PendingState {
                value: None,
                callbacks: Vec::new(),
            })),
        }
    }

    pub(crate) fn ready(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(PendingState {
                value: Some(value),
                callbacks: Vec::new(),
            })),
        }
    }

    /// Whether the read has completed
    pub fn is_ready(&self) -> bool {
        self.state.borrow().value.is_some()
    }
}

impl<T: Clone> Pending<T> {
    /// The completed value, if any
    pub fn value(&self) -> Option<T> {
        self.state.borrow().value.clone()
    }

    /// Run `callback` when the read completes, immediately if it already
    /// has.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static,
    {
        let ready = self.state.borrow().value.clone();
        match ready {
            Some(value) => callback(&value),
            None => self.state.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    /// First completion wins; later calls are ignored.
    pub(crate) fn complete(&self, value: T) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.value.is_some() {
                return;
            }
            state.value = Some(value.clone());
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }
}

impl<T> Clone for Pending<T> {
    /// Identity clone: all handles observe the same completion.
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

/// Deferred wrapper over a [`Refs`] view.
///
/// Shares the wrapped view's cache and bindings; that sharing is what makes
/// a satisfied deferred read visible to subsequent synchronous reads.
pub struct DeferredRefs<D: Document> {
    refs: Refs<D>,
    scheduler: Rc<dyn Scheduler>,
    initial: Duration,
    max: Duration,
}

impl<D: Document + 'static> DeferredRefs<D> {
    pub(crate) fn new(
        refs: Refs<D>,
        scheduler: Rc<dyn Scheduler>,
        initial: Duration,
        max: Duration,
    ) -> Self {
        Self {
            refs,
            scheduler,
            initial,
            max,
        }
    }

    /// The synchronous view this wrapper polls through
    pub fn refs(&self) -> &Refs<D> {
        &self.refs
    }

    /// Read `name`, deferring until it resolves non-empty.
    ///
    /// Bound names and already-resolvable names complete immediately without
    /// touching the scheduler. Two deferred reads of the same name are
    /// independent handles: each completes on its own next poll once the
    /// name is resolvable.
    pub fn get(&self, name: &str) -> Pending<Ref<D>> {
        let immediate = self.refs.get(name);
        if immediate.is_present() {
            return Pending::ready(immediate);
        }
        let pending = Pending::new();
        schedule_poll(
            self.refs.clone(),
            Rc::clone(&self.scheduler),
            name.to_string(),
            pending.clone(),
            self.initial,
            self.max,
        );
        pending
    }

    /// Deferred list-mode sibling: handles complete with the full matching
    /// set at completion time.
    pub fn list(&self) -> DeferredRefs<D> {
        Self {
            refs: self.refs.list(),
            scheduler: Rc::clone(&self.scheduler),
            initial: self.initial,
            max: self.max,
        }
    }
}

impl<D: Document> Clone for DeferredRefs<D> {
    fn clone(&self) -> Self {
        Self {
            refs: self.refs.clone(),
            scheduler: Rc::clone(&self.scheduler),
            initial: self.initial,
            max: self.max,
        }
    }
}

fn schedule_poll<D: Document + 'static>(
    refs: Refs<D>,
    scheduler: Rc<dyn Scheduler>,
    name: String,
    pending: Pending<Ref<D>>,
    delay: Duration,
    max: Duration,
) {
    let chain = Rc::clone(&scheduler);
    scheduler.schedule(
        delay,
        Box::new(move || {
            let result = refs.get(&name);
            if result.is_present() {
                log::debug!("deferred read of '{}' completed", name);
                pending.complete(result);
            } else {
                let next = (delay * 2).min(max);
                schedule_poll(refs, chain, name, pending, next, max);
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_starts_unresolved() {
        let pending: Pending<u32> = Pending::new();
        assert!(!pending.is_ready());
        assert_eq!(pending.value(), None);
    }

    #[test]
    fn test_ready_completes_immediately() {
        let pending = Pending::ready(5u32);
        assert!(pending.is_ready());
        assert_eq!(pending.value(), Some(5));
    }

    #[test]
    fn test_on_ready_fires_on_completion() {
        let pending: Pending<u32> = Pending::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        pending.on_ready(move |value| sink.borrow_mut().push(*value));
        assert!(seen.borrow().is_empty());

        pending.complete(9);
        assert_eq!(*seen.borrow(), vec![9]);

        // Already complete: fires immediately.
        let sink = Rc::clone(&seen);
        pending.on_ready(move |value| sink.borrow_mut().push(*value));
        assert_eq!(*seen.borrow(), vec![9, 9]);
    }

    #[test]
    fn test_first_completion_wins() {
        let pending: Pending<u32> = Pending::new();
        pending.complete(1);
        pending.complete(2);
        assert_eq!(pending.value(), Some(1));
    }

    #[test]
    fn test_clones_share_completion() {
        let pending: Pending<u32> = Pending::new();
        let alias = pending.clone();
        pending.complete(3);
        assert_eq!(alias.value(), Some(3));
    }
}
