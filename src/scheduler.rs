//! # Scheduler Capability
//!
//! Deferred resolution polls the document until a name appears. The polling
//! mechanism is not hard-wired to any host environment: the engine consumes
//! an injected [`Scheduler`] ("run this callback after this interval") and
//! nothing more. A host event loop adapts its own timer facility; tests (and
//! any cooperative driver) use [`ManualScheduler`] and advance virtual time
//! explicitly.
//!
//! Everything here is single-threaded and cooperative: callbacks run on the
//! caller of [`ManualScheduler::advance`], never on another thread.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// The injected timer capability.
pub trait Scheduler {
    /// Arrange for `callback` to run once, `delay` from now.
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}

struct Task {
    due: Duration,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    seq: u64,
    queue: Vec<Task>,
}

/// Deterministic scheduler driven by explicit time advancement.
///
/// Tasks fire in due-time order (FIFO among equal due times) when
/// [`advance`](ManualScheduler::advance) moves virtual time past them. A
/// callback may schedule further tasks; those run within the same `advance`
/// call if their due time has already been reached.
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ManualInner::default())),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks waiting to fire
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Advance virtual time by `delta`, running every task that becomes due.
    pub fn advance(&self, delta: Duration) {
        let target = self.inner.borrow().now + delta;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.due <= target)
                    .min_by_key(|(_, task)| (task.due, task.seq))
                    .map(|(index, _)| index);
                match next {
                    Some(index) => {
                        let task = inner.queue.swap_remove(index);
                        inner.now = inner.now.max(task.due);
                        task
                    }
                    None => {
                        inner.now = target;
                        break;
                    }
                }
            };
            // Run outside the borrow: the callback may schedule more tasks.
            (task.callback)();
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ManualScheduler {
    /// Identity clone: both handles drive the same queue.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now + delay;
        let seq = inner.seq;
        inner.seq += 1;
        inner.queue.push(Task { due, seq, callback });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn test_tasks_fire_in_due_order() {
        let scheduler = ManualScheduler::new();
        let order = Rc::new(StdRefCell::new(Vec::new()));

        for (label, delay) in [("b", 20), ("a", 10), ("c", 30)] {
            let order = Rc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*order.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_task_not_due_does_not_fire() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(StdRefCell::new(false));
        let flag = Rc::clone(&fired);
        scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || *flag.borrow_mut() = true),
        );

        scheduler.advance(Duration::from_millis(99));
        assert!(!*fired.borrow());
        scheduler.advance(Duration::from_millis(1));
        assert!(*fired.borrow());
    }

    #[test]
    fn test_rescheduling_callback_runs_within_advance() {
        let scheduler = ManualScheduler::new();
        let hits = Rc::new(StdRefCell::new(0u32));

        fn tick(scheduler: ManualScheduler, hits: Rc<StdRefCell<u32>>) {
            let inner = scheduler.clone();
            scheduler.schedule(
                Duration::from_millis(10),
                Box::new(move || {
                    *hits.borrow_mut() += 1;
                    if *hits.borrow() < 3 {
                        tick(inner, hits);
                    }
                }),
            );
        }

        tick(scheduler.clone(), Rc::clone(&hits));
        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*hits.borrow(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_virtual_time_accumulates() {
        let scheduler = ManualScheduler::new();
        assert_eq!(scheduler.now(), Duration::ZERO);
        scheduler.advance(Duration::from_millis(15));
        scheduler.advance(Duration::from_millis(5));
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }
}
