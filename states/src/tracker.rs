//! "Latest request wins" bookkeeping.
//!
//! A [`RequestTracker`] hands out one [`TaskHandle`] per issued request. Issuing a new
//! request cancels the previous one and bumps the generation, so a completion can be
//! checked against [`RequestTracker::is_current`] before it is allowed to touch state.

use tokio_util::sync::CancellationToken;

use crate::{TaskHandle, TaskId};

#[derive(Debug)]
pub struct RequestTracker {
    scope: &'static str,
    generation: u64,
    current: Option<TaskHandle>,
}

impl RequestTracker {
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            generation: 0,
            current: None,
        }
    }

    /// Issues a new request, superseding whatever was in flight.
    pub fn begin(&mut self) -> TaskHandle {
        self.invalidate();
        self.generation += 1;
        let handle = TaskHandle::new(
            TaskId::new(self.scope, self.generation),
            CancellationToken::new(),
        );
        log::trace!("issued request {}", handle.id());
        self.current = Some(handle.clone());
        handle
    }

    /// Cancels the in-flight request, if any. Its completion will no longer be current.
    pub fn invalidate(&mut self) {
        if let Some(previous) = self.current.take() {
            log::trace!("superseding request {}", previous.id());
            previous.cancel();
        }
    }

    /// Whether `id` belongs to the request that is still awaited.
    pub fn is_current(&self, id: TaskId) -> bool {
        self.current.as_ref().is_some_and(|handle| handle.id() == id)
    }

    /// Marks `id` as completed. Returns `false` for a stale id, leaving the tracker untouched.
    pub fn finish(&mut self, id: TaskId) -> bool {
        if self.is_current(id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Whether a request is currently awaited.
    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_supersedes_previous_request() {
        let mut tracker = RequestTracker::new("simple");

        let first = tracker.begin();
        let second = tracker.begin();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!tracker.is_current(first.id()));
        assert!(tracker.is_current(second.id()));
        assert_eq!(tracker.generation(), 2);
    }

    #[test]
    fn finish_rejects_stale_ids() {
        let mut tracker = RequestTracker::new("simple");

        let first = tracker.begin();
        let second = tracker.begin();

        assert!(!tracker.finish(first.id()));
        assert!(tracker.in_flight());
        assert!(tracker.finish(second.id()));
        assert!(!tracker.in_flight());
        // Finishing twice is stale as well
        assert!(!tracker.finish(second.id()));
    }

    #[test]
    fn invalidate_leaves_nothing_current() {
        let mut tracker = RequestTracker::new("logo");

        let handle = tracker.begin();
        tracker.invalidate();

        assert!(handle.is_cancelled());
        assert!(!tracker.is_current(handle.id()));
        assert!(!tracker.in_flight());
    }

    #[test]
    fn scopes_do_not_collide() {
        let mut a = RequestTracker::new("a");
        let mut b = RequestTracker::new("b");

        let from_a = a.begin();
        let from_b = b.begin();

        assert_eq!(from_a.id().generation(), from_b.id().generation());
        assert!(!a.is_current(from_b.id()));
        assert!(!b.is_current(from_a.id()));
    }
}
