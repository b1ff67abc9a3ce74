//! Exit completion bookkeeping shared by the exit presets

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use segue_core::ExitDone;

/// Elements of one exit invocation that have not finished yet
///
/// In batch mode the whole batch is completed once the last element settles.
/// In separate mode every element is completed on its own.
pub(crate) struct ExitBatch<E> {
    done: ExitDone<E>,
    separate: bool,
    outstanding: RefCell<FxHashSet<E>>,
}

impl<E: Clone + Eq + Hash> ExitBatch<E> {
    fn new(elements: &[E], done: ExitDone<E>, separate: bool) -> Self {
        Self {
            done,
            separate,
            outstanding: RefCell::new(elements.iter().cloned().collect()),
        }
    }

    /// Mark `element` finished, completing whatever became complete
    fn settle(&self, element: &E) {
        let remaining = {
            let mut outstanding = self.outstanding.borrow_mut();
            if !outstanding.remove(element) {
                return;
            }
            outstanding.len()
        };

        if self.separate {
            self.done.element(element);
        } else if remaining == 0 {
            self.done.all();
        }
    }

    /// Stop waiting for `element` without completing it
    fn withdraw(&self, element: &E) {
        let remaining = {
            let mut outstanding = self.outstanding.borrow_mut();
            if !outstanding.remove(element) {
                return;
            }
            outstanding.len()
        };

        if !self.separate && remaining == 0 {
            self.done.all();
        }
    }
}

struct Tracked<E, S> {
    batch: Rc<ExitBatch<E>>,
    state: Option<S>,
}

/// Maps exiting elements to their batch and per-element exit state
///
/// `S` is whatever the preset needs to undo an exit on cancellation: a
/// running animation handle, or registered end listeners.
pub(crate) struct ExitTracker<E, S> {
    entries: RefCell<FxHashMap<E, Tracked<E, S>>>,
}

impl<E, S> Default for ExitTracker<E, S> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(FxHashMap::default()),
        }
    }
}

impl<E: Clone + Eq + Hash, S> ExitTracker<E, S> {
    /// Start tracking a new batch
    pub(crate) fn begin(
        &self,
        elements: &[E],
        done: ExitDone<E>,
        separate: bool,
    ) -> Rc<ExitBatch<E>> {
        let batch = Rc::new(ExitBatch::new(elements, done, separate));
        let mut entries = self.entries.borrow_mut();
        for element in elements {
            entries.insert(
                element.clone(),
                Tracked {
                    batch: Rc::clone(&batch),
                    state: None,
                },
            );
        }
        batch
    }

    /// Whether `element` is still exiting as part of `batch`
    pub(crate) fn is_tracked(&self, element: &E, batch: &Rc<ExitBatch<E>>) -> bool {
        self.entries
            .borrow()
            .get(element)
            .is_some_and(|tracked| Rc::ptr_eq(&tracked.batch, batch))
    }

    /// Store the state needed to cancel `element`'s exit
    ///
    /// Returns `false` and drops `state` when the element is no longer
    /// exiting as part of `batch`.
    pub(crate) fn attach(&self, element: &E, batch: &Rc<ExitBatch<E>>, state: S) -> bool {
        match self.entries.borrow_mut().get_mut(element) {
            Some(tracked) if Rc::ptr_eq(&tracked.batch, batch) => {
                tracked.state = Some(state);
                true
            }
            _ => false,
        }
    }

    /// `element` finished exiting as part of `batch`
    ///
    /// Stale notifications (the element re-entered, or exits again as part of
    /// a newer batch) are ignored.
    pub(crate) fn finish(&self, element: &E, batch: &Rc<ExitBatch<E>>) {
        if !self.release(element, batch) {
            return;
        }
        batch.settle(element);
    }

    /// `element` re-entered: forget it and hand back its exit state
    pub(crate) fn cancel(&self, element: &E) -> Option<S> {
        let tracked = self.entries.borrow_mut().remove(element)?;
        tracked.batch.withdraw(element);
        tracked.state
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn release(&self, element: &E, batch: &Rc<ExitBatch<E>>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let current = entries
            .get(element)
            .is_some_and(|tracked| Rc::ptr_eq(&tracked.batch, batch));
        if current {
            entries.remove(element);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_core::Removal;

    fn recording_done() -> (ExitDone<u32>, Rc<RefCell<Vec<Option<u32>>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let done = ExitDone::new(move |removal: Removal<'_, u32>| match removal {
            Removal::All => l.borrow_mut().push(None),
            Removal::Only(els) => l.borrow_mut().extend(els.iter().map(|e| Some(*e))),
        });
        (done, log)
    }

    #[test]
    fn test_batch_completes_after_last_element() {
        let tracker: ExitTracker<u32, ()> = ExitTracker::default();
        let (done, log) = recording_done();
        let batch = tracker.begin(&[1, 2, 3], done, false);

        tracker.finish(&2, &batch);
        tracker.finish(&1, &batch);
        assert!(log.borrow().is_empty());

        tracker.finish(&3, &batch);
        assert_eq!(*log.borrow(), vec![None]);
        assert_eq!(tracker.len(), 0);

        // Repeat notifications are ignored
        tracker.finish(&3, &batch);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_separate_completes_each_element() {
        let tracker: ExitTracker<u32, ()> = ExitTracker::default();
        let (done, log) = recording_done();
        let batch = tracker.begin(&[1, 2], done, true);

        tracker.finish(&2, &batch);
        tracker.finish(&1, &batch);
        assert_eq!(*log.borrow(), vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_cancel_returns_state_and_unblocks_batch() {
        let tracker: ExitTracker<u32, &'static str> = ExitTracker::default();
        let (done, log) = recording_done();
        let batch = tracker.begin(&[1, 2], done, false);
        assert!(tracker.attach(&2, &batch, "anim-2"));

        tracker.finish(&1, &batch);
        assert!(log.borrow().is_empty());

        // The last outstanding element re-entered, the rest may go
        assert_eq!(tracker.cancel(&2), Some("anim-2"));
        assert_eq!(*log.borrow(), vec![None]);

        // Its old animation finishing later changes nothing
        tracker.finish(&2, &batch);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_stale_batch_is_ignored() {
        let tracker: ExitTracker<u32, ()> = ExitTracker::default();
        let (first_done, first_log) = recording_done();
        let first = tracker.begin(&[1], first_done, false);
        tracker.cancel(&1);

        let (second_done, second_log) = recording_done();
        let second = tracker.begin(&[1], second_done, false);

        tracker.finish(&1, &first);
        assert!(tracker.is_tracked(&1, &second));
        assert!(!tracker.attach(&1, &first, ()));

        tracker.finish(&1, &second);
        assert_eq!(*first_log.borrow(), vec![None]);
        assert_eq!(*second_log.borrow(), vec![None]);
    }
}
