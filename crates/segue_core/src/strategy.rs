//! Enter, exit and move strategies
//!
//! Three independent capabilities a transition group can be configured with.
//! Each is optional; a missing strategy makes the matching phase a no-op.
//!
//! Closures of the right shape implement the traits directly:
//!
//! ```ignore
//! let enter = |els: &[Node], _phases: &PhaseContext| {
//!     for el in els {
//!         el.fade_in();
//!     }
//! };
//! ```
//!
//! Reusable presets live in `segue_animation::presets`.

use std::fmt;
use std::rc::Rc;

use crate::phase::PhaseContext;

/// Animates elements that appeared
pub trait Enter<E> {
    /// Called with the newly present elements, in display order
    fn enter(&self, elements: &[E], phases: &PhaseContext);

    /// Called once with the very first population of the group
    ///
    /// Used when the group is configured with `Initial::Auto`. The default
    /// adopts the elements without animation.
    fn initial(&self, elements: &[E], phases: &PhaseContext) {
        let _ = (elements, phases);
    }
}

/// Animates elements that disappeared
pub trait Exit<E> {
    /// Called with the elements that are no longer present
    ///
    /// The elements stay in the visible list until `done` completes them.
    /// Completion may happen synchronously, later, piecewise, or never.
    fn exit(&self, elements: &[E], done: ExitDone<E>, phases: &PhaseContext);

    /// Called when exiting elements re-entered before their exit completed
    ///
    /// Strategies should stop the exit animation and undo any detaching so the
    /// elements resume normal flow.
    fn cancel(&self, elements: &[E]) {
        let _ = elements;
    }
}

/// Animates elements whose position may have changed
pub trait Move<E> {
    /// Called before the new list is published, with the elements laid out
    /// before the mutation
    ///
    /// Implementations sample first positions synchronously and read last
    /// positions in the commit phase (see `segue_core::filter_moved`).
    fn moved(&self, elements: &[E], phases: &PhaseContext);
}

impl<E, F> Enter<E> for F
where
    F: Fn(&[E], &PhaseContext),
{
    fn enter(&self, elements: &[E], phases: &PhaseContext) {
        self(elements, phases)
    }
}

impl<E, F> Exit<E> for F
where
    F: Fn(&[E], ExitDone<E>, &PhaseContext),
{
    fn exit(&self, elements: &[E], done: ExitDone<E>, phases: &PhaseContext) {
        self(elements, done, phases)
    }
}

impl<E, F> Move<E> for F
where
    F: Fn(&[E], &PhaseContext),
{
    fn moved(&self, elements: &[E], phases: &PhaseContext) {
        self(elements, phases)
    }
}

// ============================================================================
// Exit completion
// ============================================================================

/// Which exiting elements a completion covers
#[derive(Debug)]
pub enum Removal<'a, E> {
    /// Every element of the batch that is still pending
    All,
    /// Only these elements
    Only(&'a [E]),
}

/// Completion handle handed to [`Exit::exit`]
///
/// Completing is idempotent: completing the same element twice, completing
/// an element of another batch, or completing after the element re-entered
/// is a no-op. Clones complete the same batch.
pub struct ExitDone<E> {
    complete: Rc<dyn Fn(Removal<'_, E>)>,
}

impl<E> ExitDone<E> {
    pub fn new(complete: impl Fn(Removal<'_, E>) + 'static) -> Self {
        Self {
            complete: Rc::new(complete),
        }
    }

    /// A handle that completes nothing
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Complete every still-pending element of the batch
    pub fn all(&self) {
        (self.complete)(Removal::All)
    }

    /// Complete a single element
    pub fn element(&self, element: &E) {
        (self.complete)(Removal::Only(std::slice::from_ref(element)))
    }

    /// Complete a subset of the batch
    pub fn elements(&self, elements: &[E]) {
        (self.complete)(Removal::Only(elements))
    }
}

impl<E> Clone for ExitDone<E> {
    fn clone(&self) -> Self {
        Self {
            complete: Rc::clone(&self.complete),
        }
    }
}

impl<E> fmt::Debug for ExitDone<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitDone").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::QueueHost;
    use crate::phase::RenderHost;
    use std::cell::RefCell;

    fn phases() -> PhaseContext {
        let host: Rc<dyn RenderHost> = Rc::new(QueueHost::new());
        PhaseContext::new(host)
    }

    #[test]
    fn test_closures_are_strategies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let enter: Rc<dyn Enter<u32>> =
            Rc::new(move |els: &[u32], _: &PhaseContext| s.borrow_mut().extend_from_slice(els));

        enter.enter(&[1, 2], &phases());
        // Default initial is a no-op
        enter.initial(&[3], &phases());

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_exit_done_forwards_removals() {
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = removed.clone();
        let done = ExitDone::new(move |removal: Removal<'_, u32>| match removal {
            Removal::All => r.borrow_mut().push(None),
            Removal::Only(els) => r.borrow_mut().extend(els.iter().map(|e| Some(*e))),
        });

        done.element(&7);
        done.clone().elements(&[8, 9]);
        done.all();

        assert_eq!(*removed.borrow(), vec![Some(7), Some(8), Some(9), None]);
    }
}
