//! Externally-visible element list
//!
//! What the downstream renderer should show: the current elements plus any
//! exiting elements still animating out, in display order.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a visible-list subscription
    pub struct SubscriptionId;
}

type Subscriber<E> = Rc<dyn Fn(&[E])>;

struct VisibleInner<E> {
    items: RefCell<Rc<[E]>>,
    version: Cell<u64>,
    subscribers: RefCell<SlotMap<SubscriptionId, Subscriber<E>>>,
}

/// Observable, ordered element list
///
/// Cloning yields another handle to the same list.
pub struct VisibleList<E> {
    inner: Rc<VisibleInner<E>>,
}

impl<E> Clone for VisibleList<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for VisibleList<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(VisibleInner {
                items: RefCell::new(Rc::from(Vec::new())),
                version: Cell::new(0),
                subscribers: RefCell::new(SlotMap::with_key()),
            }),
        }
    }
}

impl<E: Clone + PartialEq> VisibleList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current elements
    pub fn get(&self) -> Rc<[E]> {
        Rc::clone(&self.inner.items.borrow())
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.inner.items.borrow().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn contains(&self, element: &E) -> bool {
        self.inner.items.borrow().contains(element)
    }

    /// Incremented on every publish
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Call `subscriber` with the new elements after every publish
    pub fn subscribe(&self, subscriber: impl Fn(&[E]) + 'static) -> SubscriptionId {
        self.inner
            .subscribers
            .borrow_mut()
            .insert(Rc::new(subscriber))
    }

    /// Returns `false` when the subscription was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.borrow_mut().remove(id).is_some()
    }

    /// Replace the elements and notify subscribers
    ///
    /// Subscribers run with no borrow held, so they may read the list or
    /// trigger another publish.
    pub(crate) fn publish(&self, elements: Vec<E>) {
        let snapshot: Rc<[E]> = Rc::from(elements);
        *self.inner.items.borrow_mut() = Rc::clone(&snapshot);
        self.inner.version.set(self.inner.version.get() + 1);

        let subscribers: Vec<Subscriber<E>> =
            self.inner.subscribers.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for VisibleList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibleList")
            .field("items", &self.inner.items.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_bumps_version_and_notifies() {
        let list: VisibleList<u32> = VisibleList::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let id = list.subscribe(move |els: &[u32]| s.borrow_mut().push(els.to_vec()));

        list.publish(vec![1, 2]);
        assert_eq!(list.version(), 1);
        assert_eq!(list.to_vec(), vec![1, 2]);
        assert!(list.contains(&2));

        assert!(list.unsubscribe(id));
        assert!(!list.unsubscribe(id));
        list.publish(vec![3]);

        assert_eq!(*seen.borrow(), vec![vec![1, 2]]);
        assert_eq!(list.version(), 2);
    }

    #[test]
    fn test_subscriber_may_read_and_republish() {
        let list: VisibleList<u32> = VisibleList::new();
        let handle = list.clone();
        list.subscribe(move |els: &[u32]| {
            // Reading inside a notification is fine
            assert_eq!(handle.len(), els.len());
            if els == [1] {
                handle.publish(vec![1, 2]);
            }
        });

        list.publish(vec![1]);
        assert_eq!(list.to_vec(), vec![1, 2]);
        assert_eq!(list.version(), 2);
    }

    #[test]
    fn test_snapshots_are_stable() {
        let list: VisibleList<u32> = VisibleList::new();
        list.publish(vec![1, 2, 3]);
        let before = list.get();
        list.publish(vec![3]);
        assert_eq!(&*before, &[1, 2, 3]);
        assert_eq!(&*list.get(), &[3]);
    }
}
