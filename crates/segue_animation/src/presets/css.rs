//! Class lifecycle presets
//!
//! Enter: `from` + `active` are added, two frames later `from` is swapped for
//! `to` and the element waits for its end event, after which `active` is
//! dropped. Exit does the same after a single frame and completes on the end
//! event. Move inverts the element with an inline transform and `from`, then
//! on the next frame clears the transform under `active` + `to`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use segue_core::{
    detach, filter_moved, undetach, Anchor, DetachMode, Enter, Exit, ExitDone, Move, Moved,
    PhaseContext, StyleProp,
};
use smallvec::SmallVec;

use super::batch::ExitTracker;
use crate::backend::{ClassList, EndEventType, ListenerId};
use crate::classes::{ClassNames, ClassSet, TransitionKind};

/// End listeners on one element, all removed by the first event
pub(crate) struct EndListener<E: ClassList> {
    element: E,
    ids: Rc<RefCell<SmallVec<[ListenerId; 2]>>>,
}

impl<E: ClassList> EndListener<E> {
    /// Run `callback` on the first of `event`'s end events
    fn once(element: &E, event: EndEventType, callback: impl FnOnce() + 'static) -> Self {
        let ids: Rc<RefCell<SmallVec<[ListenerId; 2]>>> = Rc::default();
        let pending: RefCell<Option<Box<dyn FnOnce()>>> = RefCell::new(Some(Box::new(callback)));

        let handler: Rc<dyn Fn()> = {
            let ids = Rc::clone(&ids);
            let target = element.clone();
            Rc::new(move || {
                let taken = pending.borrow_mut().take();
                let Some(callback) = taken else {
                    return;
                };
                let registered: SmallVec<[ListenerId; 2]> = ids.borrow_mut().drain(..).collect();
                for id in registered {
                    target.remove_end_listener(id);
                }
                callback();
            })
        };

        for end in event.events() {
            let id = element.add_end_listener(*end, Rc::clone(&handler));
            ids.borrow_mut().push(id);
        }

        Self {
            element: element.clone(),
            ids,
        }
    }

    /// Whether the listener fired or was removed
    fn is_spent(&self) -> bool {
        self.ids.borrow().is_empty()
    }

    fn remove(&self) {
        let registered: SmallVec<[ListenerId; 2]> = self.ids.borrow_mut().drain(..).collect();
        for id in registered {
            self.element.remove_end_listener(id);
        }
    }
}

fn add_all<E: ClassList>(elements: &[E], classes: &[String]) {
    if classes.is_empty() {
        return;
    }
    for element in elements {
        element.add_classes(classes);
    }
}

fn remove_all<E: ClassList>(elements: &[E], classes: &[String]) {
    if classes.is_empty() {
        return;
    }
    for element in elements {
        element.remove_classes(classes);
    }
}

// ============================================================================
// Enter
// ============================================================================

/// Enter strategy driven by classes
#[derive(Clone, Debug)]
pub struct CssEnter {
    classes: Rc<ClassSet>,
    event: EndEventType,
    separate: bool,
}

/// Walk entering elements through the `enter` classes of `names`
///
/// The initial population only receives the `to` classes.
pub fn css_enter(names: ClassNames) -> CssEnter {
    CssEnter {
        classes: Rc::new(names.resolve(TransitionKind::Enter)),
        event: EndEventType::default(),
        separate: false,
    }
}

impl CssEnter {
    /// End events that finish the lifecycle
    pub fn event(mut self, event: EndEventType) -> Self {
        self.event = event;
        self
    }

    /// Drop `active` per element instead of once the whole group ended
    pub fn separate(mut self, separate: bool) -> Self {
        self.separate = separate;
        self
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }
}

impl<E: ClassList> Enter<E> for CssEnter {
    fn enter(&self, elements: &[E], phases: &PhaseContext) {
        if elements.is_empty() {
            return;
        }
        add_all(elements, &self.classes.from);
        add_all(elements, &self.classes.active);

        let elements = elements.to_vec();
        let classes = Rc::clone(&self.classes);
        let event = self.event;
        let separate = self.separate;
        let host = Rc::clone(phases.host());
        // Two frames: the first paints `from`, the second starts the transition
        phases.request_frame(move || {
            host.request_frame(Box::new(move || {
                remove_all(&elements, &classes.from);
                add_all(&elements, &classes.to);
                listen_enter_end(elements, classes, event, separate);
            }));
        });
    }

    fn initial(&self, elements: &[E], _phases: &PhaseContext) {
        add_all(elements, &self.classes.to);
    }
}

fn listen_enter_end<E: ClassList>(
    elements: Vec<E>,
    classes: Rc<ClassSet>,
    event: EndEventType,
    separate: bool,
) {
    if separate {
        for element in &elements {
            let target = element.clone();
            let classes = Rc::clone(&classes);
            EndListener::once(element, event, move || target.remove_classes(&classes.active));
        }
        return;
    }

    let remaining = Rc::new(Cell::new(elements.len()));
    let group = Rc::new(elements);
    for element in group.iter() {
        let remaining = Rc::clone(&remaining);
        let group = Rc::clone(&group);
        let classes = Rc::clone(&classes);
        EndListener::once(element, event, move || {
            remaining.set(remaining.get().saturating_sub(1));
            if remaining.get() == 0 {
                remove_all(&group, &classes.active);
            }
        });
    }
}

// ============================================================================
// Exit
// ============================================================================

/// Exit strategy driven by classes
pub struct CssExit<E: ClassList> {
    classes: Rc<ClassSet>,
    event: EndEventType,
    separate: bool,
    detach: Option<DetachMode>,
    tracker: Rc<ExitTracker<E, EndListener<E>>>,
}

/// Walk exiting elements through the `exit` classes of `names`, removing
/// them on their end event
pub fn css_exit<E: ClassList>(names: ClassNames) -> CssExit<E> {
    CssExit {
        classes: Rc::new(names.resolve(TransitionKind::Exit)),
        event: EndEventType::default(),
        separate: false,
        detach: None,
        tracker: Rc::new(ExitTracker::default()),
    }
}

impl<E: ClassList> CssExit<E> {
    pub fn event(mut self, event: EndEventType) -> Self {
        self.event = event;
        self
    }

    /// Remove each element on its own end event
    pub fn separate(mut self, separate: bool) -> Self {
        self.separate = separate;
        self
    }

    /// Pin exiting boxes before the classes are applied
    pub fn detach(mut self, mode: DetachMode) -> Self {
        self.detach = Some(mode);
        self
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }
}

impl<E: ClassList> Exit<E> for CssExit<E> {
    fn exit(&self, elements: &[E], done: ExitDone<E>, phases: &PhaseContext) {
        if let Some(mode) = self.detach {
            detach(elements, mode);
        }
        let batch = self.tracker.begin(elements, done, self.separate);
        add_all(elements, &self.classes.from);
        add_all(elements, &self.classes.active);

        let elements = elements.to_vec();
        let classes = Rc::clone(&self.classes);
        let tracker = Rc::clone(&self.tracker);
        let event = self.event;
        phases.request_frame(move || {
            for element in &elements {
                // Re-entered during the frame
                if !tracker.is_tracked(element, &batch) {
                    continue;
                }
                element.remove_classes(&classes.from);
                element.add_classes(&classes.to);

                // Nothing will ever fire on an element that is not rendered
                if !element.is_connected() {
                    tracker.finish(element, &batch);
                    continue;
                }

                let finished = element.clone();
                let on_end = {
                    let tracker = Rc::clone(&tracker);
                    let batch = Rc::clone(&batch);
                    move || tracker.finish(&finished, &batch)
                };
                let listener = EndListener::once(element, event, on_end);
                tracker.attach(element, &batch, listener);
            }
        });
    }

    fn cancel(&self, elements: &[E]) {
        let classes = self.classes.all();
        for element in elements {
            if let Some(listener) = self.tracker.cancel(element) {
                listener.remove();
            }
            element.remove_classes(&classes);
        }
        if self.detach.is_some() {
            undetach(elements);
        }
    }
}

// ============================================================================
// Move
// ============================================================================

/// Move strategy driven by classes
pub struct CssMove<E: ClassList> {
    classes: Rc<ClassSet>,
    event: EndEventType,
    anchor: Anchor,
    /// End listener of the move each element is playing
    playing: Rc<RefCell<FxHashMap<E, EndListener<E>>>>,
}

/// Play repositioned elements back under the `move` classes of `names`
///
/// The `active` classes are expected to carry a transform transition. A new
/// move on an element still playing restarts it from its current position.
pub fn css_move<E: ClassList>(names: ClassNames) -> CssMove<E> {
    CssMove {
        classes: Rc::new(names.resolve(TransitionKind::Move)),
        event: EndEventType::default(),
        anchor: Anchor::Viewport,
        playing: Rc::default(),
    }
}

impl<E: ClassList> CssMove<E> {
    pub fn event(mut self, event: EndEventType) -> Self {
        self.event = event;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }
}

impl<E: ClassList> fmt::Debug for CssMove<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssMove")
            .field("classes", &self.classes)
            .field("event", &self.event)
            .field("anchor", &self.anchor)
            .field("playing", &self.playing.borrow().len())
            .finish()
    }
}

impl<E: ClassList> Move<E> for CssMove<E> {
    fn moved(&self, elements: &[E], phases: &PhaseContext) {
        let classes = Rc::clone(&self.classes);
        let event = self.event;
        let host = Rc::clone(phases.host());
        let playing = Rc::clone(&self.playing);
        filter_moved(elements, self.anchor, phases, move |moved| {
            let mut inverted = Vec::with_capacity(moved.len());
            for Moved { element, delta } in moved {
                // Drop the running transition before inverting again
                let previous = playing.borrow_mut().remove(&element);
                if let Some(listener) = previous {
                    listener.remove();
                    element.remove_classes(&classes.active);
                    element.remove_classes(&classes.to);
                }
                element.set_style(
                    StyleProp::Transform,
                    &format!("translate({}px, {}px)", delta.dx, delta.dy),
                );
                element.add_classes(&classes.from);
                inverted.push(element);
            }

            host.request_frame(Box::new(move || {
                for element in &inverted {
                    element.remove_style(StyleProp::Transform);
                    element.remove_classes(&classes.from);
                    element.add_classes(&classes.active);
                    element.add_classes(&classes.to);

                    let target = element.clone();
                    let finished = Rc::clone(&classes);
                    let entries = Rc::clone(&playing);
                    let listener = EndListener::once(element, event, move || {
                        target.remove_classes(&finished.active);
                        target.remove_classes(&finished.to);
                        let mut entries = entries.borrow_mut();
                        if entries.get(&target).is_some_and(EndListener::is_spent) {
                            entries.remove(&target);
                        }
                    });
                    let replaced = playing.borrow_mut().insert(element.clone(), listener);
                    if let Some(listener) = replaced {
                        listener.remove();
                    }
                }
            }));
        });
    }
}
