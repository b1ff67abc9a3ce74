//! Keyframe presets

use std::fmt;
use std::rc::Rc;

use segue_core::{
    detach, filter_moved, undetach, Anchor, Delta, DetachMode, Enter, Exit, ExitDone, Move,
    Moved, PhaseContext,
};

use super::batch::ExitTracker;
use super::{ENTER_ANIMATION_ID, EXIT_ANIMATION_ID};
use crate::backend::{Animate, AnimationHandle};
use crate::keyframe::Keyframes;
use crate::options::AnimationOptions;

// ============================================================================
// Move
// ============================================================================

/// FLIP move animation settings
#[derive(Clone)]
pub struct MoveAnimation {
    keyframes: Rc<dyn Fn(Delta) -> Keyframes>,
    pub options: AnimationOptions,
    pub anchor: Anchor,
}

impl Default for MoveAnimation {
    fn default() -> Self {
        Self {
            keyframes: Rc::new(Keyframes::translate),
            options: AnimationOptions::default(),
            anchor: Anchor::Viewport,
        }
    }
}

impl MoveAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the play keyframes from the inverted offset
    pub fn keyframes(mut self, keyframes: impl Fn(Delta) -> Keyframes + 'static) -> Self {
        self.keyframes = Rc::new(keyframes);
        self
    }

    pub fn options(mut self, options: AnimationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

impl fmt::Debug for MoveAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveAnimation")
            .field("options", &self.options)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

/// Move strategy playing FLIP transforms
#[derive(Clone, Debug)]
pub struct AnimateMove {
    animation: MoveAnimation,
}

/// Animate repositioned elements from their old position to their new one
pub fn animate_move(animation: MoveAnimation) -> AnimateMove {
    AnimateMove { animation }
}

impl<E: Animate> Move<E> for AnimateMove {
    fn moved(&self, elements: &[E], phases: &PhaseContext) {
        let keyframes = Rc::clone(&self.animation.keyframes);
        let options = self.animation.options.clone();
        filter_moved(elements, self.animation.anchor, phases, move |moved| {
            for Moved { element, delta } in moved {
                tracing::trace!(dx = delta.dx, dy = delta.dy, "animate_move: playing");
                element.animate(&keyframes(delta), &options);
            }
        });
    }
}

// ============================================================================
// Enter
// ============================================================================

/// Enter animation settings
#[derive(Clone, Debug, PartialEq)]
pub struct EnterAnimation {
    pub keyframes: Keyframes,
    pub options: AnimationOptions,
    /// Also animate the group's first population
    pub animate_initial: bool,
}

impl Default for EnterAnimation {
    fn default() -> Self {
        Self {
            keyframes: Keyframes::fade(0.0, 1.0),
            options: AnimationOptions::default(),
            animate_initial: false,
        }
    }
}

impl EnterAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyframes(mut self, keyframes: Keyframes) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn options(mut self, options: AnimationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn animate_initial(mut self, animate_initial: bool) -> Self {
        self.animate_initial = animate_initial;
        self
    }
}

/// Enter strategy playing keyframes on the next frame
#[derive(Clone, Debug)]
pub struct AnimateEnter {
    keyframes: Rc<Keyframes>,
    options: AnimationOptions,
    animate_initial: bool,
}

/// Animate elements that appeared
///
/// The animation starts on the frame after the elements were inserted and is
/// tagged [`ENTER_ANIMATION_ID`] unless the options name another id.
pub fn animate_enter(animation: EnterAnimation) -> AnimateEnter {
    AnimateEnter {
        keyframes: Rc::new(animation.keyframes),
        options: animation.options.with_default_id(ENTER_ANIMATION_ID),
        animate_initial: animation.animate_initial,
    }
}

impl AnimateEnter {
    fn start<E: Animate>(&self, elements: &[E], phases: &PhaseContext) {
        let elements = elements.to_vec();
        let keyframes = Rc::clone(&self.keyframes);
        let options = self.options.clone();
        phases.request_frame(move || {
            tracing::trace!("animate_enter: {} element(s)", elements.len());
            for element in &elements {
                element.animate(&keyframes, &options);
            }
        });
    }
}

impl<E: Animate> Enter<E> for AnimateEnter {
    fn enter(&self, elements: &[E], phases: &PhaseContext) {
        self.start(elements, phases);
    }

    fn initial(&self, elements: &[E], phases: &PhaseContext) {
        if self.animate_initial {
            self.start(elements, phases);
        }
    }
}

// ============================================================================
// Exit
// ============================================================================

/// Exit animation settings
#[derive(Clone, Debug, PartialEq)]
pub struct ExitAnimation {
    pub keyframes: Keyframes,
    pub options: AnimationOptions,
}

impl Default for ExitAnimation {
    fn default() -> Self {
        Self {
            keyframes: Keyframes::fade(1.0, 0.0),
            options: AnimationOptions::default(),
        }
    }
}

impl ExitAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyframes(mut self, keyframes: Keyframes) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn options(mut self, options: AnimationOptions) -> Self {
        self.options = options;
        self
    }
}

/// How exiting elements are handled around their animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitBehavior {
    /// Pin the element's box before it animates out
    pub detach: Option<DetachMode>,
    /// Reverse a still-running enter animation instead of starting a new one
    pub reverse_enter: bool,
    /// Complete each element on its own; defaults to `reverse_enter`
    pub separate: Option<bool>,
}

impl ExitBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detach(mut self, mode: DetachMode) -> Self {
        self.detach = Some(mode);
        self
    }

    pub fn reverse_enter(mut self, reverse_enter: bool) -> Self {
        self.reverse_enter = reverse_enter;
        self
    }

    pub fn separate(mut self, separate: bool) -> Self {
        self.separate = Some(separate);
        self
    }

    pub fn is_separate(&self) -> bool {
        self.separate.unwrap_or(self.reverse_enter)
    }
}

/// Exit strategy playing keyframes and completing on finish
pub struct AnimateExit<E: Animate> {
    keyframes: Keyframes,
    options: AnimationOptions,
    behavior: ExitBehavior,
    tracker: Rc<ExitTracker<E, E::Animation>>,
}

/// Animate elements that disappeared, removing them once finished
pub fn animate_exit<E: Animate>(
    animation: ExitAnimation,
    behavior: ExitBehavior,
) -> AnimateExit<E> {
    AnimateExit {
        keyframes: animation.keyframes,
        options: animation.options.with_default_id(EXIT_ANIMATION_ID),
        behavior,
        tracker: Rc::new(ExitTracker::default()),
    }
}

impl<E: Animate> AnimateExit<E> {
    pub fn behavior(&self) -> &ExitBehavior {
        &self.behavior
    }

    /// Number of elements currently animating out
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    fn start(&self, element: &E) -> E::Animation {
        if self.behavior.reverse_enter {
            if let Some(enter) = element.running_animation(ENTER_ANIMATION_ID) {
                enter.reverse();
                return enter;
            }
        }
        element.animate(&self.keyframes, &self.options)
    }
}

impl<E: Animate> Exit<E> for AnimateExit<E> {
    fn exit(&self, elements: &[E], done: ExitDone<E>, _phases: &PhaseContext) {
        if let Some(mode) = self.behavior.detach {
            detach(elements, mode);
        }

        let batch = self
            .tracker
            .begin(elements, done, self.behavior.is_separate());
        for element in elements {
            let animation = self.start(element);
            self.tracker.attach(element, &batch, animation.clone());

            let tracker = Rc::clone(&self.tracker);
            let batch = Rc::clone(&batch);
            let finished = element.clone();
            animation.on_finish(Box::new(move || tracker.finish(&finished, &batch)));
        }
        tracing::trace!("animate_exit: {} element(s) in flight", self.tracker.len());
    }

    fn cancel(&self, elements: &[E]) {
        for element in elements {
            if let Some(animation) = self.tracker.cancel(element) {
                animation.cancel();
            }
        }
        if self.behavior.detach.is_some() {
            undetach(elements);
        }
    }
}

impl<E: Animate> fmt::Debug for AnimateExit<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimateExit")
            .field("options", &self.options)
            .field("behavior", &self.behavior)
            .field("in_flight", &self.tracker.len())
            .finish()
    }
}
