//! Animation backends implemented by host elements
//!
//! Presets never touch a rendering API directly. A host implements
//! [`Animate`] to run keyframe animations (a browser host would forward to
//! `Element.animate`, a GPU host to its own animation scheduler) and
//! [`ClassList`] to toggle classes and report transition/animation end events.

use std::rc::Rc;

use segue_core::Element;
use serde::Deserialize;
use slotmap::new_key_type;

use crate::keyframe::Keyframes;
use crate::options::AnimationOptions;

/// A running keyframe animation
pub trait AnimationHandle: Clone + 'static {
    /// Run `callback` when the animation finishes
    ///
    /// Cancelled animations never finish. Registering on an animation that has
    /// already finished runs the callback on the host's next opportunity.
    fn on_finish(&self, callback: Box<dyn FnOnce()>);

    /// Play the animation backwards from its current point
    fn reverse(&self);

    /// Stop the animation and drop its effect
    fn cancel(&self);
}

/// Keyframe animation support
pub trait Animate: Element {
    type Animation: AnimationHandle;

    /// Start a keyframe animation on this element
    fn animate(&self, keyframes: &Keyframes, options: &AnimationOptions) -> Self::Animation;

    /// A still-running animation started with `options.id == id`
    fn running_animation(&self, id: &str) -> Option<Self::Animation>;
}

new_key_type! {
    /// Handle to a registered end-event listener
    pub struct ListenerId;
}

/// End events a class lifecycle can wait for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndEvent {
    TransitionEnd,
    AnimationEnd,
}

impl EndEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndEvent::TransitionEnd => "transitionend",
            EndEvent::AnimationEnd => "animationend",
        }
    }
}

/// Which end events complete a class lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndEventType {
    Transition,
    Animation,
    /// Whichever fires first
    #[default]
    Both,
}

impl EndEventType {
    pub fn events(&self) -> &'static [EndEvent] {
        match self {
            EndEventType::Transition => &[EndEvent::TransitionEnd],
            EndEventType::Animation => &[EndEvent::AnimationEnd],
            EndEventType::Both => &[EndEvent::TransitionEnd, EndEvent::AnimationEnd],
        }
    }
}

/// Class toggling plus end-event listening
pub trait ClassList: Element {
    fn add_classes(&self, classes: &[String]);

    fn remove_classes(&self, classes: &[String]);

    fn has_class(&self, class: &str) -> bool;

    /// Listen for `event` fired on this element itself
    ///
    /// Events bubbling up from descendants must not invoke `callback`.
    fn add_end_listener(&self, event: EndEvent, callback: Rc<dyn Fn()>) -> ListenerId;

    fn remove_end_listener(&self, id: ListenerId);
}
