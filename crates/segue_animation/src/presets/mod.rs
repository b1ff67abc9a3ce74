//! Ready-made enter, exit and move strategies
//!
//! - **Keyframe** ([`animate_enter`], [`animate_exit`], [`animate_move`]):
//!   run keyframe animations through the element's [`Animate`](crate::Animate)
//!   backend
//! - **Class** ([`css_enter`], [`css_exit`], [`css_move`]): walk elements
//!   through from / active / to classes and wait for end events
//! - **Timed** ([`persist_for`]): keep exiting elements for a fixed duration
//!
//! Exit presets in batch mode complete a batch once every element in it has
//! finished. In separate mode each element is removed as soon as it finishes.

mod animate;
mod batch;
mod css;
mod persist;

pub use animate::{
    animate_enter, animate_exit, animate_move, AnimateEnter, AnimateExit, AnimateMove,
    EnterAnimation, ExitAnimation, ExitBehavior, MoveAnimation,
};
pub use css::{css_enter, css_exit, css_move, CssEnter, CssExit, CssMove};
pub use persist::{persist_for, PersistFor};

/// Animation id given to enter animations, looked up by reverse-enter exits
pub const ENTER_ANIMATION_ID: &str = "enter";

/// Animation id given to exit animations
pub const EXIT_ANIMATION_ID: &str = "exit";
