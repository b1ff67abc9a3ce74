//! Segue Animation
//!
//! Swappable strategy presets for `segue_group` transition groups.
//!
//! # Features
//!
//! - **Keyframe presets**: FLIP transform moves, opacity fades, reverse-enter exits
//! - **Class presets**: from / active / to class lifecycles with end-event detection
//! - **Timed exits**: keep exiting elements around for a fixed duration
//! - **Easing**: CSS timing functions, parseable and sampleable
//! - **Declarative config**: build strategies from TOML or JSON
//!
//! The presets drive animations through two backend traits hosts implement on
//! their element handles: [`Animate`] (property animation) and [`ClassList`]
//! (class toggling and end events).
//!
//! All keyframe presets default to 300ms, `ease`, fill `backwards`.
//!
//! # Example
//!
//! ```ignore
//! use segue_animation::presets::*;
//! use segue_core::DetachMode;
//!
//! let options = TransitionOptions::new()
//!     .enter(animate_enter(EnterAnimation::new()))
//!     .exit(animate_exit(
//!         ExitAnimation::new(),
//!         ExitBehavior::new().detach(DetachMode::Absolute),
//!     ))
//!     .move_(animate_move(MoveAnimation::new()));
//! ```

pub mod backend;
pub mod classes;
pub mod config;
pub mod easing;
pub mod error;
pub mod keyframe;
pub mod options;
pub mod presets;

pub use backend::{Animate, AnimationHandle, ClassList, EndEvent, EndEventType, ListenerId};
pub use classes::{ClassNames, ClassSet, TransitionKind};
pub use config::{AnchorSetting, DetachSetting, EnterPreset, ExitPreset, MovePreset, PresetConfig};
pub use easing::{Easing, StepPosition};
pub use error::{AnimationError, Result};
pub use keyframe::{Composite, Keyframe, Keyframes};
pub use options::{AnimationOptions, FillMode, DEFAULT_DURATION};
