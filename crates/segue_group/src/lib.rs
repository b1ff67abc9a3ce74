//! Segue Group
//!
//! The reconciliation engine: a [`TransitionGroup`] diffs successive
//! resolutions of its children, keeps exiting elements visible until their
//! exit strategy completes them, and hands entering, exiting and moving
//! elements to the configured strategies at the right render phase.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use segue_animation::presets::*;
//! use segue_core::{QueueHost, RenderHost};
//! use segue_group::{Child, Initial, TransitionGroup, TransitionOptions};
//!
//! let host = Rc::new(QueueHost::new());
//! let render_host: Rc<dyn RenderHost> = host.clone();
//!
//! let group = TransitionGroup::new(
//!     render_host,
//!     TransitionOptions::new()
//!         .enter(animate_enter(EnterAnimation::new()))
//!         .exit(animate_exit(ExitAnimation::new(), ExitBehavior::new()))
//!         .move_(animate_move(MoveAnimation::new()))
//!         .initial(Initial::Skip),
//! );
//!
//! group.visible().subscribe(|elements| render(elements));
//! group.reconcile(&[Child::element(a.clone()), Child::element(b.clone())]);
//! host.flush();
//! ```

pub mod child;
pub mod group;
pub mod options;
pub mod visible;

pub use child::{resolve_elements, Child, FxIndexSet, Resolved};
pub use group::{PassSummary, TransitionGroup};
pub use options::{Initial, TransitionOptions};
pub use visible::{SubscriptionId, VisibleList};
