//! Segue Core
//!
//! Foundational primitives shared by the Segue transition crates:
//!
//! - **Element capabilities**: the [`Element`] trait hosts implement for their node handles
//! - **Geometry sampling**: FLIP-style before/after position sampling and exit detaching
//! - **Render phases**: a two-phase (update, commit) deferred callback scheduler
//! - **Host abstraction**: [`RenderHost`] hooks plus a queue-driven host for headless loops
//! - **Strategies**: the [`Enter`], [`Exit`] and [`Move`] capability traits
//!
//! Segue renders nothing by itself. The reconciliation engine in `segue_group`
//! decides *when* elements enter, exit or move; strategies decide *how*.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use segue_core::{schedule, QueueHost, RenderHost};
//!
//! let host = Rc::new(QueueHost::new());
//! let render_host: Rc<dyn RenderHost> = host.clone();
//!
//! schedule(
//!     &render_host,
//!     |phases| phases.on_commit(|| println!("layout settled")),
//!     |_phases| println!("host applied the update"),
//! );
//!
//! host.flush();
//! ```

pub mod element;
pub mod geometry;
pub mod host;
pub mod phase;
pub mod strategy;

pub use element::{Element, StyleProp};
pub use geometry::{
    detach, filter_moved, undetach, Anchor, Delta, DetachMode, GeometrySnapshot, Moved, Point,
    Rect,
};
pub use host::QueueHost;
pub use phase::{schedule, PhaseContext, PhaseScheduler, RenderHost, Task};
pub use strategy::{Enter, Exit, ExitDone, Move, Removal};
