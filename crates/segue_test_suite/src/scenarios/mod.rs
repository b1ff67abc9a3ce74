//! Scenario suites
//!
//! Each module exposes a `suite()` building its [`TestSuite`].

pub mod config;
pub mod moves;
pub mod presets;
pub mod reconcile;

use crate::runner::TestSuite;

/// Every scenario suite, in reporting order
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        reconcile::suite(),
        presets::suite(),
        moves::suite(),
        config::suite(),
    ]
}
