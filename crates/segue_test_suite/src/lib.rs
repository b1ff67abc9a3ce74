//! Segue Scenario Suite
//!
//! Headless end-to-end scenarios for transition groups: a mock element
//! backend, a queue-driven host and a small runner that reports per-suite
//! results.
//!
//! # Scenario Categories
//!
//! - **reconcile**: set partitioning, exit ordering, re-entry
//! - **presets**: keyframe, class and timed strategies against the group
//! - **moves**: FLIP displacement of surviving elements
//! - **config**: strategies built from TOML and JSON preset files

pub mod harness;
pub mod runner;
pub mod scenarios;

pub use harness::{init_tracing, MockAnimation, MockNode, PlayState, TestHarness};
pub use runner::{RunResult, TestRunner, TestSuite};
