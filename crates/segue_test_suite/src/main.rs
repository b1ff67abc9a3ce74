//! Scenario Runner
//!
//! Command-line tool for running the headless transition scenarios.
//!
//! Usage:
//!   segue-scenarios              # Run all scenarios
//!   segue-scenarios --filter foo # Run scenarios matching "foo"
//!   segue-scenarios --list       # List all scenarios

use anyhow::Result;
use segue_test_suite::{runner::TestRunner, scenarios};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--list") {
        println!("Available scenario suites:");
        for suite in scenarios::all_suites() {
            println!("\n  {}:", suite.name);
            for case in &suite.cases {
                println!("    - {}", case.name);
            }
        }
        return Ok(());
    }

    let filter = args
        .iter()
        .position(|a| a == "--filter")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let mut runner = TestRunner::new();
    for suite in scenarios::all_suites() {
        runner.add_suite(suite);
    }

    if let Some(ref pattern) = filter {
        println!("Running scenarios matching: {}\n", pattern);
        runner.filter(pattern);
    }

    let result = runner.run();
    result.print_summary();

    if result.all_passed() {
        println!("\nAll scenarios passed!");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
