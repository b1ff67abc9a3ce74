//! Test runner for executing scenario suites
//!
//! Manages scenario execution, result collection, and reporting.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use anyhow::Result;

type ScenarioFn = Box<dyn FnOnce() -> Result<()>>;

/// A single scenario
pub struct TestCase {
    pub name: String,
    pub category: String,
    pub test_fn: ScenarioFn,
}

impl TestCase {
    pub fn new<F>(name: &str, category: &str, test_fn: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            test_fn: Box::new(test_fn),
        }
    }
}

/// Outcome of one scenario
#[derive(Debug)]
pub enum TestResult {
    Passed,
    Failed(String),
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed)
    }
}

/// Result of running a scenario
pub struct TestRun {
    pub name: String,
    pub category: String,
    pub result: TestResult,
    pub duration: Duration,
}

impl TestRun {
    pub fn is_passed(&self) -> bool {
        self.result.is_passed()
    }
}

/// Named group of scenarios
pub struct TestSuite {
    pub name: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, name: &str, test_fn: F) -> &mut Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.cases.push(TestCase::new(name, &self.name, test_fn));
        self
    }
}

/// Runs suites, optionally filtered by name
#[derive(Default)]
pub struct TestRunner {
    suites: Vec<TestSuite>,
    filter: Option<String>,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.suites.push(suite);
        self
    }

    /// Only run scenarios whose name or category contains `pattern`
    pub fn filter(&mut self, pattern: &str) -> &mut Self {
        self.filter = Some(pattern.to_string());
        self
    }

    /// Run every selected scenario
    ///
    /// A panicking scenario is recorded as failed and the run continues.
    pub fn run(&mut self) -> RunResult {
        let start = Instant::now();
        let mut results = Vec::new();

        for suite in self.suites.drain(..) {
            tracing::info!("Running suite: {}", suite.name);

            for case in suite.cases {
                if let Some(ref pattern) = self.filter {
                    if !case.name.contains(pattern) && !case.category.contains(pattern) {
                        continue;
                    }
                }

                let test_start = Instant::now();
                tracing::debug!("Running scenario: {}::{}", case.category, case.name);

                let result = match panic::catch_unwind(AssertUnwindSafe(case.test_fn)) {
                    Ok(Ok(())) => TestResult::Passed,
                    Ok(Err(e)) => TestResult::Failed(format!("{:#}", e)),
                    Err(payload) => TestResult::Failed(panic_message(payload.as_ref())),
                };

                let duration = test_start.elapsed();
                match &result {
                    TestResult::Passed => tracing::info!("  ✓ {} ({:?})", case.name, duration),
                    TestResult::Failed(reason) => {
                        tracing::error!("  ✗ {} ({:?}): {}", case.name, duration, reason)
                    }
                }

                results.push(TestRun {
                    name: case.name,
                    category: case.category,
                    result,
                    duration,
                });
            }
        }

        RunResult::new(results, start.elapsed())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

/// Results from running scenarios
pub struct RunResult {
    pub results: Vec<TestRun>,
    pub duration: Duration,
}

impl RunResult {
    pub fn new(results: Vec<TestRun>, duration: Duration) -> Self {
        Self { results, duration }
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_passed()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.is_passed())
    }

    /// Failed runs as `category::name: reason`
    pub fn failures(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|run| match &run.result {
                TestResult::Passed => None,
                TestResult::Failed(reason) => {
                    Some(format!("{}::{}: {}", run.category, run.name, reason))
                }
            })
            .collect()
    }

    pub fn by_category(&self) -> HashMap<String, Vec<&TestRun>> {
        let mut map: HashMap<String, Vec<&TestRun>> = HashMap::new();
        for result in &self.results {
            map.entry(result.category.clone()).or_default().push(result);
        }
        map
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════╗");
        println!("║         SCENARIO RESULTS SUMMARY         ║");
        println!("╠══════════════════════════════════════════╣");
        println!("║  Passed:  {:>5}                          ║", self.passed());
        println!("║  Failed:  {:>5}                          ║", self.failed());
        println!("║  Total:   {:>5}                          ║", self.total());
        println!("║  Time:    {:>8.2?}                      ║", self.duration);
        println!("╚══════════════════════════════════════════╝");

        let mut categories: Vec<_> = self.by_category().into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));
        for (category, runs) in categories {
            let passed = runs.iter().filter(|r| r.is_passed()).count();
            println!("  {:<12} {}/{}", category, passed, runs.len());
        }

        let failures = self.failures();
        if !failures.is_empty() {
            println!("\nFailed scenarios:");
            for failure in failures {
                println!("  ✗ {}", failure);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_records_errors_and_panics() {
        let mut suite = TestSuite::new("sample");
        suite
            .add("ok", || Ok(()))
            .add("err", || anyhow::bail!("nope"))
            .add("boom", || panic!("kaboom"));

        let mut runner = TestRunner::new();
        runner.add_suite(suite);
        let result = runner.run();

        assert_eq!(result.total(), 3);
        assert_eq!(result.passed(), 1);
        let failures = result.failures();
        assert_eq!(failures[0], "sample::err: nope");
        assert!(failures[1].contains("kaboom"));
    }

    #[test]
    fn test_filter_matches_name_or_category() {
        let mut suite = TestSuite::new("moves");
        suite.add("swap", || Ok(())).add("scroll", || Ok(()));

        let mut runner = TestRunner::new();
        runner.add_suite(suite).filter("swap");
        assert_eq!(runner.run().total(), 1);
    }
}
