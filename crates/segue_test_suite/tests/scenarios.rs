use segue_test_suite::runner::{TestRunner, TestSuite};
use segue_test_suite::scenarios;

fn run(suite: TestSuite) {
    let name = suite.name.clone();
    let mut runner = TestRunner::new();
    runner.add_suite(suite);
    let result = runner.run();

    assert!(result.total() > 0, "suite {} is empty", name);
    assert!(
        result.all_passed(),
        "suite {} failed:\n{}",
        name,
        result.failures().join("\n")
    );
}

#[test]
fn test_reconcile_scenarios() {
    run(scenarios::reconcile::suite());
}

#[test]
fn test_preset_scenarios() {
    run(scenarios::presets::suite());
}

#[test]
fn test_move_scenarios() {
    run(scenarios::moves::suite());
}

#[test]
fn test_config_scenarios() {
    run(scenarios::config::suite());
}
