//! Runs every scenario under tests/scenarios as part of `cargo test`

use std::path::Path;

use fightgame::testing::{SCENARIOS_DIR, TestResult, discover_scenarios, parse_test_file, run_test};

#[test]
fn all_scenarios_pass() {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join(SCENARIOS_DIR);
    let scenarios = discover_scenarios(&base, None);
    assert!(!scenarios.is_empty(), "no scenarios under {}", base.display());

    let mut failures = Vec::new();
    for path in &scenarios {
        let result = match parse_test_file(path) {
            Ok(def) => run_test(&def),
            Err(message) => TestResult::Error { message },
        };
        match result {
            TestResult::Pass { .. } => {}
            TestResult::Fail { error } => failures.push(format!("{}: {}", path.display(), error)),
            TestResult::Error { message } => failures.push(format!("{}: {}", path.display(), message)),
        }
    }
    assert!(failures.is_empty(), "{} scenario(s) failed:\n{}", failures.len(), failures.join("\n"));
}
