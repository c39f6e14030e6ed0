//! Scenario testing system for deterministic fight testing
//!
//! Scripted key presses are played against a headless session and checked
//! against expected event sequences and fighter/match state.

pub mod assertions;
pub mod input;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedEvent, check_absent, check_sequence, check_state};
pub use input::ScriptedInputs;
pub use parser::{ExpectedEvent, FighterDef, FrameInput, StateAssertion, TestDefinition, TestExpectations, TestSetup, parse_test_file};
pub use runner::{TestResult, run_test};

/// Default path for scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";

use std::fs;
use std::path::{Path, PathBuf};

/// All `.toml` scenarios under `base`, sorted; `filter` matches the relative path
pub fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    discover_recursive(base, base, filter, &mut found);
    found.sort();
    found
}

fn discover_recursive(base: &Path, current: &Path, filter: Option<&str>, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(current) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            discover_recursive(base, &path, filter, found);
        } else if path.extension().is_some_and(|e| e == "toml") {
            let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy();
            if filter.is_none_or(|f| rel.contains(f)) {
                found.push(path);
            }
        }
    }
}
