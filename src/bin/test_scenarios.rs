//! Fight scenario runner
//!
//! Usage:
//!   cargo run --bin test-scenarios                    # every scenario
//!   cargo run --bin test-scenarios -- combat/         # one folder
//!   cargo run --bin test-scenarios -- rounds/time_up  # one file
//!   cargo run --bin test-scenarios -- -v              # full failure details

use std::path::Path;

use fightgame::testing::{SCENARIOS_DIR, TestResult, discover_scenarios, parse_test_file, run_test};

const NAME_COLUMN: usize = 40;

#[derive(Default)]
struct Tally {
    passed: usize,
    failed: usize,
    errors: usize,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let filter = args.iter().find(|a| !a.starts_with('-'));

    let root = Path::new(SCENARIOS_DIR);
    let scenarios = if root.is_dir() {
        discover_scenarios(root, filter.map(String::as_str))
    } else {
        Vec::new()
    };
    if scenarios.is_empty() {
        eprintln!(
            "No scenarios under {}{}",
            SCENARIOS_DIR,
            filter.map(|f| format!(" matching '{}'", f)).unwrap_or_default()
        );
        std::process::exit(1);
    }

    println!("Running {} scenario(s)\n", scenarios.len());
    let mut tally = Tally::default();
    let mut last_folder = None;

    for path in &scenarios {
        let rel = path.strip_prefix(root).unwrap_or(path);
        let folder = rel.parent().filter(|p| !p.as_os_str().is_empty());
        if folder != last_folder {
            if let Some(folder) = folder {
                println!("[{}]", folder.display());
            }
            last_folder = folder;
        }

        let label = rel.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        let result = parse_test_file(path)
            .map(|def| run_test(&def))
            .unwrap_or_else(|message| TestResult::Error { message });

        let pad = " ".repeat(NAME_COLUMN.saturating_sub(label.len()));
        match &result {
            TestResult::Pass { frames } => {
                tally.passed += 1;
                println!("  {}{} ok ({} frames)", label, pad, frames);
            }
            TestResult::Fail { error } => {
                tally.failed += 1;
                println!("  {}{} FAILED", label, pad);
                if verbose {
                    println!("      {}", error);
                } else {
                    println!("      {}", error.message);
                }
            }
            TestResult::Error { message } => {
                tally.errors += 1;
                println!("  {}{} ERROR", label, pad);
                println!("      {}", message);
            }
        }
    }

    println!(
        "\n{} passed, {} failed, {} errors",
        tally.passed, tally.failed, tally.errors
    );
    if tally.failed + tally.errors > 0 {
        std::process::exit(1);
    }
}
