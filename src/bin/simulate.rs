//! Bot Simulation Tool - headless bot-vs-bot fights
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --matches 100 --left-bot aggressive --right-bot defensive
//!   cargo run --bin simulate -- --matches 500 --parallel 8 --output sims.json

use fightgame::simulation::{SimCommand, SimConfig, print_help, run_simulation};

fn main() {
    let config = match SimConfig::from_args() {
        Ok(SimCommand::Run(config)) => config,
        Ok(SimCommand::Help) => {
            print_help();
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if let Err(e) = run_simulation(config) {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}
