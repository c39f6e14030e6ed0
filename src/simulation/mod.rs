//! Bot simulation - headless fights between scripted bots
//!
//! Runs whole matches without rendering and reports win rates, hits and
//! damage per side.

pub mod bot;
pub mod config;
pub mod metrics;
pub mod parallel;
pub mod runner;

pub use bot::{Bot, BotStyle};
pub use config::{SimCommand, SimConfig, print_help};
pub use metrics::{FighterStats, MatchResult, SimSummary};
pub use runner::{SimReport, run_match, run_simulation};
