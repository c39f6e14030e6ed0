//! Simulation configuration

use serde::{Deserialize, Serialize};

use super::bot::BotStyle;

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of matches to run
    pub matches: u32,
    /// Fighter names, left then right
    pub fighters: [String; 2],
    /// Bot driving each side
    pub bots: [BotStyle; 2],
    /// Arena background selector
    pub arena: u32,
    /// Engine milliseconds per simulated frame
    pub frame_ms: u32,
    /// Hard cap on match length in seconds (covers countdowns and round gaps)
    pub max_match_seconds: f32,
    /// Tick samples are logged this often (0 = never)
    pub tick_sample_ms: u32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Output file path (None = stdout)
    pub output_file: Option<String>,
    /// Suppress progress output
    pub quiet: bool,
    /// Number of parallel threads (0 = sequential)
    pub parallel: usize,
    /// Path to SQLite database for storing match events
    pub db_path: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            matches: 1,
            fighters: ["subzero".to_string(), "kano".to_string()],
            bots: [BotStyle::Random, BotStyle::Random],
            arena: 0,
            frame_ms: 16,
            max_match_seconds: 300.0,
            tick_sample_ms: 100,
            seed: None,
            output_file: None,
            quiet: false,
            parallel: 0,
            db_path: None,
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

/// What the command line asked for
#[derive(Debug)]
pub enum SimCommand {
    Run(SimConfig),
    Help,
}

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Local settings, then the template, then built-in defaults
    pub fn from_config_files() -> Self {
        Self::from_file(SIM_SETTINGS_FILE)
            .or_else(|_| Self::from_file(SIM_SETTINGS_TEMPLATE))
            .unwrap_or_default()
    }

    /// Apply command line arguments (program name excluded) on top of `self`
    pub fn parse_args(mut self, args: &[String]) -> Result<SimCommand, String> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("{} needs a value", arg))
            };
            match arg.as_str() {
                "--settings" => self = Self::from_file(&value()?)?,
                "--matches" => self.matches = parse_number(arg, &value()?)?,
                "--left" => self.fighters[0] = value()?,
                "--right" => self.fighters[1] = value()?,
                "--left-bot" => self.bots[0] = value()?.parse()?,
                "--right-bot" => self.bots[1] = value()?.parse()?,
                "--arena" => self.arena = parse_number(arg, &value()?)?,
                "--frame-ms" => self.frame_ms = parse_number(arg, &value()?)?,
                "--max-seconds" => self.max_match_seconds = parse_number(arg, &value()?)?,
                "--tick-ms" => self.tick_sample_ms = parse_number(arg, &value()?)?,
                "--seed" => self.seed = Some(parse_number(arg, &value()?)?),
                "--output" => self.output_file = Some(value()?),
                "--parallel" => self.parallel = parse_number(arg, &value()?)?,
                "--db" => self.db_path = Some(value()?),
                "--quiet" | "-q" => self.quiet = true,
                "--help" | "-h" => return Ok(SimCommand::Help),
                other => return Err(format!("Unknown argument '{}'", other)),
            }
        }
        if self.frame_ms == 0 {
            return Err("--frame-ms must be positive".to_string());
        }
        Ok(SimCommand::Run(self))
    }

    /// Parse the process arguments over the config files
    pub fn from_args() -> Result<SimCommand, String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_config_files().parse_args(&args)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, raw))
}

pub fn print_help() {
    println!(
        r#"Bot Simulation Tool - headless bot-vs-bot fights

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>     Load settings from JSON file (later flags override it)
    --matches <N>         Number of matches (default: 1)
    --left <NAME>         Left fighter (default: subzero)
    --right <NAME>        Right fighter (default: kano)
    --left-bot <STYLE>    random | aggressive | defensive (default: random)
    --right-bot <STYLE>   random | aggressive | defensive (default: random)
    --arena <N>           Arena background selector (default: 0)
    --frame-ms <MS>       Engine milliseconds per frame (default: 16)
    --max-seconds <SECS>  Give up on a match after this long (default: 300)
    --tick-ms <MS>        Log a position/life sample this often, 0 = off (default: 100)
    --seed <N>            RNG seed for reproducibility
    --output <FILE>       Write the JSON report to a file (default: stdout)
    --parallel <N>        Run matches on N threads
    --db <FILE>           Store every match's events in SQLite
    --quiet, -q           Suppress progress output
    --help, -h            Show this help

EXAMPLES:
    cargo run --bin simulate -- --matches 200 --left-bot aggressive --parallel 8
    cargo run --bin simulate -- --seed 42 --db sims.db
"#
    );
}
