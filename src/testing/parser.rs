//! TOML scenario file parsing

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::input::{FightKey, PressedKeys};
use crate::moves::MoveType;
use crate::session::GameType;
use crate::tuning::FightTuning;

/// Complete scenario definition from a TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// Match configuration for a scenario
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TestSetup {
    /// Both fighters are driven from the script in multiplayer
    pub game_type: GameType,
    pub fighters: Vec<String>,
    pub arena: u32,
    /// Engine milliseconds per frame
    pub frame_ms: u32,
    /// Run the opening countdown before frame 0
    pub skip_countdown: bool,
    /// Tuning overrides; unnamed fields keep their defaults
    pub tuning: FightTuning,
    /// Per-fighter placement applied once the countdown is over
    #[serde(rename = "fighter")]
    pub fighter_overrides: Vec<FighterDef>,
}

impl Default for TestSetup {
    fn default() -> Self {
        Self {
            game_type: GameType::Multiplayer,
            fighters: vec!["subzero".to_string(), "kano".to_string()],
            arena: 0,
            frame_ms: 10,
            skip_countdown: true,
            tuning: FightTuning::default(),
            fighter_overrides: Vec::new(),
        }
    }
}

/// Starting state for one fighter
#[derive(Debug, Clone, Deserialize)]
pub struct FighterDef {
    /// "p1" or "p2"
    pub id: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub life: Option<f32>,
    #[serde(rename = "move")]
    pub posture: Option<MoveType>,
}

/// Held keys from a frame on, per fighter ("p1"/"p2")
#[derive(Debug, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    #[serde(flatten)]
    pub inputs: HashMap<String, Vec<FightKey>>,
}

/// Key list to a held-key set
pub fn pressed_keys(keys: &[FightKey]) -> PressedKeys {
    keys.iter().fold(PressedKeys::empty(), |set, &k| set.with(k))
}

/// Fighter slot for a scenario id
pub fn fighter_index(id: &str) -> Option<usize> {
    match id {
        "p1" | "left" => Some(0),
        "p2" | "right" => Some(1),
        _ => None,
    }
}

/// Expected scenario outcomes
#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// State assertions at different frames (`[[expect.state]]`)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
    /// Event names that must not occur at all
    #[serde(default)]
    pub absent: Vec<String>,
}

/// Expected event in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    pub event: String,
    pub player: Option<String>,
    /// Move or attack tag carried by the event
    pub detail: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

/// State assertion after a frame
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a scenario file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
