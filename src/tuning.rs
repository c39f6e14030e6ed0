//! Global gameplay tuning settings (decoupled from UI)

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Path to global gameplay tuning config
pub const GAMEPLAY_TUNING_FILE: &str = "config/gameplay_tuning.json";

fn default_attack_range() -> f32 {
    ATTACK_RANGE
}
fn default_jump_attack_tolerance() -> f32 {
    JUMP_ATTACK_VERTICAL_TOLERANCE
}
fn default_block_damage() -> f32 {
    BLOCK_DAMAGE
}
fn default_ready_ms() -> u32 {
    READY_DURATION_MS
}
fn default_countdown_start() -> u32 {
    COUNTDOWN_START
}
fn default_countdown_step_ms() -> u32 {
    COUNTDOWN_STEP_MS
}
fn default_round_seconds() -> u32 {
    ROUND_SECONDS
}
fn default_position_sync_interval_ms() -> u32 {
    POSITION_SYNC_INTERVAL_MS
}
fn default_position_sync_min_gap_ms() -> u32 {
    POSITION_SYNC_MIN_GAP_MS
}
fn default_life_sync_interval_ms() -> u32 {
    LIFE_SYNC_INTERVAL_MS
}
fn default_life_sync_min_gap_ms() -> u32 {
    LIFE_SYNC_MIN_GAP_MS
}
fn default_round_end_delay_ms() -> u32 {
    ROUND_END_DELAY_MS
}

/// Runtime-adjustable fight rules, stored in `config/gameplay_tuning.json`.
///
/// Every field falls back to its constant when missing from the file, so a
/// partial config only overrides what it names.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FightTuning {
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    #[serde(default = "default_jump_attack_tolerance")]
    pub jump_attack_tolerance: f32,
    #[serde(default = "default_block_damage")]
    pub block_damage: f32,
    #[serde(default = "default_ready_ms")]
    pub ready_ms: u32,
    #[serde(default = "default_countdown_start")]
    pub countdown_start: u32,
    #[serde(default = "default_countdown_step_ms")]
    pub countdown_step_ms: u32,
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    // Peer sync heartbeats
    #[serde(default = "default_position_sync_interval_ms")]
    pub position_sync_interval_ms: u32,
    #[serde(default = "default_position_sync_min_gap_ms")]
    pub position_sync_min_gap_ms: u32,
    #[serde(default = "default_life_sync_interval_ms")]
    pub life_sync_interval_ms: u32,
    #[serde(default = "default_life_sync_min_gap_ms")]
    pub life_sync_min_gap_ms: u32,
    #[serde(default = "default_round_end_delay_ms")]
    pub round_end_delay_ms: u32,
}

impl Default for FightTuning {
    fn default() -> Self {
        Self {
            attack_range: default_attack_range(),
            jump_attack_tolerance: default_jump_attack_tolerance(),
            block_damage: default_block_damage(),
            ready_ms: default_ready_ms(),
            countdown_start: default_countdown_start(),
            countdown_step_ms: default_countdown_step_ms(),
            round_seconds: default_round_seconds(),
            position_sync_interval_ms: default_position_sync_interval_ms(),
            position_sync_min_gap_ms: default_position_sync_min_gap_ms(),
            life_sync_interval_ms: default_life_sync_interval_ms(),
            life_sync_min_gap_ms: default_life_sync_min_gap_ms(),
            round_end_delay_ms: default_round_end_delay_ms(),
        }
    }
}

impl FightTuning {
    /// Names of fields that differ from the built-in defaults (for logging)
    pub fn modified_fields(&self) -> Vec<&'static str> {
        let d = Self::default();
        let mut out = Vec::new();
        if (self.attack_range - d.attack_range).abs() > 0.001 {
            out.push("attack_range");
        }
        if (self.jump_attack_tolerance - d.jump_attack_tolerance).abs() > 0.001 {
            out.push("jump_attack_tolerance");
        }
        if (self.block_damage - d.block_damage).abs() > 0.001 {
            out.push("block_damage");
        }
        if self.ready_ms != d.ready_ms {
            out.push("ready_ms");
        }
        if self.countdown_start != d.countdown_start {
            out.push("countdown_start");
        }
        if self.countdown_step_ms != d.countdown_step_ms {
            out.push("countdown_step_ms");
        }
        if self.round_seconds != d.round_seconds {
            out.push("round_seconds");
        }
        if self.position_sync_interval_ms != d.position_sync_interval_ms
            || self.position_sync_min_gap_ms != d.position_sync_min_gap_ms
        {
            out.push("position_sync");
        }
        if self.life_sync_interval_ms != d.life_sync_interval_ms
            || self.life_sync_min_gap_ms != d.life_sync_min_gap_ms
        {
            out.push("life_sync");
        }
        if self.round_end_delay_ms != d.round_end_delay_ms {
            out.push("round_end_delay_ms");
        }
        out
    }
}

pub fn load_gameplay_tuning_from_file(path: &str) -> Result<FightTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

/// Load the global tuning file into `tuning`, resetting to defaults on failure
pub fn apply_global_tuning(tuning: &mut FightTuning) -> Result<(), String> {
    match load_gameplay_tuning_from_file(GAMEPLAY_TUNING_FILE) {
        Ok(loaded) => {
            *tuning = loaded;
            Ok(())
        }
        Err(err) => {
            *tuning = FightTuning::default();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tuning: FightTuning = serde_json::from_str(r#"{ "attack_range": 180.0 }"#).unwrap();
        assert_eq!(tuning.attack_range, 180.0);
        assert_eq!(tuning.block_damage, BLOCK_DAMAGE);
        assert_eq!(tuning.round_seconds, ROUND_SECONDS);
        assert_eq!(tuning.modified_fields(), vec!["attack_range"]);
    }

    #[test]
    fn test_defaults_are_unmodified() {
        assert!(FightTuning::default().modified_fields().is_empty());
    }
}
