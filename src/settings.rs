//! Persistent settings for game initialization
//!
//! Saves and loads the last used match setup (fighters, arena, game type,
//! realtime identifiers, window size) to/from `config/init_settings.json`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::DEFAULT_VIEWPORT_INDEX;
use crate::session::{GameType, StartOptions};
use crate::tuning::FightTuning;

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/init_settings.json";

/// Persistent settings that survive between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// Viewport preset index into `VIEWPORT_PRESETS`
    pub viewport_index: usize,
    pub left_fighter: String,
    pub right_fighter: String,
    /// Arena background selector
    pub arena: u32,
    pub game_type: GameType,
    /// Default realtime room/player identifiers
    pub room_id: String,
    pub player_id: String,
    pub player_index: usize,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            viewport_index: DEFAULT_VIEWPORT_INDEX,
            left_fighter: "subzero".to_string(),
            right_fighter: "kano".to_string(),
            arena: 0,
            game_type: GameType::Basic,
            room_id: "lobby".to_string(),
            player_id: "p1".to_string(),
            player_index: 0,
        }
    }
}

impl InitSettings {
    /// Load settings from the default file, or defaults if it doesn't exist
    pub fn load() -> Self {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(Path::new(SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Match options for these settings; realtime ids are only passed for networked types
    pub fn start_options(&self, tuning: FightTuning) -> StartOptions {
        let networked = self.game_type.is_networked();
        StartOptions {
            arena: self.arena,
            fighters: vec![self.left_fighter.clone(), self.right_fighter.clone()],
            game_type: self.game_type,
            room_id: networked.then(|| self.room_id.clone()),
            player_id: networked.then(|| self.player_id.clone()),
            player_index: networked.then_some(self.player_index),
            tuning,
        }
    }
}

/// Resource tracking the current init settings (for change detection)
#[derive(Resource)]
pub struct CurrentSettings {
    pub settings: InitSettings,
    pub dirty: bool,
}

impl Default for CurrentSettings {
    fn default() -> Self {
        Self {
            settings: InitSettings::load(),
            dirty: false,
        }
    }
}

impl CurrentSettings {
    pub fn new(settings: InitSettings) -> Self {
        Self {
            settings,
            dirty: false,
        }
    }

    /// Mark settings as changed (will be saved on next update)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn save_if_dirty(&mut self) {
        if self.dirty {
            if let Err(e) = self.settings.save() {
                warn!("Failed to save settings: {}", e);
            }
            self.dirty = false;
        }
    }
}

/// System to save settings when changed
pub fn save_settings_system(mut settings: ResMut<CurrentSettings>) {
    settings.save_if_dirty();
}
