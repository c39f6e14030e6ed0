//! Config file auto-reload system
//!
//! Polls the gameplay tuning file every 10 seconds and reloads it when modified.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::session::GameSlot;
use crate::tuning::{FightTuning, GAMEPLAY_TUNING_FILE, load_gameplay_tuning_from_file};

/// How often to check for config changes (seconds)
const CHECK_INTERVAL: f32 = 10.0;

/// Tracks modification times of config files for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    pub path: String,
    pub tuning_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::watching(GAMEPLAY_TUNING_FILE)
    }
}

impl ConfigWatcher {
    pub fn watching(path: &str) -> Self {
        Self {
            timer: 0.0,
            path: path.to_string(),
            tuning_mtime: get_mtime(path),
        }
    }

    /// Advance the poll timer; on each interval, return the reloaded tuning if the file changed
    pub fn poll(&mut self, delta_secs: f32) -> Option<FightTuning> {
        self.timer += delta_secs;
        if self.timer < CHECK_INTERVAL {
            return None;
        }
        self.timer = 0.0;

        let mtime = get_mtime(&self.path);
        if mtime == self.tuning_mtime {
            return None;
        }
        self.tuning_mtime = mtime;

        match load_gameplay_tuning_from_file(&self.path) {
            Ok(tuning) => Some(tuning),
            Err(e) => {
                warn!("{} changed but could not be loaded: {}", self.path, e);
                None
            }
        }
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &str) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Reload tuning when the file changes and hand it to the running session
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut tuning: ResMut<FightTuning>,
    mut slot: ResMut<GameSlot>,
) {
    let Some(loaded) = watcher.poll(time.delta_secs()) else {
        return;
    };
    *tuning = loaded;
    let modified = loaded.modified_fields();
    info!("Auto-reloaded {} (modified: {:?})", watcher.path, modified);
    if let Some(session) = slot.get_game_mut() {
        session.controller_mut().set_tuning(loaded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_only_after_interval_and_change() {
        let dir = std::env::temp_dir().join(format!("fightgame-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gameplay_tuning.json");
        let path_str = path.to_string_lossy().to_string();

        let mut watcher = ConfigWatcher::watching(&path_str);
        assert_eq!(watcher.tuning_mtime, None);

        fs::write(&path, r#"{"attack_range": 150.0}"#).unwrap();
        assert_eq!(watcher.poll(5.0), None);
        let reloaded = watcher.poll(5.0).unwrap();
        assert_eq!(reloaded.attack_range, 150.0);
        assert_eq!(reloaded.round_seconds, FightTuning::default().round_seconds);

        // Unchanged file: nothing on the next interval
        assert_eq!(watcher.poll(10.0), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
