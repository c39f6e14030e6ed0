//! Scripted input injection for scenarios

use bevy::prelude::*;
use std::collections::HashMap;

use super::parser::{FrameInput, fighter_index, pressed_keys};
use crate::input::PressedKeys;

/// Resource holding scripted inputs for a scenario
#[derive(Resource, Default)]
pub struct ScriptedInputs {
    /// Map of frame -> (fighter index -> held keys from that frame on)
    pub frames: HashMap<u64, Vec<(usize, PressedKeys)>>,
    /// Held keys per fighter (persist until the script changes them)
    pub current_state: [PressedKeys; 2],
    pub current_frame: u64,
    /// Last frame to run
    pub max_frame: u64,
}

impl ScriptedInputs {
    /// Create from parsed frame inputs; unknown fighter ids are reported
    pub fn from_inputs(inputs: &[FrameInput]) -> Result<Self, String> {
        let mut frames: HashMap<u64, Vec<(usize, PressedKeys)>> = HashMap::new();
        let mut max_frame = 0u64;

        for fi in inputs {
            max_frame = max_frame.max(fi.frame);
            let entry = frames.entry(fi.frame).or_default();
            for (id, keys) in &fi.inputs {
                let idx = fighter_index(id)
                    .ok_or_else(|| format!("Unknown fighter '{}' at frame {}", id, fi.frame))?;
                entry.push((idx, pressed_keys(keys)));
            }
            entry.sort_by_key(|(idx, _)| *idx);
        }

        Ok(Self {
            frames,
            current_state: [PressedKeys::empty(); 2],
            current_frame: 0,
            max_frame,
        })
    }

    /// Run at least until `frame` (for state assertions)
    pub fn set_max_frame(&mut self, frame: u64) {
        self.max_frame = self.max_frame.max(frame);
    }

    /// Advance one frame and return the key sets that changed on it
    pub fn advance_frame(&mut self) -> Vec<(usize, PressedKeys)> {
        let mut changes = Vec::new();
        if let Some(frame_inputs) = self.frames.get(&self.current_frame) {
            for &(idx, keys) in frame_inputs {
                if self.current_state[idx] != keys {
                    self.current_state[idx] = keys;
                    changes.push((idx, keys));
                }
            }
        }
        self.current_frame += 1;
        changes
    }

    /// Check if the scenario should keep running
    pub fn should_continue(&self) -> bool {
        self.current_frame <= self.max_frame
    }
}
