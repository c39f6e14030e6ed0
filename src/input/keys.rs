//! Logical fight keys and the held-key set

use serde::{Deserialize, Serialize};

/// A logical button, independent of the device that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightKey {
    Left,
    Right,
    Up,
    Down,
    Block,
    HighPunch,
    LowPunch,
    HighKick,
    LowKick,
}

impl FightKey {
    pub const ALL: [FightKey; 9] = [
        FightKey::Left,
        FightKey::Right,
        FightKey::Up,
        FightKey::Down,
        FightKey::Block,
        FightKey::HighPunch,
        FightKey::LowPunch,
        FightKey::HighKick,
        FightKey::LowKick,
    ];

    /// Direction keys are the ones the joystick owns
    pub const DIRECTIONS: [FightKey; 4] = [
        FightKey::Up,
        FightKey::Down,
        FightKey::Left,
        FightKey::Right,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of currently held keys for one fighter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PressedKeys(u16);

impl PressedKeys {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builder form, handy in tests and scenario files
    pub fn with(mut self, key: FightKey) -> Self {
        self.press(key);
        self
    }

    pub fn press(&mut self, key: FightKey) {
        self.0 |= key.bit();
    }

    pub fn release(&mut self, key: FightKey) {
        self.0 &= !key.bit();
    }

    pub fn set(&mut self, key: FightKey, held: bool) {
        if held {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn is_pressed(&self, key: FightKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of two key sets (keyboard + touch + gamepad)
    pub fn merge(self, other: PressedKeys) -> Self {
        Self(self.0 | other.0)
    }

    /// Only the keys that describe a sustained stance: walking, crouching, blocking
    pub fn postures(self) -> Self {
        [FightKey::Left, FightKey::Right, FightKey::Down, FightKey::Block]
            .into_iter()
            .filter(|k| self.is_pressed(*k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = FightKey> + '_ {
        FightKey::ALL.into_iter().filter(|k| self.is_pressed(*k))
    }
}

impl FromIterator<FightKey> for PressedKeys {
    fn from_iter<I: IntoIterator<Item = FightKey>>(iter: I) -> Self {
        let mut keys = PressedKeys::empty();
        for key in iter {
            keys.press(key);
        }
        keys
    }
}
