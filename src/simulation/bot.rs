//! Scripted bots that press fight keys for headless matches

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::fighter::Fighter;
use crate::input::{FightKey, PressedKeys};

/// How a bot picks its keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStyle {
    /// Any key combination, held for a random while
    #[default]
    Random,
    /// Closes the distance and attacks in range
    Aggressive,
    /// Keeps away, blocks and crouches when threatened
    Defensive,
}

impl FromStr for BotStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(BotStyle::Random),
            "aggressive" => Ok(BotStyle::Aggressive),
            "defensive" => Ok(BotStyle::Defensive),
            other => Err(format!("unknown bot style '{}'", other)),
        }
    }
}

const ATTACKS: [FightKey; 4] = [
    FightKey::HighPunch,
    FightKey::LowPunch,
    FightKey::HighKick,
    FightKey::LowKick,
];

/// Keys are held between these many milliseconds
const HOLD_MS: (u32, u32) = (80, 600);

/// One side's bot: holds a key set until its timer runs out, then picks again
pub struct Bot {
    style: BotStyle,
    rng: StdRng,
    held: PressedKeys,
    hold_left_ms: u32,
}

impl Bot {
    pub fn new(style: BotStyle, seed: u64) -> Self {
        Self {
            style,
            rng: StdRng::seed_from_u64(seed),
            held: PressedKeys::empty(),
            hold_left_ms: 0,
        }
    }

    pub fn style(&self) -> BotStyle {
        self.style
    }

    /// Advance by `dt_ms`; returns the new key set when it changes
    pub fn update(&mut self, dt_ms: u32, me: &Fighter, opponent: &Fighter, attack_range: f32) -> Option<PressedKeys> {
        self.hold_left_ms = self.hold_left_ms.saturating_sub(dt_ms);
        if self.hold_left_ms > 0 {
            return None;
        }
        self.hold_left_ms = self.rng.gen_range(HOLD_MS.0..=HOLD_MS.1);

        let next = match self.style {
            BotStyle::Random => self.random_keys(),
            BotStyle::Aggressive => self.aggressive_keys(me, opponent, attack_range),
            BotStyle::Defensive => self.defensive_keys(me, opponent, attack_range),
        };
        if next == self.held {
            return None;
        }
        self.held = next;
        Some(next)
    }

    fn random_attack(&mut self) -> FightKey {
        ATTACKS[self.rng.gen_range(0..ATTACKS.len())]
    }

    fn random_keys(&mut self) -> PressedKeys {
        let mut keys = PressedKeys::empty();
        match self.rng.gen_range(0..6) {
            0 => keys.press(FightKey::Left),
            1 => keys.press(FightKey::Right),
            2 => keys.press(FightKey::Down),
            3 if self.rng.gen_bool(0.3) => keys.press(FightKey::Up),
            4 => keys.press(FightKey::Block),
            _ => {}
        }
        if self.rng.gen_bool(0.4) {
            let attack = self.random_attack();
            keys.press(attack);
        }
        keys
    }

    fn aggressive_keys(&mut self, me: &Fighter, opponent: &Fighter, attack_range: f32) -> PressedKeys {
        let toward = toward(me, opponent);
        let distance = (opponent.center_x() - me.center_x()).abs();
        let mut keys = PressedKeys::empty();
        if distance > attack_range {
            keys.press(toward);
            if self.rng.gen_bool(0.1) {
                keys.press(FightKey::Up);
            }
        } else {
            if self.rng.gen_bool(0.25) {
                keys.press(FightKey::Down);
            }
            let attack = self.random_attack();
            keys.press(attack);
        }
        keys
    }

    fn defensive_keys(&mut self, me: &Fighter, opponent: &Fighter, attack_range: f32) -> PressedKeys {
        let away = match toward(me, opponent) {
            FightKey::Right => FightKey::Left,
            _ => FightKey::Right,
        };
        let distance = (opponent.center_x() - me.center_x()).abs();
        let mut keys = PressedKeys::empty();
        if distance <= attack_range {
            match self.rng.gen_range(0..4) {
                0 => keys.press(FightKey::Block),
                1 => keys.press(FightKey::Down),
                2 => {
                    keys.press(FightKey::Down);
                    keys.press(FightKey::LowKick);
                }
                _ => keys.press(away),
            }
        } else if self.rng.gen_bool(0.5) {
            keys.press(away);
        }
        keys
    }
}

/// Direction key that walks `me` toward `opponent`
fn toward(me: &Fighter, opponent: &Fighter) -> FightKey {
    if opponent.center_x() >= me.center_x() {
        FightKey::Right
    } else {
        FightKey::Left
    }
}
