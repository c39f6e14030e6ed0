//! Event type definitions for the logging system

use serde::{Deserialize, Serialize};

use crate::moves::MoveType;
use crate::tuning::FightTuning;

/// Fighter side: `L` is fighter 0, `R` is fighter 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerId {
    L,
    R,
}

impl PlayerId {
    pub fn from_index(idx: usize) -> Self {
        if idx == 0 { PlayerId::L } else { PlayerId::R }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::L => 0,
            PlayerId::R => 1,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::L => write!(f, "L"),
            PlayerId::R => write!(f, "R"),
        }
    }
}

/// All fight events that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Session Events ===
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,  // ISO 8601
    },
    /// Tuning snapshot (logged after session start)
    Config(FightTuning),

    // === Match Events ===
    MatchStart {
        game_type: String,
        left: String,
        right: String,
        arena: u32,
    },
    /// `winner` is `None` for a drawn match
    MatchEnd {
        winner: Option<PlayerId>,
        wins_left: u32,
        wins_right: u32,
        duration: f32,
    },

    // === Round Events ===
    RoundStart {
        round: u32,
        wins_left: u32,
        wins_right: u32,
    },
    /// Fighters unlocked, round timer running
    CountdownFinished { round: u32 },
    RoundEnd {
        round: u32,
        winner: PlayerId,
        wins_left: u32,
        wins_right: u32,
    },
    /// Time ran out with equal life
    RoundDraw { round: u32 },

    // === Fighter Events ===
    MoveChange { player: PlayerId, mv: MoveType },
    /// Landed hit; `damage` is the life the victim actually lost
    Attack {
        attacker: PlayerId,
        attack: MoveType,
        damage: f32,
        victim_life: f32,
    },

    // === Peer Events ===
    PeerConnected { peer_id: String },
    PeerSendFailed { reason: String },
    /// A peer update was applied to the remote fighter or the match
    PeerApplied { player: PlayerId, kind: String },

    /// Sampled fighter state (headless runs)
    Tick {
        frame: u64,
        left_pos: (f32, f32),
        right_pos: (f32, f32),
        left_life: f32,
        right_life: f32,
    },
}

impl GameEvent {
    /// Get the event type code for compact serialization
    pub fn type_code(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SE",
            GameEvent::Config(_) => "CF",
            GameEvent::MatchStart { .. } => "MS",
            GameEvent::MatchEnd { .. } => "ME",
            GameEvent::RoundStart { .. } => "RS",
            GameEvent::CountdownFinished { .. } => "CD",
            GameEvent::RoundEnd { .. } => "RE",
            GameEvent::RoundDraw { .. } => "RD",
            GameEvent::MoveChange { .. } => "MV",
            GameEvent::Attack { .. } => "AT",
            GameEvent::PeerConnected { .. } => "PC",
            GameEvent::PeerSendFailed { .. } => "PF",
            GameEvent::PeerApplied { .. } => "PA",
            GameEvent::Tick { .. } => "T",
        }
    }
}
