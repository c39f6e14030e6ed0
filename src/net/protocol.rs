//! Peer wire format: JSON objects tagged by `type`, scoped to a room

use serde::{Deserialize, Serialize};

use super::NetError;
use crate::scoring::{GameState, MatchState};

/// Milliseconds since the Unix epoch, stamped on every outgoing message
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One broadcast event. Player numbers on the wire are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerMessage {
    #[serde(rename_all = "camelCase")]
    Move {
        player_id: String,
        #[serde(rename = "move")]
        mv: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Position {
        player_id: String,
        x: f32,
        y: f32,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Life {
        player_id: String,
        life: f32,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    GameState {
        player_id: String,
        game_state: GameState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round_winner: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_winner: Option<u32>,
        player1_wins: u32,
        player2_wins: u32,
        current_round: u32,
        timestamp: i64,
    },
}

impl PeerMessage {
    pub fn player_id(&self) -> &str {
        match self {
            PeerMessage::Move { player_id, .. }
            | PeerMessage::Position { player_id, .. }
            | PeerMessage::Life { player_id, .. }
            | PeerMessage::GameState { player_id, .. } => player_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PeerMessage::Move { .. } => "move",
            PeerMessage::Position { .. } => "position",
            PeerMessage::Life { .. } => "life",
            PeerMessage::GameState { .. } => "gameState",
        }
    }

    pub fn game_state(player_id: &str, state: &MatchState, timestamp: i64) -> Self {
        PeerMessage::GameState {
            player_id: player_id.to_string(),
            game_state: state.game_state,
            round_winner: state.round_winner.map(|i| i as u32 + 1),
            final_winner: state.final_winner.map(|i| i as u32 + 1),
            player1_wins: state.wins[0],
            player2_wins: state.wins[1],
            current_round: state.current_round,
            timestamp,
        }
    }

    /// Match aggregate carried by a `gameState` message. Out-of-range player numbers are dropped.
    pub fn to_match_state(&self) -> Option<MatchState> {
        let PeerMessage::GameState {
            game_state,
            round_winner,
            final_winner,
            player1_wins,
            player2_wins,
            current_round,
            ..
        } = self
        else {
            return None;
        };
        let to_index = |n: &Option<u32>| n.filter(|n| (1..=2).contains(n)).map(|n| n as usize - 1);
        Some(MatchState {
            current_round: *current_round,
            wins: [*player1_wins, *player2_wins],
            game_state: *game_state,
            round_winner: to_index(round_winner),
            final_winner: to_index(final_winner),
        })
    }
}

/// A message plus the room it was published to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerEnvelope {
    pub room_id: String,
    #[serde(flatten)]
    pub message: PeerMessage,
}

pub fn encode(room_id: &str, message: &PeerMessage) -> Result<Vec<u8>, NetError> {
    let envelope = PeerEnvelope {
        room_id: room_id.to_string(),
        message: message.clone(),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

pub fn decode(payload: &[u8]) -> Result<PeerEnvelope, NetError> {
    Ok(serde_json::from_slice(payload)?)
}
