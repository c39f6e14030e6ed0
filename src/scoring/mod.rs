//! Scoring module - best-of-three round and match aggregate

use bevy::log::info;
use serde::{Deserialize, Serialize};

use crate::constants::{ROUNDS_PER_MATCH, WINS_TO_TAKE_MATCH};

/// Match phase as shared with the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameState {
    #[default]
    Playing,
    RoundWinner,
    FinalWinner,
}

/// What happens after a recorded round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Another round follows
    NextRound,
    /// Match decided; `None` is a drawn match
    MatchOver(Option<usize>),
}

/// Round and win counters for one match.
///
/// Fighter indices (0, 1) are used throughout; the peer protocol speaks
/// player numbers (1, 2) and converts at the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub current_round: u32,
    pub wins: [u32; 2],
    pub game_state: GameState,
    pub round_winner: Option<usize>,
    pub final_winner: Option<usize>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            current_round: 1,
            wins: [0, 0],
            game_state: GameState::Playing,
            round_winner: None,
            final_winner: None,
        }
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_over(&self) -> bool {
        self.game_state == GameState::FinalWinner
    }

    /// Credit the current round to `winner` (`None` for a draw) and decide whether the match is over
    pub fn record_round(&mut self, winner: Option<usize>) -> RoundOutcome {
        if self.is_over() {
            return RoundOutcome::MatchOver(self.final_winner);
        }
        if let Some(w) = winner {
            self.wins[w] += 1;
        }
        self.round_winner = winner;

        let decided = self.wins.iter().any(|&w| w >= WINS_TO_TAKE_MATCH)
            || self.current_round >= ROUNDS_PER_MATCH;
        if decided {
            self.game_state = GameState::FinalWinner;
            self.final_winner = match self.wins[0].cmp(&self.wins[1]) {
                std::cmp::Ordering::Greater => Some(0),
                std::cmp::Ordering::Less => Some(1),
                std::cmp::Ordering::Equal => None,
            };
            info!(
                "Match over after round {}: {:?} ({}-{})",
                self.current_round, self.final_winner, self.wins[0], self.wins[1]
            );
            RoundOutcome::MatchOver(self.final_winner)
        } else {
            self.game_state = GameState::RoundWinner;
            info!(
                "Round {} to {:?} ({}-{})",
                self.current_round, winner, self.wins[0], self.wins[1]
            );
            RoundOutcome::NextRound
        }
    }

    /// Move on to the next round after a round result
    pub fn advance_round(&mut self) {
        if self.is_over() {
            return;
        }
        self.current_round += 1;
        self.game_state = GameState::Playing;
        self.round_winner = None;
    }

    /// Take the peer's view when it is not behind ours. Returns true if adopted.
    pub fn adopt(&mut self, remote: &MatchState) -> bool {
        if remote.current_round < self.current_round {
            return false;
        }
        *self = remote.clone();
        true
    }
}
