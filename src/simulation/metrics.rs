//! Metrics collection for bot simulations

use serde::{Deserialize, Serialize};

use crate::events::{GameEvent, PlayerId};

use super::bot::BotStyle;

/// Statistics for one side during a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FighterStats {
    /// Hits that did damage
    pub hits_landed: u32,
    /// Life taken from the opponent
    pub damage_dealt: f32,
    /// Move transitions
    pub move_changes: u32,
    pub rounds_won: u32,
}

/// Result of a single match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub fighters: [String; 2],
    pub bots: [BotStyle; 2],
    /// "left", "right" or "draw"
    pub winner: String,
    pub rounds_played: u32,
    pub draws: u32,
    /// Engine seconds from start to the last event
    pub duration: f32,
    /// Stopped by the time cap before a final winner
    pub timed_out: bool,
    pub left: FighterStats,
    pub right: FighterStats,
    pub seed: u64,
    /// Logged events for this match (used for DB persistence)
    #[serde(skip)]
    pub events: Vec<(u32, GameEvent)>,
}

impl MatchResult {
    /// Fold the logged events of one match into a result
    pub fn from_events(fighters: [String; 2], bots: [BotStyle; 2], seed: u64, events: Vec<(u32, GameEvent)>) -> Self {
        let mut stats = [FighterStats::default(), FighterStats::default()];
        let mut rounds_played = 0;
        let mut draws = 0;
        let mut winner = None;
        let mut finished = false;

        for (_, event) in &events {
            match event {
                GameEvent::MoveChange { player, .. } => stats[player.index()].move_changes += 1,
                GameEvent::Attack { attacker, damage, .. } => {
                    let side = &mut stats[attacker.index()];
                    side.hits_landed += 1;
                    side.damage_dealt += *damage;
                }
                GameEvent::RoundEnd { winner, .. } => {
                    rounds_played += 1;
                    stats[winner.index()].rounds_won += 1;
                }
                GameEvent::RoundDraw { .. } => {
                    rounds_played += 1;
                    draws += 1;
                }
                GameEvent::MatchEnd { winner: w, .. } => {
                    winner = *w;
                    finished = true;
                }
                _ => {}
            }
        }

        let [left, right] = stats;
        Self {
            fighters,
            bots,
            winner: match winner {
                Some(PlayerId::L) => "left",
                Some(PlayerId::R) => "right",
                None => "draw",
            }
            .to_string(),
            rounds_played,
            draws,
            duration: events.last().map(|(t, _)| *t as f32 / 1000.0).unwrap_or(0.0),
            timed_out: !finished,
            left,
            right,
            seed,
            events,
        }
    }
}

/// Aggregate over a batch of matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSummary {
    pub matches: u32,
    pub left_wins: u32,
    pub right_wins: u32,
    pub draws: u32,
    pub timed_out: u32,
    pub avg_duration: f32,
    pub avg_rounds: f32,
    pub avg_hits: [f32; 2],
    pub avg_damage: [f32; 2],
}

impl SimSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self {
            matches: results.len() as u32,
            ..Default::default()
        };
        if results.is_empty() {
            return summary;
        }
        for r in results {
            match r.winner.as_str() {
                "left" => summary.left_wins += 1,
                "right" => summary.right_wins += 1,
                _ if r.timed_out => summary.timed_out += 1,
                _ => summary.draws += 1,
            }
            summary.avg_duration += r.duration;
            summary.avg_rounds += r.rounds_played as f32;
            summary.avg_hits[0] += r.left.hits_landed as f32;
            summary.avg_hits[1] += r.right.hits_landed as f32;
            summary.avg_damage[0] += r.left.damage_dealt;
            summary.avg_damage[1] += r.right.damage_dealt;
        }
        let n = results.len() as f32;
        summary.avg_duration /= n;
        summary.avg_rounds /= n;
        for side in 0..2 {
            summary.avg_hits[side] /= n;
            summary.avg_damage[side] /= n;
        }
        summary
    }

    pub fn format_table(&self, fighters: &[String; 2]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nResults over {} matches:\n\n", self.matches));
        output.push_str(&format!(
            "{:>12} | {:>6} | {:>8} | {:>8}\n",
            "Side", "Wins", "Hits/m", "Dmg/m"
        ));
        output.push_str(&format!("{:-<12}-+-{:-<6}-+-{:-<8}-+-{:-<8}\n", "", "", "", ""));
        let wins = [self.left_wins, self.right_wins];
        for side in 0..2 {
            let name = &fighters[side];
            output.push_str(&format!(
                "{:>12} | {:>6} | {:>8.1} | {:>8.1}\n",
                &name[..name.len().min(12)],
                wins[side],
                self.avg_hits[side],
                self.avg_damage[side]
            ));
        }
        output.push_str(&format!(
            "\nDraws: {}  Timed out: {}  Avg rounds: {:.2}  Avg duration: {:.1}s\n",
            self.draws, self.timed_out, self.avg_rounds, self.avg_duration
        ));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveType;

    fn names() -> [String; 2] {
        ["a".to_string(), "b".to_string()]
    }

    fn sample_events() -> Vec<(u32, GameEvent)> {
        vec![
            (0, GameEvent::RoundStart { round: 1, wins_left: 0, wins_right: 0 }),
            (6000, GameEvent::MoveChange { player: PlayerId::L, mv: MoveType::Walk }),
            (
                6500,
                GameEvent::Attack {
                    attacker: PlayerId::L,
                    attack: MoveType::HighKick,
                    damage: 10.0,
                    victim_life: 90.0,
                },
            ),
            (66000, GameEvent::RoundEnd { round: 1, winner: PlayerId::L, wins_left: 1, wins_right: 0 }),
            (135000, GameEvent::RoundDraw { round: 2 }),
            (204000, GameEvent::RoundEnd { round: 3, winner: PlayerId::L, wins_left: 2, wins_right: 0 }),
            (
                204000,
                GameEvent::MatchEnd {
                    winner: Some(PlayerId::L),
                    wins_left: 2,
                    wins_right: 0,
                    duration: 204.0,
                },
            ),
        ]
    }

    #[test]
    fn test_result_from_events() {
        let result = MatchResult::from_events(names(), [BotStyle::Random; 2], 1, sample_events());
        assert_eq!(result.winner, "left");
        assert_eq!(result.rounds_played, 3);
        assert_eq!(result.draws, 1);
        assert_eq!(result.left.rounds_won, 2);
        assert_eq!(result.left.hits_landed, 1);
        assert_eq!(result.left.damage_dealt, 10.0);
        assert_eq!(result.left.move_changes, 1);
        assert!(!result.timed_out);
        assert_eq!(result.duration, 204.0);
    }

    #[test]
    fn test_unfinished_match_is_timed_out() {
        let mut events = sample_events();
        events.pop();
        let result = MatchResult::from_events(names(), [BotStyle::Random; 2], 1, events);
        assert!(result.timed_out);
        assert_eq!(result.winner, "draw");

        let summary = SimSummary::from_results(&[result]);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.draws, 0);
    }

    #[test]
    fn test_summary_averages() {
        let a = MatchResult::from_events(names(), [BotStyle::Random; 2], 1, sample_events());
        let mut b = a.clone();
        b.winner = "right".to_string();
        b.left.hits_landed = 3;
        let summary = SimSummary::from_results(&[a, b]);
        assert_eq!((summary.left_wins, summary.right_wins), (1, 1));
        assert_eq!(summary.avg_hits[0], 2.0);
        assert!(summary.format_table(&names()).contains("Avg rounds: 3.00"));
        assert_eq!(SimSummary::from_results(&[]).matches, 0);
    }
}
