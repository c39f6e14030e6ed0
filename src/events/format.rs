//! Compact text format for fight event serialization
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = 1-2 char event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|MS|realtime|subzero|kano|1
//! T:00000|RS|1|0|0
//! T:10000|CD|1
//! T:10450|MV|L|HIGH_KICK
//! T:10600|AT|L|HIGH_KICK|10.0|90.0
//! T:31200|RE|1|R|0|1
//! T:95000|ME|R|1|2|95.0
//! ```
//!
//! Tick samples:
//! ```text
//! T:00050|T|1|100.0,560.0|940.0,560.0|100.0|100.0
//!          ^frame|left_pos|right_pos|left_life|right_life
//! ```

use super::types::{GameEvent, PlayerId};
use crate::tuning::FightTuning;

/// Format a float with fixed precision (1 decimal)
fn fmt_f1(v: f32) -> String {
    format!("{:.1}", v)
}

fn fmt_pos(pos: (f32, f32)) -> String {
    format!("{:.1},{:.1}", pos.0, pos.1)
}

/// Free text must not break the field layout
fn fmt_text(s: &str) -> String {
    s.replace('|', "/")
}

fn fmt_side(side: Option<PlayerId>) -> String {
    side.map_or_else(|| "_".to_string(), |p| p.to_string())
}

/// Serialize a GameEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &GameEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        GameEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        GameEvent::Config(tuning) => {
            serde_json::to_string(tuning).unwrap_or_else(|_| "{}".to_string())
        }
        GameEvent::MatchStart {
            game_type,
            left,
            right,
            arena,
        } => format!(
            "{}|{}|{}|{}",
            game_type,
            fmt_text(left),
            fmt_text(right),
            arena
        ),
        GameEvent::MatchEnd {
            winner,
            wins_left,
            wins_right,
            duration,
        } => format!(
            "{}|{}|{}|{}",
            fmt_side(*winner),
            wins_left,
            wins_right,
            fmt_f1(*duration)
        ),
        GameEvent::RoundStart {
            round,
            wins_left,
            wins_right,
        } => format!("{}|{}|{}", round, wins_left, wins_right),
        GameEvent::CountdownFinished { round } => round.to_string(),
        GameEvent::RoundEnd {
            round,
            winner,
            wins_left,
            wins_right,
        } => format!("{}|{}|{}|{}", round, winner, wins_left, wins_right),
        GameEvent::RoundDraw { round } => round.to_string(),
        GameEvent::MoveChange { player, mv } => format!("{}|{}", player, mv),
        GameEvent::Attack {
            attacker,
            attack,
            damage,
            victim_life,
        } => format!(
            "{}|{}|{}|{}",
            attacker,
            attack,
            fmt_f1(*damage),
            fmt_f1(*victim_life)
        ),
        GameEvent::PeerConnected { peer_id } => fmt_text(peer_id),
        GameEvent::PeerSendFailed { reason } => fmt_text(reason),
        GameEvent::PeerApplied { player, kind } => format!("{}|{}", player, kind),
        GameEvent::Tick {
            frame,
            left_pos,
            right_pos,
            left_life,
            right_life,
        } => format!(
            "{}|{}|{}|{}|{}",
            frame,
            fmt_pos(*left_pos),
            fmt_pos(*right_pos),
            fmt_f1(*left_life),
            fmt_f1(*right_life)
        ),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a line back into timestamp and event
pub fn parse_event(line: &str) -> Option<(u32, GameEvent)> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let ts_str = parts[0].strip_prefix("T:")?;
    let time_ms: u32 = ts_str.parse().ok()?;

    let code = parts[1];
    let data = &parts[2..];

    let event = match code {
        "SE" if data.len() >= 2 => GameEvent::SessionStart {
            session_id: data[0].to_string(),
            timestamp: data[1].to_string(),
        },
        "CF" if !data.is_empty() => {
            let tuning: FightTuning = serde_json::from_str(&data.join("|")).ok()?;
            GameEvent::Config(tuning)
        }
        "MS" if data.len() >= 4 => GameEvent::MatchStart {
            game_type: data[0].to_string(),
            left: data[1].to_string(),
            right: data[2].to_string(),
            arena: data[3].parse().ok()?,
        },
        "ME" if data.len() >= 4 => GameEvent::MatchEnd {
            winner: parse_side(data[0])?,
            wins_left: data[1].parse().ok()?,
            wins_right: data[2].parse().ok()?,
            duration: data[3].parse().ok()?,
        },
        "RS" if data.len() >= 3 => GameEvent::RoundStart {
            round: data[0].parse().ok()?,
            wins_left: data[1].parse().ok()?,
            wins_right: data[2].parse().ok()?,
        },
        "CD" if !data.is_empty() => GameEvent::CountdownFinished {
            round: data[0].parse().ok()?,
        },
        "RE" if data.len() >= 4 => GameEvent::RoundEnd {
            round: data[0].parse().ok()?,
            winner: parse_player(data[1])?,
            wins_left: data[2].parse().ok()?,
            wins_right: data[3].parse().ok()?,
        },
        "RD" if !data.is_empty() => GameEvent::RoundDraw {
            round: data[0].parse().ok()?,
        },
        "MV" if data.len() >= 2 => GameEvent::MoveChange {
            player: parse_player(data[0])?,
            mv: data[1].parse().ok()?,
        },
        "AT" if data.len() >= 4 => GameEvent::Attack {
            attacker: parse_player(data[0])?,
            attack: data[1].parse().ok()?,
            damage: data[2].parse().ok()?,
            victim_life: data[3].parse().ok()?,
        },
        "PC" if !data.is_empty() => GameEvent::PeerConnected {
            peer_id: data[0].to_string(),
        },
        "PF" if !data.is_empty() => GameEvent::PeerSendFailed {
            reason: data.join("|"),
        },
        "PA" if data.len() >= 2 => GameEvent::PeerApplied {
            player: parse_player(data[0])?,
            kind: data[1].to_string(),
        },
        "T" if data.len() >= 5 => GameEvent::Tick {
            frame: data[0].parse().ok()?,
            left_pos: parse_pos(data[1])?,
            right_pos: parse_pos(data[2])?,
            left_life: data[3].parse().ok()?,
            right_life: data[4].parse().ok()?,
        },
        _ => return None,
    };

    Some((time_ms, event))
}

fn parse_player(s: &str) -> Option<PlayerId> {
    match s {
        "L" => Some(PlayerId::L),
        "R" => Some(PlayerId::R),
        _ => None,
    }
}

/// `_` marks "no side" (drawn match)
fn parse_side(s: &str) -> Option<Option<PlayerId>> {
    if s == "_" {
        Some(None)
    } else {
        parse_player(s).map(Some)
    }
}

fn parse_pos(s: &str) -> Option<(f32, f32)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parts[0].parse().ok()?, parts[1].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveType;

    #[test]
    fn test_attack_line_layout() {
        let event = GameEvent::Attack {
            attacker: PlayerId::L,
            attack: MoveType::HighKick,
            damage: 10.0,
            victim_life: 90.0,
        };
        let line = serialize_event(10600, &event);
        assert_eq!(line, "T:10600|AT|L|HIGH_KICK|10.0|90.0");
        assert_eq!(parse_event(&line), Some((10600, event)));
    }

    #[test]
    fn test_drawn_match_end() {
        let event = GameEvent::MatchEnd {
            winner: None,
            wins_left: 0,
            wins_right: 0,
            duration: 195.5,
        };
        let line = serialize_event(1500, &event);
        assert!(line.ends_with("|ME|_|0|0|195.5"));
        let (ts, parsed) = parse_event(&line).unwrap();
        assert_eq!(ts, 1500);
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_timestamp_wraps() {
        let line = serialize_event(123_456, &GameEvent::RoundDraw { round: 2 });
        assert!(line.starts_with("T:23456|RD|2"));
    }

    #[test]
    fn test_tick_sample() {
        let event = GameEvent::Tick {
            frame: 150,
            left_pos: (100.0, 560.0),
            right_pos: (840.5, 630.0),
            left_life: 100.0,
            right_life: 42.5,
        };
        let line = serialize_event(100, &event);
        assert!(line.contains("|T|"));
        let (_, parsed) = parse_event(&line).unwrap();
        if let GameEvent::Tick {
            frame,
            right_pos,
            right_life,
            ..
        } = parsed
        {
            assert_eq!(frame, 150);
            assert!((right_pos.0 - 840.5).abs() < 0.1);
            assert!((right_life - 42.5).abs() < 0.1);
        } else {
            panic!("Wrong event type");
        }
    }

    #[test]
    fn test_config_survives_pipes_in_free_text() {
        let event = GameEvent::Config(FightTuning::default());
        let (_, parsed) = parse_event(&serialize_event(0, &event)).unwrap();
        assert_eq!(parsed, event);

        let failed = GameEvent::PeerSendFailed {
            reason: "move: io|refused".to_string(),
        };
        let (_, parsed) = parse_event(&serialize_event(0, &failed)).unwrap();
        assert_eq!(
            parsed,
            GameEvent::PeerSendFailed {
                reason: "move: io/refused".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_unknown_lines() {
        assert_eq!(parse_event("garbage"), None);
        assert_eq!(parse_event("T:00010|ZZ|1"), None);
        assert_eq!(parse_event("T:00010|MV|L|MOONWALK"), None);
        assert_eq!(parse_event("T:00010|RE|1|X|0|0"), None);
    }
}
