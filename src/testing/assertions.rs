//! Assertion checking for scenario expectations

use super::parser::{ExpectedEvent, StateAssertion, fighter_index};
use crate::events::{GameEvent, PlayerId};
use crate::session::Session;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

fn player_name(player: PlayerId) -> String {
    format!("p{}", player.index() + 1)
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event_type: String,
    pub player: Option<String>,
    pub detail: Option<String>,
}

impl CapturedEvent {
    pub fn from_game_event(frame: u64, event: &GameEvent) -> Option<Self> {
        let (event_type, player, detail) = match event {
            GameEvent::MatchStart { .. } => ("MatchStart", None, None),
            GameEvent::RoundStart { round, .. } => ("RoundStart", None, Some(round.to_string())),
            GameEvent::CountdownFinished { round } => {
                ("CountdownFinished", None, Some(round.to_string()))
            }
            GameEvent::MoveChange { player, mv } => {
                ("MoveChange", Some(*player), Some(mv.as_str().to_string()))
            }
            GameEvent::Attack { attacker, attack, .. } => {
                ("Attack", Some(*attacker), Some(attack.as_str().to_string()))
            }
            GameEvent::RoundEnd { round, winner, .. } => {
                ("RoundEnd", Some(*winner), Some(round.to_string()))
            }
            GameEvent::RoundDraw { round } => ("RoundDraw", None, Some(round.to_string())),
            GameEvent::MatchEnd { winner, .. } => ("MatchEnd", *winner, None),
            _ => return None,
        };

        Some(CapturedEvent {
            frame,
            event_type: event_type.to_string(),
            player: player.map(player_name),
            detail,
        })
    }

    fn matches(&self, exp: &ExpectedEvent) -> bool {
        self.event_type == exp.event
            && exp.player.as_ref().is_none_or(|p| self.player.as_ref() == Some(p))
            && exp
                .detail
                .as_ref()
                .is_none_or(|d| self.detail.as_deref().is_some_and(|mine| mine.eq_ignore_ascii_case(d)))
    }
}

/// Check if captured events match expected sequence (in order, gaps allowed)
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        let found = captured[captured_idx..]
            .iter()
            .enumerate()
            .find(|(_, cap)| cap.matches(exp));

        match found {
            Some((offset, cap)) => {
                if let Some(min) = exp.frame_min
                    && cap.frame < min
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                        expected: format!("frame >= {}", min),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                if let Some(max) = exp.frame_max
                    && cap.frame > max
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                        expected: format!("frame <= {}", max),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                captured_idx += offset + 1;
            }
            None => {
                let player_str = exp.player.as_ref().map(|p| format!(" (player: {})", p)).unwrap_or_default();
                return Err(AssertionError {
                    message: format!("Event #{} '{}'{} not found", i + 1, exp.event, player_str),
                    expected: format!("'{}' event in sequence", exp.event),
                    actual: format!(
                        "events after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..]
                            .iter()
                            .map(|e| format!("{}:{}", e.event_type, e.detail.as_deref().unwrap_or("")))
                            .collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Fail if any of the named events was captured
pub fn check_absent(absent: &[String], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    for name in absent {
        if let Some(cap) = captured.iter().find(|c| c.event_type == *name) {
            return Err(AssertionError {
                message: format!("Event '{}' should not occur", name),
                expected: "no such event".to_string(),
                actual: format!("frame {} ({:?})", cap.frame, cap.detail),
            });
        }
    }
    Ok(())
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// A readable value from the session
enum Probe {
    Number(f32),
    Text(String),
}

fn read_path(path: &str, session: &Session) -> Result<Probe, AssertionError> {
    let unknown = || AssertionError {
        message: format!("Unknown check path '{}'", path),
        expected: "p1|p2.{x,y,life,move,locked,orientation}, match.{round,wins_left,wins_right,state,over}, timer.remaining".to_string(),
        actual: path.to_string(),
    };
    let parts: Vec<&str> = path.split('.').collect();
    let (Some(&head), Some(&field)) = (parts.first(), parts.get(1)) else {
        return Err(unknown());
    };

    if let Some(idx) = fighter_index(head) {
        let fighter = session.controller().fighter(idx);
        return Ok(match field {
            "x" => Probe::Number(fighter.x()),
            "y" => Probe::Number(fighter.y()),
            "life" => Probe::Number(fighter.life()),
            "move" => Probe::Text(fighter.current_move().as_str().to_string()),
            "locked" => Probe::Text(fighter.is_locked().to_string()),
            "orientation" => Probe::Text(format!("{:?}", fighter.orientation()).to_lowercase()),
            _ => return Err(unknown()),
        });
    }

    let state = session.match_state();
    match (head, field) {
        ("match", "round") => Ok(Probe::Number(state.current_round as f32)),
        ("match", "wins_left") => Ok(Probe::Number(state.wins[0] as f32)),
        ("match", "wins_right") => Ok(Probe::Number(state.wins[1] as f32)),
        ("match", "state") => Ok(Probe::Text(
            serde_json::to_value(state.game_state)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        )),
        ("match", "winner") => Ok(Probe::Text(
            state.final_winner.map(|i| format!("p{}", i + 1)).unwrap_or_else(|| "none".to_string()),
        )),
        ("match", "over") => Ok(Probe::Text(session.is_match_over().to_string())),
        ("timer", "remaining") => Ok(Probe::Number(
            session.controller().arena().timer().remaining_secs() as f32,
        )),
        _ => Err(unknown()),
    }
}

/// Check state assertions against the running session
pub fn check_state(assertion: &StateAssertion, session: &Session) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'p1.life = 90' or 'p2.x > 500'".to_string(),
            actual: check.clone(),
        })?;

        match read_path(path, session)? {
            Probe::Number(actual) => check_float_comparison(path, actual, operator, expected_value)?,
            Probe::Text(actual) => {
                let expected = expected_value.trim_matches('"');
                let equal = actual.eq_ignore_ascii_case(expected);
                let pass = match operator {
                    "=" => equal,
                    "!=" => !equal,
                    _ => false,
                };
                if !pass {
                    return Err(AssertionError {
                        message: format!("Check failed at frame {}: {}", assertion.after_frame, check),
                        expected: format!("{} {}", operator, expected),
                        actual,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {:.1})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: format!("{:.1}", actual),
        });
    }

    Ok(())
}
