//! Static move table: step policy, frame timing, motion and impact per move

use super::kind::MoveType;
use crate::constants::*;

/// How a move advances through its frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Loops over its frames until replaced
    Cyclic,
    /// Runs once, then either holds the last frame or hands over to `then`
    Finite,
    /// Counts up to the apex, then back down to zero
    Arc,
}

/// Positional effect applied on every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Keep the feet on the ground line
    Ground,
    /// Horizontal step along the ground
    Walk { dx: f32 },
    /// Jump arc with a horizontal drift per frame
    Arc { dx: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Frame index whose action lands the hit
    pub step: u32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSpec {
    pub policy: StepPolicy,
    pub steps: u32,
    pub step_ms: u32,
    pub motion: Motion,
    pub impact: Option<Impact>,
    /// Follow-up move once a finite or arc move completes (None holds the last frame)
    pub then: Option<MoveType>,
    /// Lock the owner while the move is running
    pub locks: bool,
}

const fn finite(steps: u32, step_ms: u32, then: Option<MoveType>, locks: bool) -> MoveSpec {
    MoveSpec {
        policy: StepPolicy::Finite,
        steps,
        step_ms,
        motion: Motion::Ground,
        impact: None,
        then,
        locks,
    }
}

const fn attack(steps: u32, step_ms: u32, step: u32, damage: f32, then: MoveType) -> MoveSpec {
    MoveSpec {
        policy: StepPolicy::Finite,
        steps,
        step_ms,
        motion: Motion::Ground,
        impact: Some(Impact { step, damage }),
        then: Some(then),
        locks: true,
    }
}

const fn arc(dx: f32, impact: Option<Impact>) -> MoveSpec {
    MoveSpec {
        policy: StepPolicy::Arc,
        steps: 6,
        step_ms: 60,
        motion: Motion::Arc { dx },
        impact,
        then: Some(MoveType::Stand),
        locks: true,
    }
}

/// Impact frame for airborne attacks, one frame below the apex
const JUMP_IMPACT_STEP: u32 = 4;

/// Look up the fixed definition of a move
pub fn spec(kind: MoveType) -> MoveSpec {
    use MoveType::*;
    match kind {
        Stand => MoveSpec {
            policy: StepPolicy::Cyclic,
            steps: 9,
            step_ms: 80,
            motion: Motion::Ground,
            impact: None,
            then: None,
            locks: false,
        },
        Walk | WalkBackward => MoveSpec {
            policy: StepPolicy::Cyclic,
            steps: 9,
            step_ms: STEP_DURATION_MS,
            motion: Motion::Walk {
                dx: if kind == Walk { WALK_STEP_X } else { -WALK_STEP_X },
            },
            impact: None,
            then: None,
            locks: false,
        },
        Squat => finite(3, 40, None, true),
        StandUp => finite(3, 40, Some(Stand), true),
        Block => finite(3, STEP_DURATION_MS, None, false),
        Jump => arc(0.0, None),
        ForwardJump => arc(JUMP_STEP_X, None),
        BackwardJump => arc(-JUMP_STEP_X, None),
        HighPunch | LowPunch => attack(5, STEP_DURATION_MS, 2, 5.0, Stand),
        HighKick => attack(7, STEP_DURATION_MS, 3, 10.0, Stand),
        LowKick => attack(6, STEP_DURATION_MS, 3, 6.0, Stand),
        SpinKick => attack(8, 60, 4, 13.0, Stand),
        Uppercut => attack(5, 60, 3, 13.0, Stand),
        SquatLowKick | SquatLowPunch => attack(3, STEP_DURATION_MS, 1, 4.0, Squat),
        SquatHighKick => attack(4, STEP_DURATION_MS, 2, 6.0, Squat),
        ForwardJumpKick => arc(JUMP_STEP_X, Some(Impact { step: JUMP_IMPACT_STEP, damage: 10.0 })),
        BackwardJumpKick => arc(-JUMP_STEP_X, Some(Impact { step: JUMP_IMPACT_STEP, damage: 10.0 })),
        ForwardJumpPunch => arc(JUMP_STEP_X, Some(Impact { step: JUMP_IMPACT_STEP, damage: 8.0 })),
        BackwardJumpPunch => arc(-JUMP_STEP_X, Some(Impact { step: JUMP_IMPACT_STEP, damage: 8.0 })),
        Endure => finite(3, 70, Some(Stand), true),
        SquatEndure => finite(3, 70, Some(Squat), true),
        KnockDown => finite(10, 80, Some(StandUp), true),
        Fall => finite(7, 100, None, true),
        Win => finite(10, 100, None, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_attack_has_an_impact_inside_its_frames() {
        for kind in MoveType::ALL {
            let s = spec(kind);
            match s.impact {
                Some(impact) => {
                    assert!(kind.is_attack(), "{} should not deal damage", kind);
                    assert!(impact.step < s.steps, "{} impact past last frame", kind);
                    assert!(impact.damage > 0.0);
                    assert!(s.locks);
                }
                None => assert!(!kind.is_attack(), "{} is missing an impact", kind),
            }
        }
    }

    #[test]
    fn test_arcs_return_to_stand() {
        for kind in MoveType::ALL.into_iter().filter(|m| m.is_jump()) {
            let s = spec(kind);
            assert_eq!(s.policy, StepPolicy::Arc);
            assert_eq!(s.then, Some(MoveType::Stand));
        }
    }

    #[test]
    fn test_crouched_attacks_return_to_squat() {
        assert_eq!(spec(MoveType::SquatLowKick).then, Some(MoveType::Squat));
        assert_eq!(spec(MoveType::SquatHighKick).then, Some(MoveType::Squat));
        assert_eq!(spec(MoveType::SquatEndure).then, Some(MoveType::Squat));
        assert_eq!(spec(MoveType::KnockDown).then, Some(MoveType::StandUp));
    }
}
