//! Move kinds and their string tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every posture or action a fighter can be in.
///
/// The string tag (`WALK`, `HIGH_PUNCH`, ...) is what travels over the peer
/// channel, so the serde names and [`MoveType::as_str`] must stay in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveType {
    Stand,
    Walk,
    WalkBackward,
    Squat,
    StandUp,
    Block,
    Jump,
    ForwardJump,
    BackwardJump,
    HighPunch,
    LowPunch,
    HighKick,
    LowKick,
    SpinKick,
    Uppercut,
    SquatLowKick,
    SquatLowPunch,
    SquatHighKick,
    ForwardJumpKick,
    BackwardJumpKick,
    ForwardJumpPunch,
    BackwardJumpPunch,
    Endure,
    SquatEndure,
    KnockDown,
    Fall,
    Win,
}

impl MoveType {
    pub const ALL: [MoveType; 27] = [
        MoveType::Stand,
        MoveType::Walk,
        MoveType::WalkBackward,
        MoveType::Squat,
        MoveType::StandUp,
        MoveType::Block,
        MoveType::Jump,
        MoveType::ForwardJump,
        MoveType::BackwardJump,
        MoveType::HighPunch,
        MoveType::LowPunch,
        MoveType::HighKick,
        MoveType::LowKick,
        MoveType::SpinKick,
        MoveType::Uppercut,
        MoveType::SquatLowKick,
        MoveType::SquatLowPunch,
        MoveType::SquatHighKick,
        MoveType::ForwardJumpKick,
        MoveType::BackwardJumpKick,
        MoveType::ForwardJumpPunch,
        MoveType::BackwardJumpPunch,
        MoveType::Endure,
        MoveType::SquatEndure,
        MoveType::KnockDown,
        MoveType::Fall,
        MoveType::Win,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoveType::Stand => "STAND",
            MoveType::Walk => "WALK",
            MoveType::WalkBackward => "WALK_BACKWARD",
            MoveType::Squat => "SQUAT",
            MoveType::StandUp => "STAND_UP",
            MoveType::Block => "BLOCK",
            MoveType::Jump => "JUMP",
            MoveType::ForwardJump => "FORWARD_JUMP",
            MoveType::BackwardJump => "BACKWARD_JUMP",
            MoveType::HighPunch => "HIGH_PUNCH",
            MoveType::LowPunch => "LOW_PUNCH",
            MoveType::HighKick => "HIGH_KICK",
            MoveType::LowKick => "LOW_KICK",
            MoveType::SpinKick => "SPIN_KICK",
            MoveType::Uppercut => "UPPERCUT",
            MoveType::SquatLowKick => "SQUAT_LOW_KICK",
            MoveType::SquatLowPunch => "SQUAT_LOW_PUNCH",
            MoveType::SquatHighKick => "SQUAT_HIGH_KICK",
            MoveType::ForwardJumpKick => "FORWARD_JUMP_KICK",
            MoveType::BackwardJumpKick => "BACKWARD_JUMP_KICK",
            MoveType::ForwardJumpPunch => "FORWARD_JUMP_PUNCH",
            MoveType::BackwardJumpPunch => "BACKWARD_JUMP_PUNCH",
            MoveType::Endure => "ENDURE",
            MoveType::SquatEndure => "SQUAT_ENDURE",
            MoveType::KnockDown => "KNOCK_DOWN",
            MoveType::Fall => "FALL",
            MoveType::Win => "WIN",
        }
    }

    /// Moves that deal damage at an impact step
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            MoveType::HighPunch
                | MoveType::LowPunch
                | MoveType::HighKick
                | MoveType::LowKick
                | MoveType::SpinKick
                | MoveType::Uppercut
                | MoveType::SquatLowKick
                | MoveType::SquatLowPunch
                | MoveType::SquatHighKick
                | MoveType::ForwardJumpKick
                | MoveType::BackwardJumpKick
                | MoveType::ForwardJumpPunch
                | MoveType::BackwardJumpPunch
        )
    }

    /// Airborne attacks judged with the relaxed vertical tolerance
    pub fn is_jump_attack(self) -> bool {
        matches!(
            self,
            MoveType::ForwardJumpKick
                | MoveType::BackwardJumpKick
                | MoveType::ForwardJumpPunch
                | MoveType::BackwardJumpPunch
        )
    }

    /// Moves that follow a jump arc
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            MoveType::Jump | MoveType::ForwardJump | MoveType::BackwardJump
        ) || self.is_jump_attack()
    }

    /// Airborne attack that takes over `arc` mid-flight without restarting it
    pub fn continues_arc(self, arc: MoveType) -> bool {
        matches!(
            (arc, self),
            (
                MoveType::ForwardJump,
                MoveType::ForwardJumpKick | MoveType::ForwardJumpPunch
            ) | (
                MoveType::BackwardJump,
                MoveType::BackwardJumpKick | MoveType::BackwardJumpPunch
            )
        )
    }

    /// Crouched postures (shorter bounding box, low-attack immunity rules)
    pub fn is_crouched(self) -> bool {
        matches!(
            self,
            MoveType::Squat
                | MoveType::SquatLowKick
                | MoveType::SquatLowPunch
                | MoveType::SquatHighKick
                | MoveType::SquatEndure
        )
    }

    /// Attacks that can land on a crouching opponent
    pub fn hits_crouched(self) -> bool {
        matches!(
            self,
            MoveType::LowPunch
                | MoveType::LowKick
                | MoveType::SquatLowKick
                | MoveType::SquatLowPunch
                | MoveType::SquatHighKick
        )
    }

    /// Forced transitions allowed while the fighter is locked
    pub fn bypasses_lock(self) -> bool {
        matches!(
            self,
            MoveType::Endure
                | MoveType::SquatEndure
                | MoveType::KnockDown
                | MoveType::Fall
                | MoveType::Win
        )
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown move tag received from a peer or a scenario file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown move tag '{0}'")]
pub struct UnknownMove(pub String);

impl FromStr for MoveType {
    type Err = UnknownMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveType::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMove(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_roundtrip_through_str_and_serde() {
        for kind in MoveType::ALL {
            assert_eq!(kind.as_str().parse::<MoveType>(), Ok(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert!("MOONWALK".parse::<MoveType>().is_err());
        assert!("walk".parse::<MoveType>().is_err());
    }

    #[test]
    fn test_crouch_hit_set() {
        let allowed: Vec<_> = MoveType::ALL
            .into_iter()
            .filter(|m| m.hits_crouched())
            .collect();
        assert_eq!(
            allowed,
            vec![
                MoveType::LowPunch,
                MoveType::LowKick,
                MoveType::SquatLowKick,
                MoveType::SquatLowPunch,
                MoveType::SquatHighKick,
            ]
        );
        assert!(allowed.iter().all(|m| m.is_attack()));
    }
}
