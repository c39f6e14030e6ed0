//! Held keys -> move decision table

use super::keys::{FightKey, PressedKeys};
use crate::fighter::Orientation;
use crate::moves::MoveType;

/// Jump-attack variant of `grounded` when the fighter is mid forward/backward jump
fn airborne_variant(current: MoveType, grounded: MoveType, forward: MoveType, backward: MoveType) -> MoveType {
    match current {
        MoveType::ForwardJump => forward,
        MoveType::BackwardJump => backward,
        _ => grounded,
    }
}

/// Resolve the move a fighter should enter for the given held keys.
///
/// Evaluated on every key change. Precedence runs top to bottom: releasing
/// DOWN or BLOCK leaves those postures first, then block, horizontal
/// directions, crouch combos, and finally the bare attack buttons. Returns
/// `None` when nothing applies (the current move keeps running).
pub fn decide_move(pressed: PressedKeys, orientation: Orientation, current: MoveType) -> Option<MoveType> {
    use FightKey::*;
    let held = |key| pressed.is_pressed(key);

    if current == MoveType::Squat && !held(Down) {
        return Some(MoveType::StandUp);
    }
    if current == MoveType::Block && !held(Block) {
        return Some(MoveType::Stand);
    }
    if pressed.is_empty() {
        return Some(MoveType::Stand);
    }

    let decided = if held(Block) {
        MoveType::Block
    } else if held(Left) {
        if held(Up) {
            MoveType::BackwardJump
        } else if held(HighKick) && orientation == Orientation::Left {
            MoveType::SpinKick
        } else {
            MoveType::WalkBackward
        }
    } else if held(Right) {
        if held(Up) {
            MoveType::ForwardJump
        } else if held(HighKick) && orientation == Orientation::Right {
            MoveType::SpinKick
        } else {
            MoveType::Walk
        }
    } else if held(Down) {
        if held(HighPunch) {
            MoveType::Uppercut
        } else if held(LowKick) {
            MoveType::SquatLowKick
        } else if held(HighKick) {
            MoveType::SquatHighKick
        } else if held(LowPunch) {
            MoveType::SquatLowPunch
        } else {
            MoveType::Squat
        }
    } else if held(HighKick) {
        airborne_variant(current, MoveType::HighKick, MoveType::ForwardJumpKick, MoveType::BackwardJumpKick)
    } else if held(Up) {
        MoveType::Jump
    } else if held(LowKick) {
        airborne_variant(current, MoveType::LowKick, MoveType::ForwardJumpKick, MoveType::BackwardJumpKick)
    } else if held(LowPunch) {
        airborne_variant(current, MoveType::LowPunch, MoveType::ForwardJumpPunch, MoveType::BackwardJumpPunch)
    } else if held(HighPunch) {
        airborne_variant(current, MoveType::HighPunch, MoveType::ForwardJumpPunch, MoveType::BackwardJumpPunch)
    } else {
        return None;
    };
    Some(decided)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[FightKey]) -> PressedKeys {
        list.iter().copied().collect()
    }

    fn decide(list: &[FightKey], current: MoveType) -> Option<MoveType> {
        decide_move(keys(list), Orientation::Left, current)
    }

    #[test]
    fn test_release_everything_stands() {
        assert_eq!(decide(&[], MoveType::Walk), Some(MoveType::Stand));
    }

    #[test]
    fn test_leaving_squat_and_block() {
        assert_eq!(decide(&[], MoveType::Squat), Some(MoveType::StandUp));
        assert_eq!(decide(&[FightKey::Right], MoveType::Squat), Some(MoveType::StandUp));
        assert_eq!(decide(&[FightKey::Down], MoveType::Squat), Some(MoveType::Squat));
        assert_eq!(decide(&[FightKey::Left], MoveType::Block), Some(MoveType::Stand));
    }

    #[test]
    fn test_block_wins_over_everything() {
        assert_eq!(
            decide(&[FightKey::Block, FightKey::Right, FightKey::HighKick], MoveType::Stand),
            Some(MoveType::Block)
        );
    }

    #[test]
    fn test_directions_and_jumps() {
        assert_eq!(decide(&[FightKey::Right], MoveType::Stand), Some(MoveType::Walk));
        assert_eq!(decide(&[FightKey::Left], MoveType::Stand), Some(MoveType::WalkBackward));
        assert_eq!(decide(&[FightKey::Right, FightKey::Up], MoveType::Stand), Some(MoveType::ForwardJump));
        assert_eq!(decide(&[FightKey::Left, FightKey::Up], MoveType::Stand), Some(MoveType::BackwardJump));
        assert_eq!(decide(&[FightKey::Up], MoveType::Stand), Some(MoveType::Jump));
    }

    #[test]
    fn test_spin_kick_depends_on_orientation() {
        let back_kick = keys(&[FightKey::Left, FightKey::HighKick]);
        assert_eq!(decide_move(back_kick, Orientation::Left, MoveType::Stand), Some(MoveType::SpinKick));
        assert_eq!(decide_move(back_kick, Orientation::Right, MoveType::Stand), Some(MoveType::WalkBackward));
        let fwd_kick = keys(&[FightKey::Right, FightKey::HighKick]);
        assert_eq!(decide_move(fwd_kick, Orientation::Right, MoveType::Stand), Some(MoveType::SpinKick));
        assert_eq!(decide_move(fwd_kick, Orientation::Left, MoveType::Stand), Some(MoveType::Walk));
    }

    #[test]
    fn test_crouch_combos() {
        let down = |k| decide(&[FightKey::Down, k], MoveType::Squat);
        assert_eq!(down(FightKey::HighPunch), Some(MoveType::Uppercut));
        assert_eq!(down(FightKey::LowKick), Some(MoveType::SquatLowKick));
        assert_eq!(down(FightKey::HighKick), Some(MoveType::SquatHighKick));
        assert_eq!(down(FightKey::LowPunch), Some(MoveType::SquatLowPunch));
    }

    #[test]
    fn test_attacks_become_jump_attacks_in_the_air() {
        assert_eq!(decide(&[FightKey::HighKick], MoveType::Stand), Some(MoveType::HighKick));
        assert_eq!(decide(&[FightKey::HighKick], MoveType::ForwardJump), Some(MoveType::ForwardJumpKick));
        assert_eq!(decide(&[FightKey::LowKick], MoveType::BackwardJump), Some(MoveType::BackwardJumpKick));
        assert_eq!(decide(&[FightKey::LowPunch], MoveType::ForwardJump), Some(MoveType::ForwardJumpPunch));
        assert_eq!(decide(&[FightKey::HighPunch], MoveType::BackwardJump), Some(MoveType::BackwardJumpPunch));
        // A straight jump has no attack variant
        assert_eq!(decide(&[FightKey::HighPunch], MoveType::Jump), Some(MoveType::HighPunch));
    }
}
