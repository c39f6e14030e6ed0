//! Attack legality: range and posture compatibility

use crate::fighter::Fighter;
use crate::moves::MoveType;
use crate::tuning::FightTuning;

/// Whether `attacker` can reach `opponent` from where they stand.
///
/// Centers must be within the attack range and the boxes must overlap
/// vertically. Jump attacks and the uppercut may instead connect when the
/// nearest edges are within the jump tolerance.
pub fn required_distance(attacker: &Fighter, opponent: &Fighter, tuning: &FightTuning) -> bool {
    in_reach(attacker, attacker.current_move(), opponent, tuning)
}

/// [`required_distance`] for an explicit attack kind (the attacker may already have been interrupted)
pub(crate) fn in_reach(attacker: &Fighter, attack: MoveType, opponent: &Fighter, tuning: &FightTuning) -> bool {
    let horizontal = (attacker.center_x() - opponent.center_x()).abs();
    if horizontal > tuning.attack_range {
        return false;
    }

    let (a_top, a_bottom) = (attacker.y(), attacker.bottom());
    let (o_top, o_bottom) = (opponent.y(), opponent.bottom());
    if !(a_bottom < o_top || a_top > o_bottom) {
        return true;
    }

    if attack.is_jump_attack() || attack == MoveType::Uppercut {
        let gap = (a_bottom - o_top).abs().min((a_top - o_bottom).abs());
        return gap <= tuning.jump_attack_tolerance;
    }
    false
}

/// A crouched victim can only be hit by low attacks; anyone else takes anything
pub fn attack_compatible(attack: MoveType, victim_posture: MoveType) -> bool {
    if victim_posture.is_crouched() {
        attack.hits_crouched()
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn fighter_at(index: usize, x: f32, y: f32, kind: MoveType) -> Fighter {
        let mut f = Fighter::new(format!("f{}", index), index);
        f.set_move(kind);
        f.set_x(x);
        f.set_y(y);
        f
    }

    #[test]
    fn test_range_boundary() {
        let tuning = FightTuning::default();
        let a = fighter_at(0, 100.0, PLAYER_TOP, MoveType::HighKick);
        let near = fighter_at(1, 300.0, PLAYER_TOP, MoveType::Stand);
        let far = fighter_at(1, 300.5, PLAYER_TOP, MoveType::Stand);
        assert!(required_distance(&a, &near, &tuning));
        assert!(!required_distance(&a, &far, &tuning));
    }

    #[test]
    fn test_jump_attack_tolerance() {
        let tuning = FightTuning::default();
        let victim = fighter_at(1, 300.0, PLAYER_TOP, MoveType::Stand);
        // Feet 20px above the victim's head
        let kicker = fighter_at(0, 250.0, PLAYER_TOP - FIGHTER_STAND_HEIGHT - 20.0, MoveType::ForwardJumpKick);
        assert!(required_distance(&kicker, &victim, &tuning));
        let too_high = fighter_at(0, 250.0, PLAYER_TOP - FIGHTER_STAND_HEIGHT - 40.0, MoveType::ForwardJumpKick);
        assert!(!required_distance(&too_high, &victim, &tuning));
        // A plain jump gets no tolerance
        let jumper = fighter_at(0, 250.0, PLAYER_TOP - FIGHTER_STAND_HEIGHT - 20.0, MoveType::ForwardJump);
        assert!(!required_distance(&jumper, &victim, &tuning));
    }

    /// Randomised positions over the whole arena against an independent oracle
    #[test]
    fn test_required_distance_matches_oracle() {
        let tuning = FightTuning::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let kinds = [
            MoveType::HighPunch,
            MoveType::LowKick,
            MoveType::Uppercut,
            MoveType::ForwardJumpKick,
            MoveType::BackwardJumpPunch,
            MoveType::SquatLowKick,
        ];
        for _ in 0..5000 {
            let kind = kinds[rng.gen_range(0..kinds.len())];
            let a = fighter_at(
                0,
                rng.gen_range(0.0..ARENA_WIDTH - FIGHTER_WIDTH),
                rng.gen_range(0.0..ARENA_HEIGHT - FIGHTER_STAND_HEIGHT),
                kind,
            );
            let o = fighter_at(
                1,
                rng.gen_range(0.0..ARENA_WIDTH - FIGHTER_WIDTH),
                rng.gen_range(0.0..ARENA_HEIGHT - FIGHTER_STAND_HEIGHT),
                MoveType::Stand,
            );
            let dx = ((a.x() + 50.0) - (o.x() + 50.0)).abs();
            let a_h = if kind.is_crouched() { FIGHTER_SQUAT_HEIGHT } else { FIGHTER_STAND_HEIGHT };
            let (a_top, a_bot) = (a.y(), a.y() + a_h);
            let (o_top, o_bot) = (o.y(), o.y() + FIGHTER_STAND_HEIGHT);
            let overlap = a_bot >= o_top && a_top <= o_bot;
            let relaxed = (kind.is_jump_attack() || kind == MoveType::Uppercut)
                && (a_bot - o_top).abs().min((a_top - o_bot).abs()) <= 30.0;
            let expected = dx <= 200.0 && (overlap || relaxed);
            assert_eq!(required_distance(&a, &o, &tuning), expected, "{:?} vs {:?}", (a.x(), a.y(), kind), (o.x(), o.y()));
        }
    }

    #[test]
    fn test_crouch_immunity() {
        let allowed = [
            MoveType::LowPunch,
            MoveType::LowKick,
            MoveType::SquatLowKick,
            MoveType::SquatLowPunch,
            MoveType::SquatHighKick,
        ];
        for attack in MoveType::ALL.into_iter().filter(|k| k.is_attack()) {
            assert_eq!(
                attack_compatible(attack, MoveType::Squat),
                allowed.contains(&attack),
                "{}",
                attack
            );
            assert!(attack_compatible(attack, MoveType::Stand));
        }
    }
}
