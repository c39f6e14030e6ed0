//! Fighter module - fighter state, move transitions and damage intake

mod components;

pub use components::{FighterNameText, FighterSprite, PlaceholderSprite};

use bevy::log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::moves::{Move, MoveType, StepEffect};

/// Which side of the arena a fighter stands on (and therefore faces away from)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Left,
    Right,
}

impl Orientation {
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Orientation::Left
        } else {
            Orientation::Right
        }
    }
}

/// Result of [`Fighter::endure_attack`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Life actually removed after block mitigation and clamping
    pub dealt: f32,
    /// Life reached zero on this hit (reported once per round)
    pub died: bool,
}

/// One of the two fighters.
///
/// Position is the top-left corner of the bounding box in arena space. The
/// fighter never clamps its own position; the arena does that before calling
/// [`Fighter::set_x`]/[`Fighter::set_y`].
#[derive(Debug, Clone)]
pub struct Fighter {
    name: String,
    index: usize,
    orientation: Orientation,
    x: f32,
    y: f32,
    life: f32,
    /// Round-level lock (countdown, round over)
    locked: bool,
    /// Lock held by the running move
    move_locked: bool,
    current: Move,
    /// Bumped on every move start, so stale effects can be recognised
    move_serial: u64,
    dead_signaled: bool,
}

impl Fighter {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        let mut fighter = Self {
            name: name.into(),
            index,
            orientation: Orientation::for_index(index),
            x: FIGHTER_SPAWN_X[index.min(1)],
            y: PLAYER_TOP,
            life: MAX_LIFE,
            locked: false,
            move_locked: false,
            current: Move::new(MoveType::Stand),
            move_serial: 0,
            dead_signaled: false,
        };
        fighter.current.start();
        fighter
    }

    /// Back to spawn: full life, standing, unlocked
    pub fn reset(&mut self) {
        self.orientation = Orientation::for_index(self.index);
        self.x = FIGHTER_SPAWN_X[self.index.min(1)];
        self.y = PLAYER_TOP;
        self.life = MAX_LIFE;
        self.locked = false;
        self.dead_signaled = false;
        self.start_move(MoveType::Stand);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Overwrite life (peer heartbeat). Returns true when this drops it to zero for the first time.
    pub fn set_life(&mut self, life: f32) -> bool {
        self.life = life.clamp(0.0, MAX_LIFE);
        if self.life <= 0.0 && !self.dead_signaled {
            self.dead_signaled = true;
            self.start_move(MoveType::Fall);
            return true;
        }
        false
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    pub fn width(&self) -> f32 {
        FIGHTER_WIDTH
    }

    pub fn height(&self) -> f32 {
        if self.current.kind().is_crouched() {
            FIGHTER_SQUAT_HEIGHT
        } else {
            FIGHTER_STAND_HEIGHT
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height()
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width() / 2.0
    }

    /// Top coordinate that puts the feet on the ground line in the current posture
    pub fn ground_y(&self) -> f32 {
        GROUND_Y - self.height()
    }

    pub fn is_jumping(&self) -> bool {
        self.current.kind().is_jump() && self.current.is_running()
    }

    pub fn current_move(&self) -> MoveType {
        self.current.kind()
    }

    pub fn current(&self) -> &Move {
        &self.current
    }

    pub fn move_serial(&self) -> u64 {
        self.move_serial
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked || self.move_locked
    }

    /// Request a transition to `kind`.
    ///
    /// Returns false when the fighter is locked and `kind` is not a forced
    /// transition. Re-requesting the current non-attack posture leaves it
    /// running untouched; attacks always restart from frame zero.
    pub fn set_move(&mut self, kind: MoveType) -> bool {
        if !self.locked && self.current.is_running() && kind.continues_arc(self.current.kind()) {
            self.current = Move::continuing(kind, &self.current);
            self.move_serial += 1;
            return true;
        }
        if self.is_locked() && !kind.bypasses_lock() {
            debug!(
                "{} locked in {}, ignoring {}",
                self.name,
                self.current.kind(),
                kind
            );
            return false;
        }
        if kind == self.current.kind() && !kind.is_attack() {
            return true;
        }
        self.start_move(kind);
        true
    }

    /// Enter `kind` regardless of either lock. Used for moves decided elsewhere
    /// (a peer, the end of a round); the same non-attack posture keeps running.
    pub fn force_move(&mut self, kind: MoveType) {
        if kind == self.current.kind() && !kind.is_attack() {
            return;
        }
        self.start_move(kind);
    }

    fn start_move(&mut self, kind: MoveType) {
        self.current.stop();
        self.move_locked = false;
        self.current = Move::new(kind);
        self.current.start();
        self.move_serial += 1;
        self.move_locked = self.current.spec().locks;
    }

    /// Advance the running move's step timer
    pub fn advance(&mut self, dt_ms: u32) -> Vec<StepEffect> {
        self.current.advance(dt_ms)
    }

    /// The running move finished: release its lock and start the follow-up, if any.
    /// Follow-ups are part of the finished move and ignore the round lock.
    pub fn complete_move(&mut self, then: Option<MoveType>) {
        self.move_locked = false;
        if let Some(next) = then {
            self.start_move(next);
        }
    }

    /// Take a hit. Blocking reduces damage and skips the hit reaction.
    pub fn endure_attack(&mut self, damage: f32, attack: MoveType, block_factor: f32) -> HitReport {
        let blocking = self.current.kind() == MoveType::Block;
        let incoming = if blocking { damage * block_factor } else { damage };
        let before = self.life;
        self.life = (self.life - incoming).clamp(0.0, MAX_LIFE);
        let dealt = before - self.life;

        if self.dead_signaled {
            return HitReport { dealt, died: false };
        }
        if self.life <= 0.0 {
            self.dead_signaled = true;
            self.start_move(MoveType::Fall);
            return HitReport { dealt, died: true };
        }
        if !blocking {
            let reaction = if attack == MoveType::Uppercut {
                MoveType::KnockDown
            } else if self.current.kind().is_crouched() {
                MoveType::SquatEndure
            } else {
                MoveType::Endure
            };
            self.start_move(reaction);
        }
        HitReport { dealt, died: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn settle(fighter: &mut Fighter, ms: u32) {
        for effect in fighter.advance(ms) {
            if let StepEffect::Finished { then } = effect {
                fighter.complete_move(then);
            }
        }
    }

    #[test]
    fn test_spawn_orientation_by_index() {
        let left = Fighter::new("subzero", 0);
        let right = Fighter::new("kano", 1);
        assert_eq!(left.orientation(), Orientation::Left);
        assert_eq!(right.orientation(), Orientation::Right);
        assert_eq!(left.x(), 100.0);
        assert_eq!(right.x(), 940.0);
        assert_eq!(left.y(), PLAYER_TOP);
        assert_eq!(left.current_move(), MoveType::Stand);
    }

    #[test]
    fn test_locked_fighter_ignores_input_moves() {
        let mut f = Fighter::new("subzero", 0);
        f.lock();
        assert!(!f.set_move(MoveType::Walk));
        assert_eq!(f.current_move(), MoveType::Stand);
        // Forced transitions still go through
        assert!(f.set_move(MoveType::Win));
        assert_eq!(f.current_move(), MoveType::Win);
    }

    #[test]
    fn test_attack_locks_until_it_finishes() {
        let mut f = Fighter::new("subzero", 0);
        assert!(f.set_move(MoveType::HighKick));
        assert!(f.is_locked());
        assert!(!f.set_move(MoveType::Walk));
        settle(&mut f, 7 * 50);
        assert!(!f.is_locked());
        assert_eq!(f.current_move(), MoveType::Stand);
    }

    #[test]
    fn test_force_move_ignores_both_locks() {
        let mut f = Fighter::new("subzero", 0);
        f.set_move(MoveType::HighPunch);
        settle(&mut f, 100);
        assert!(f.is_locked());
        f.force_move(MoveType::Walk);
        assert_eq!(f.current_move(), MoveType::Walk);
        assert!(!f.is_locked());

        f.lock();
        f.force_move(MoveType::Stand);
        assert_eq!(f.current_move(), MoveType::Stand);
        let serial = f.move_serial();
        f.force_move(MoveType::Stand);
        assert_eq!(f.move_serial(), serial);
    }

    #[test]
    fn test_jump_attack_continues_the_running_jump() {
        let mut f = Fighter::new("subzero", 0);
        assert!(f.set_move(MoveType::ForwardJump));
        settle(&mut f, 2 * 60);
        assert!(f.set_move(MoveType::ForwardJumpKick));
        assert_eq!(f.current_move(), MoveType::ForwardJumpKick);
        assert_eq!(f.current().current_step(), 2);
        // Grounded attacks still wait for the landing
        assert!(!f.set_move(MoveType::HighKick));
        settle(&mut f, 9 * 60);
        assert_eq!(f.current_move(), MoveType::Stand);
    }

    #[test]
    fn test_same_movement_does_not_restart() {
        let mut f = Fighter::new("subzero", 0);
        f.set_move(MoveType::Walk);
        let _ = f.advance(150);
        let step = f.current().current_step();
        assert!(f.set_move(MoveType::Walk));
        assert_eq!(f.current().current_step(), step);
    }

    #[test]
    fn test_squat_holds_and_unlocks() {
        let mut f = Fighter::new("subzero", 0);
        f.set_move(MoveType::Squat);
        assert!(f.is_locked());
        settle(&mut f, 120);
        assert!(!f.is_locked());
        assert_eq!(f.current_move(), MoveType::Squat);
        assert_eq!(f.height(), FIGHTER_SQUAT_HEIGHT);
        assert!(f.set_move(MoveType::SquatLowKick));
    }

    #[test]
    fn test_block_reduces_damage_without_reaction() {
        let mut f = Fighter::new("kano", 1);
        f.set_move(MoveType::Block);
        let hit = f.endure_attack(10.0, MoveType::HighKick, BLOCK_DAMAGE);
        assert!((hit.dealt - 2.0).abs() < 1e-4);
        assert_eq!(f.current_move(), MoveType::Block);
        assert!((f.life() - 98.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_reactions() {
        let mut standing = Fighter::new("kano", 1);
        standing.endure_attack(5.0, MoveType::HighPunch, BLOCK_DAMAGE);
        assert_eq!(standing.current_move(), MoveType::Endure);

        let mut crouched = Fighter::new("kano", 1);
        crouched.set_move(MoveType::Squat);
        crouched.endure_attack(4.0, MoveType::SquatLowKick, BLOCK_DAMAGE);
        assert_eq!(crouched.current_move(), MoveType::SquatEndure);

        let mut launched = Fighter::new("kano", 1);
        launched.endure_attack(13.0, MoveType::Uppercut, BLOCK_DAMAGE);
        assert_eq!(launched.current_move(), MoveType::KnockDown);
    }

    #[test]
    fn test_life_clamped_and_death_signaled_once() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut f = Fighter::new("kano", 1);
            let mut deaths = 0;
            for _ in 0..60 {
                let damage = rng.gen_range(0.0..40.0);
                let attack = MoveType::ALL[rng.gen_range(0..MoveType::ALL.len())];
                if rng.gen_bool(0.2) {
                    f.set_move(MoveType::Block);
                }
                let report = f.endure_attack(damage, attack, BLOCK_DAMAGE);
                assert!(f.life() >= 0.0 && f.life() <= MAX_LIFE);
                assert!(report.dealt >= 0.0);
                if report.died {
                    deaths += 1;
                }
            }
            assert!(deaths <= 1);
            if f.life() <= 0.0 {
                assert_eq!(deaths, 1);
                assert_eq!(f.current_move(), MoveType::Fall);
            }
        }
    }

    #[test]
    fn test_reset_restores_spawn() {
        let mut f = Fighter::new("subzero", 0);
        f.set_x(700.0);
        f.endure_attack(200.0, MoveType::HighKick, BLOCK_DAMAGE);
        f.lock();
        f.reset();
        assert_eq!(f.x(), 100.0);
        assert_eq!(f.life(), MAX_LIFE);
        assert!(!f.is_locked());
        assert_eq!(f.current_move(), MoveType::Stand);
    }
}
