//! Controller module - owns both fighters and the arena, drives the per-frame tick
//!
//! Moves report what they want through [`StepEffect`]s; the controller applies
//! them through the arena, evaluates attack legality on impact frames and
//! signals round results through its event outbox.

mod rules;

pub use rules::{attack_compatible, required_distance};

use rules::in_reach;

use bevy::log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ArenaSignal, derive_orientation};
use crate::countdown::CountdownPhase;
use crate::fighter::Fighter;
use crate::input::{PressedKeys, decide_move};
use crate::moves::{MoveType, StepEffect};
use crate::tuning::FightTuning;

/// Who drives which fighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Fighter 0 on the local devices, fighter 1 idle
    Basic,
    /// Both fighters on one machine
    Multiplayer,
    /// Fighter `local` is ours, the other one follows a peer
    Realtime { local: usize },
}

impl ControlMode {
    /// Fighter indices fed by local input devices
    pub fn local_fighters(&self) -> Vec<usize> {
        match self {
            ControlMode::Basic => vec![0],
            ControlMode::Multiplayer => vec![0, 1],
            ControlMode::Realtime { local } => vec![*local],
        }
    }

    /// Fighter driven by a peer, if any
    pub fn remote_fighter(&self) -> Option<usize> {
        match self {
            ControlMode::Realtime { local } => Some(1 - local),
            _ => None,
        }
    }
}

/// Things the host needs to react to, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    CountdownFinished,
    /// A fighter entered a new move
    MoveChanged { fighter: usize, to: MoveType },
    /// Keys held through a lock took effect once it lifted
    HeldKeysMove { fighter: usize, to: MoveType },
    /// A hit landed; `damage` is what the victim actually lost
    Attack {
        attacker: usize,
        victim: usize,
        attack: MoveType,
        damage: f32,
    },
    /// Round over. `None` is a draw on time.
    GameEnd { loser: Option<usize> },
}

pub struct Controller {
    fighters: [Fighter; 2],
    arena: Arena,
    mode: ControlMode,
    tuning: FightTuning,
    events: Vec<ControllerEvent>,
    seen_serial: [u64; 2],
    /// Last key set reported per fighter by the local devices
    held: [PressedKeys; 2],
    /// A decision was refused while locked and is still owed
    pending: [bool; 2],
    ready: bool,
    round_over: bool,
}

impl Controller {
    pub fn new(names: [String; 2], mode: ControlMode, background: u32, tuning: FightTuning) -> Self {
        let [first, second] = names;
        let fighters = [Fighter::new(first, 0), Fighter::new(second, 1)];
        let seen_serial = [fighters[0].move_serial(), fighters[1].move_serial()];
        let mut arena = Arena::new(background, &tuning);
        arena.set_remote(mode.remote_fighter());
        Self {
            fighters,
            arena,
            mode,
            tuning,
            events: Vec::new(),
            seen_serial,
            held: [PressedKeys::empty(); 2],
            pending: [false; 2],
            ready: false,
            round_over: false,
        }
    }

    /// Prepare round one: fighters at spawn, locked, countdown running
    pub fn init(&mut self) {
        self.ready = true;
        self.start_round(1, [0, 0]);
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn tuning(&self) -> &FightTuning {
        &self.tuning
    }

    /// Hot-reloaded tuning; clock durations apply from the next match
    pub fn set_tuning(&mut self, tuning: FightTuning) {
        self.tuning = tuning;
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn fighter(&self, idx: usize) -> &Fighter {
        &self.fighters[idx]
    }

    pub fn fighter_mut(&mut self, idx: usize) -> &mut Fighter {
        &mut self.fighters[idx]
    }

    pub fn opponent(&self, idx: usize) -> usize {
        1 - idx
    }

    /// Reset both fighters and restart the countdown for `round`
    pub fn start_round(&mut self, round: u32, wins: [u32; 2]) {
        for fighter in &mut self.fighters {
            fighter.reset();
            fighter.lock();
        }
        self.seen_serial = [self.fighters[0].move_serial(), self.fighters[1].move_serial()];
        self.pending = [false; 2];
        self.round_over = false;
        self.arena.set_round(round);
        self.arena.set_wins(wins[0], wins[1]);
        self.arena.start_round();
        info!("Round {} countdown started ({}-{})", round, wins[0], wins[1]);
    }

    /// Tear down the match state. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.arena.halt();
        for fighter in &mut self.fighters {
            fighter.reset();
            fighter.lock();
        }
        self.seen_serial = [self.fighters[0].move_serial(), self.fighters[1].move_serial()];
        self.held = [PressedKeys::empty(); 2];
        self.pending = [false; 2];
        self.events.clear();
        self.ready = false;
        self.round_over = false;
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance clocks and both fighters' moves by `dt_ms`
    pub fn tick(&mut self, dt_ms: u32) {
        if !self.ready {
            return;
        }

        for signal in self.arena.tick(dt_ms) {
            match signal {
                ArenaSignal::Countdown(CountdownPhase::Finished) => {
                    if !self.round_over {
                        for idx in 0..2 {
                            self.fighters[idx].unlock();
                            // Keys held through the countdown count as fresh presses
                            self.pending[idx] = true;
                            self.follow_held_keys(idx);
                        }
                    }
                    self.events.push(ControllerEvent::CountdownFinished);
                }
                ArenaSignal::Countdown(phase) => debug!("Countdown {:?}", phase),
                ArenaSignal::TimeUp => self.time_up(),
            }
        }

        // Advance both moves before applying anything, so hits landing in the
        // same frame resolve independently of each other
        let batches = [0, 1].map(|idx| {
            let fighter = &mut self.fighters[idx];
            let (serial, attack) = (fighter.move_serial(), fighter.current_move());
            (serial, attack, fighter.advance(dt_ms))
        });
        for (idx, (serial, attack, effects)) in batches.into_iter().enumerate() {
            for effect in effects {
                self.apply_effect(idx, serial, attack, effect);
            }
        }

        self.note_transitions();
    }

    /// Apply one effect of the move `idx` was running when the frame began
    fn apply_effect(&mut self, idx: usize, serial: u64, attack: MoveType, effect: StepEffect) {
        match effect {
            // Judged against the starting move, so mutual hits both land
            StepEffect::Impact { damage } => {
                self.resolve_hit(idx, attack, damage);
            }
            // Interrupted earlier this frame (hit, round end)
            _ if self.fighters[idx].move_serial() != serial => {}
            StepEffect::Translate { dx, dy } => {
                let fighter = &self.fighters[idx];
                let (x, y) = (fighter.x() + dx, fighter.y() + dy);
                self.arena.move_fighter(&mut self.fighters, idx, x, y);
            }
            StepEffect::Ground => {
                let fighter = &self.fighters[idx];
                let (x, y) = (fighter.x(), fighter.ground_y());
                self.arena.move_fighter(&mut self.fighters, idx, x, y);
            }
            StepEffect::Finished { then } => {
                self.fighters[idx].complete_move(then);
                self.follow_held_keys(idx);
            }
        }
    }

    /// Re-decide a local fighter's move from the keys still held once it is free again.
    ///
    /// A refused decision is replayed with every held key. Otherwise only the
    /// sustained stance keys count, so attacks and jumps fire once per press.
    fn follow_held_keys(&mut self, idx: usize) {
        if !self.mode.local_fighters().contains(&idx) || self.fighters[idx].is_locked() {
            return;
        }
        let keys = if std::mem::take(&mut self.pending[idx]) {
            self.held[idx]
        } else {
            self.held[idx].postures()
        };
        let fighter = &self.fighters[idx];
        let Some(next) = decide_move(keys, fighter.orientation(), fighter.current_move()) else {
            return;
        };
        let serial = self.fighters[idx].move_serial();
        if self.fighters[idx].set_move(next) && self.fighters[idx].move_serial() != serial {
            debug!("{} follows held keys into {}", self.fighters[idx].name(), next);
            self.events.push(ControllerEvent::HeldKeysMove { fighter: idx, to: next });
        }
    }

    /// Record moves entered since the last check
    fn note_transitions(&mut self) {
        for idx in 0..2 {
            let serial = self.fighters[idx].move_serial();
            if serial != self.seen_serial[idx] {
                self.seen_serial[idx] = serial;
                self.events.push(ControllerEvent::MoveChanged {
                    fighter: idx,
                    to: self.fighters[idx].current_move(),
                });
            }
        }
    }

    /// Impact frame of `attacker`'s current move. Returns the damage dealt, if the hit was legal.
    pub fn fighter_attacked(&mut self, attacker: usize, damage: f32) -> Option<f32> {
        let attack = self.fighters[attacker].current_move();
        self.resolve_hit(attacker, attack, damage)
    }

    fn resolve_hit(&mut self, attacker: usize, attack: MoveType, damage: f32) -> Option<f32> {
        if self.round_over {
            return None;
        }
        let victim = self.opponent(attacker);
        if !in_reach(&self.fighters[attacker], attack, &self.fighters[victim], &self.tuning) {
            debug!("{} {} out of range", self.fighters[attacker].name(), attack);
            return None;
        }
        if !attack_compatible(attack, self.fighters[victim].current_move()) {
            debug!(
                "{} {} cannot hit {}",
                self.fighters[attacker].name(),
                attack,
                self.fighters[victim].current_move()
            );
            return None;
        }

        let report = self.fighters[victim].endure_attack(damage, attack, self.tuning.block_damage);
        info!(
            "{} hits {} with {} for {:.1} (life {:.1})",
            self.fighters[attacker].name(),
            self.fighters[victim].name(),
            attack,
            report.dealt,
            self.fighters[victim].life()
        );
        self.events.push(ControllerEvent::Attack {
            attacker,
            victim,
            attack,
            damage: report.dealt,
        });
        if report.died {
            self.fighter_dead(victim);
        }
        Some(report.dealt)
    }

    /// Fighter `loser` ran out of life: end the round immediately
    pub fn fighter_dead(&mut self, loser: usize) {
        if self.round_over {
            return;
        }
        let winner = self.opponent(loser);
        self.finish_round(Some(loser));
        info!("{} defeats {}", self.fighters[winner].name(), self.fighters[loser].name());
    }

    fn time_up(&mut self) {
        if self.round_over {
            return;
        }
        let loser = self.arena.time_up_loser(&self.fighters);
        match loser {
            Some(l) => info!("Time up: {} loses on life", self.fighters[l].name()),
            None => info!("Time up with equal life: round drawn"),
        }
        self.finish_round(loser);
    }

    /// End the running round with a known result (peer already decided it). No-op once over.
    pub fn end_round(&mut self, loser: Option<usize>) {
        if !self.round_over {
            self.finish_round(loser);
        }
    }

    fn finish_round(&mut self, loser: Option<usize>) {
        self.round_over = true;
        self.arena.stop_timer();
        for fighter in &mut self.fighters {
            fighter.lock();
        }
        if let Some(loser) = loser {
            let winner = self.opponent(loser);
            if self.fighters[loser].current_move() != MoveType::Fall {
                self.fighters[loser].set_move(MoveType::Fall);
            }
            self.fighters[winner].set_move(MoveType::Win);
        } else {
            for fighter in &mut self.fighters {
                fighter.force_move(MoveType::Stand);
            }
        }
        self.events.push(ControllerEvent::GameEnd { loser });
    }

    /// Feed a local key change for fighter `idx`. Returns the move entered, if any.
    ///
    /// The keys are remembered: a change refused while the fighter is locked
    /// is applied as soon as the lock lifts.
    pub fn handle_input(&mut self, idx: usize, pressed: PressedKeys) -> Option<MoveType> {
        self.held[idx] = pressed;
        let fighter = &self.fighters[idx];
        let decided = decide_move(pressed, fighter.orientation(), fighter.current_move())?;
        let accepted = self.fighters[idx].set_move(decided);
        self.pending[idx] = !accepted;
        self.note_transitions();
        accepted.then_some(decided)
    }

    /// Peer reported a move for fighter `idx`. The peer already decided it, so locks don't apply.
    pub fn apply_remote_move(&mut self, idx: usize, kind: MoveType) {
        self.fighters[idx].force_move(kind);
        self.note_transitions();
    }

    /// Peer reported a position for fighter `idx`; taken verbatim
    pub fn apply_remote_position(&mut self, idx: usize, x: f32, y: f32) {
        self.fighters[idx].set_x(x);
        self.fighters[idx].set_y(y);
        derive_orientation(&mut self.fighters);
    }

    /// Peer reported life for fighter `idx`
    pub fn apply_remote_life(&mut self, idx: usize, life: f32) {
        if self.fighters[idx].set_life(life) {
            self.fighter_dead(idx);
        }
        self.note_transitions();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::input::FightKey;

    fn controller(mode: ControlMode) -> Controller {
        let mut c = Controller::new(
            ["subzero".to_string(), "kano".to_string()],
            mode,
            0,
            FightTuning::default(),
        );
        c.init();
        c
    }

    fn run(c: &mut Controller, total_ms: u32, dt: u32) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        let mut elapsed = 0;
        while elapsed < total_ms {
            c.tick(dt);
            events.extend(c.drain_events());
            elapsed += dt;
        }
        events
    }

    fn past_countdown(mode: ControlMode) -> Controller {
        let mut c = controller(mode);
        run(&mut c, 10_000, 100);
        c
    }

    fn keys(list: &[FightKey]) -> PressedKeys {
        list.iter().copied().collect()
    }

    #[test]
    fn test_locked_through_countdown_then_unlocked() {
        let mut c = controller(ControlMode::Basic);
        let mut unlocked_at = None;
        for step in 0..120u32 {
            c.tick(100);
            let events = c.drain_events();
            if events.contains(&ControllerEvent::CountdownFinished) {
                unlocked_at = Some(step);
            }
            let locked = c.fighter(0).is_locked() && c.fighter(1).is_locked();
            match unlocked_at {
                None => assert!(locked, "unlocked early at step {}", step),
                Some(_) => assert!(!c.fighter(0).is_locked() && !c.fighter(1).is_locked()),
            }
        }
        assert_eq!(unlocked_at, Some(99));
    }

    #[test]
    fn test_input_refused_during_countdown() {
        let mut c = controller(ControlMode::Basic);
        assert_eq!(c.handle_input(0, keys(&[FightKey::Right])), None);
        assert_eq!(c.fighter(0).current_move(), MoveType::Stand);
    }

    #[test]
    fn test_walk_pushes_opponent_to_the_wall() {
        let mut c = past_countdown(ControlMode::Basic);
        assert_eq!(c.handle_input(0, keys(&[FightKey::Right])), Some(MoveType::Walk));
        run(&mut c, 8_000, 16);
        let (f1, f2) = (c.fighter(0), c.fighter(1));
        assert_eq!(f2.x(), ARENA_WIDTH - FIGHTER_WIDTH);
        assert_eq!(f1.x(), ARENA_WIDTH - 2.0 * FIGHTER_WIDTH);
        assert!(f1.x() + f1.width() <= f2.x());
    }

    #[test]
    fn test_walk_halts_at_remote_opponent() {
        let mut c = past_countdown(ControlMode::Realtime { local: 0 });
        c.handle_input(0, keys(&[FightKey::Right]));
        run(&mut c, 8_000, 16);
        assert_eq!(c.fighter(1).x(), 940.0);
        assert_eq!(c.fighter(0).x(), 940.0 - FIGHTER_WIDTH);
    }

    #[test]
    fn test_time_up_lower_life_loses() {
        let mut c = past_countdown(ControlMode::Basic);
        c.fighter_mut(1).set_life(60.0);
        let events = run(&mut c, (ROUND_SECONDS + 1) * 1000, 100);
        assert!(events.contains(&ControllerEvent::GameEnd { loser: Some(1) }));
        assert_eq!(c.fighter(1).current_move(), MoveType::Fall);
        assert_eq!(c.fighter(0).current_move(), MoveType::Win);
        assert!(c.fighter(0).is_locked() && c.fighter(1).is_locked());
    }

    #[test]
    fn test_time_up_tie_is_a_draw() {
        let mut c = past_countdown(ControlMode::Basic);
        let events = run(&mut c, (ROUND_SECONDS + 1) * 1000, 100);
        let ends: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ControllerEvent::GameEnd { .. }))
            .collect();
        assert_eq!(ends, vec![&ControllerEvent::GameEnd { loser: None }]);
        assert!(c.is_round_over());
    }

    #[test]
    fn test_crouched_victim_ignores_high_punch() {
        let mut c = past_countdown(ControlMode::Multiplayer);
        c.fighter_mut(1).set_x(220.0);
        c.handle_input(0, keys(&[FightKey::Down]));
        run(&mut c, 200, 20);
        assert_eq!(c.fighter(0).current_move(), MoveType::Squat);

        assert_eq!(c.handle_input(1, keys(&[FightKey::HighPunch])), Some(MoveType::HighPunch));
        run(&mut c, 400, 20);
        assert_eq!(c.fighter(0).life(), MAX_LIFE);

        c.handle_input(1, PressedKeys::empty());
        c.handle_input(1, keys(&[FightKey::LowPunch]));
        let events = run(&mut c, 400, 20);
        assert_eq!(c.fighter(0).life(), MAX_LIFE - 5.0);
        assert!(events.iter().any(|e| matches!(
            e,
            ControllerEvent::Attack { attacker: 1, victim: 0, attack: MoveType::LowPunch, .. }
        )));
    }

    #[test]
    fn test_fighter_attacked_needs_reach() {
        let mut c = past_countdown(ControlMode::Multiplayer);
        assert_eq!(c.fighter_attacked(0, 10.0), None);
        assert_eq!(c.fighter(1).life(), MAX_LIFE);

        c.fighter_mut(1).set_x(220.0);
        assert_eq!(c.fighter_attacked(0, 10.0), Some(10.0));
        assert_eq!(c.fighter(1).current_move(), MoveType::Endure);

        c.fighter_mut(1).set_life(5.0);
        assert_eq!(c.fighter_attacked(0, 10.0), Some(5.0));
        assert!(c.fighter(1).is_dead());
        assert!(c.is_round_over());
        assert!(c.drain_events().contains(&ControllerEvent::GameEnd { loser: Some(1) }));
    }

    #[test]
    fn test_mutual_hits_both_land() {
        let mut c = past_countdown(ControlMode::Multiplayer);
        c.fighter_mut(0).set_x(400.0);
        c.fighter_mut(1).set_x(520.0);
        c.handle_input(0, keys(&[FightKey::HighPunch]));
        c.handle_input(1, keys(&[FightKey::HighPunch]));
        run(&mut c, 300, 10);
        assert_eq!(c.fighter(0).life(), MAX_LIFE - 5.0);
        assert_eq!(c.fighter(1).life(), MAX_LIFE - 5.0);
    }

    #[test]
    fn test_knockout_ends_round_once() {
        let mut c = past_countdown(ControlMode::Multiplayer);
        c.fighter_mut(0).set_x(400.0);
        c.fighter_mut(1).set_x(520.0);
        c.fighter_mut(1).set_life(8.0);
        c.handle_input(0, keys(&[FightKey::HighKick]));
        let events = run(&mut c, 2_000, 10);
        let ends = events
            .iter()
            .filter(|e| matches!(e, ControllerEvent::GameEnd { .. }))
            .count();
        assert_eq!(ends, 1);
        assert!(events.contains(&ControllerEvent::GameEnd { loser: Some(1) }));
        assert_eq!(c.fighter(1).life(), 0.0);
        assert_eq!(c.fighter(1).current_move(), MoveType::Fall);
        assert_eq!(c.fighter(0).current_move(), MoveType::Win);
        assert!(!c.arena().timer().is_running());
    }

    #[test]
    fn test_remote_life_can_end_round() {
        let mut c = past_countdown(ControlMode::Realtime { local: 0 });
        c.apply_remote_life(1, 0.0);
        assert!(c.is_round_over());
        assert_eq!(
            c.drain_events().last(),
            Some(&ControllerEvent::MoveChanged { fighter: 1, to: MoveType::Fall })
        );
    }

    #[test]
    fn test_draw_on_time_stops_both_fighters() {
        let mut c = past_countdown(ControlMode::Basic);
        c.handle_input(0, keys(&[FightKey::Right]));
        let mut events = Vec::new();
        for _ in 0..=ROUND_SECONDS {
            // Keep the walker clear of the opponent so it is still walking at time up
            c.fighter_mut(0).set_x(100.0);
            events.extend(run(&mut c, 1000, 100));
        }
        assert!(events.contains(&ControllerEvent::GameEnd { loser: None }));
        assert_eq!(c.fighter(0).current_move(), MoveType::Stand);
        assert_eq!(c.fighter(1).current_move(), MoveType::Stand);

        let x = c.fighter(0).x();
        run(&mut c, 2_000, 16);
        assert_eq!(c.fighter(0).x(), x);
        assert!(c.fighter(0).is_locked());
    }

    #[test]
    fn test_no_hits_after_round_over() {
        let mut c = past_countdown(ControlMode::Multiplayer);
        c.fighter_mut(1).set_x(220.0);
        c.end_round(None);
        assert_eq!(c.fighter_attacked(0, 10.0), None);
        assert_eq!(c.fighter(1).life(), MAX_LIFE);
    }

    #[test]
    fn test_quick_crouch_tap_stands_back_up() {
        let mut c = past_countdown(ControlMode::Basic);
        assert_eq!(c.handle_input(0, keys(&[FightKey::Down])), Some(MoveType::Squat));
        run(&mut c, 40, 40);
        // Released while the squat still holds its lock
        assert_eq!(c.handle_input(0, PressedKeys::empty()), None);
        run(&mut c, 5_000, 16);
        assert_eq!(c.fighter(0).current_move(), MoveType::Stand);
        assert_eq!(c.fighter(0).height(), FIGHTER_STAND_HEIGHT);
    }

    #[test]
    fn test_direction_pressed_during_attack_walks_after_it() {
        let mut c = past_countdown(ControlMode::Basic);
        assert_eq!(c.handle_input(0, keys(&[FightKey::HighPunch])), Some(MoveType::HighPunch));
        assert_eq!(c.handle_input(0, keys(&[FightKey::HighPunch, FightKey::Right])), None);
        let events = run(&mut c, 400, 16);
        assert_eq!(c.fighter(0).current_move(), MoveType::Walk);
        assert!(events.contains(&ControllerEvent::HeldKeysMove { fighter: 0, to: MoveType::Walk }));
    }

    #[test]
    fn test_held_attack_fires_once() {
        let mut c = past_countdown(ControlMode::Basic);
        c.handle_input(0, keys(&[FightKey::HighPunch]));
        let events = run(&mut c, 2_000, 16);
        let punches = events
            .iter()
            .filter(|e| matches!(e, ControllerEvent::MoveChanged { to: MoveType::HighPunch, .. }))
            .count();
        assert_eq!(punches, 1);
        assert_eq!(c.fighter(0).current_move(), MoveType::Stand);
    }

    #[test]
    fn test_keys_held_through_countdown_apply_at_the_bell() {
        let mut c = controller(ControlMode::Basic);
        assert_eq!(c.handle_input(0, keys(&[FightKey::Right])), None);
        run(&mut c, 10_000, 100);
        assert_eq!(c.fighter(0).current_move(), MoveType::Walk);
    }

    #[test]
    fn test_remote_move_replaces_a_locked_move() {
        let mut c = past_countdown(ControlMode::Realtime { local: 0 });
        c.apply_remote_move(1, MoveType::HighPunch);
        run(&mut c, 100, 20);
        assert!(c.fighter(1).is_locked());
        c.apply_remote_move(1, MoveType::Walk);
        assert_eq!(c.fighter(1).current_move(), MoveType::Walk);
    }

    #[test]
    fn test_forward_jump_passes_over_standing_opponent() {
        let mut c = past_countdown(ControlMode::Basic);
        c.fighter_mut(0).set_x(420.0);
        c.fighter_mut(1).set_x(600.0);
        assert_eq!(
            c.handle_input(0, keys(&[FightKey::Right, FightKey::Up])),
            Some(MoveType::ForwardJump)
        );
        c.handle_input(0, PressedKeys::empty());
        run(&mut c, 1_000, 16);

        let (jumper, standing) = (c.fighter(0), c.fighter(1));
        assert_eq!(jumper.current_move(), MoveType::Stand);
        assert_eq!(jumper.y(), PLAYER_TOP);
        assert!(jumper.x() >= standing.x() + standing.width());
        assert_eq!(jumper.orientation(), crate::fighter::Orientation::Right);
    }

    #[test]
    fn test_attack_button_mid_jump_becomes_jump_kick() {
        let mut c = past_countdown(ControlMode::Basic);
        c.handle_input(0, keys(&[FightKey::Right, FightKey::Up]));
        run(&mut c, 120, 20);
        assert_eq!(
            c.handle_input(0, keys(&[FightKey::HighKick])),
            Some(MoveType::ForwardJumpKick)
        );
        assert!(c.fighter(0).is_jumping());
        run(&mut c, 1_000, 20);
        assert_eq!(c.fighter(0).y(), PLAYER_TOP);
    }

    #[test]
    fn test_remote_move_and_position_applied_verbatim() {
        let mut c = past_countdown(ControlMode::Realtime { local: 0 });
        c.apply_remote_move(1, MoveType::Walk);
        assert_eq!(c.fighter(1).current_move(), MoveType::Walk);
        c.apply_remote_position(1, 50.0, PLAYER_TOP);
        assert_eq!(c.fighter(1).x(), 50.0);
        assert_eq!(c.fighter(1).orientation(), crate::fighter::Orientation::Left);
        assert_eq!(c.fighter(0).orientation(), crate::fighter::Orientation::Right);
    }

    #[test]
    fn test_jump_lands_back_on_ground() {
        let mut c = past_countdown(ControlMode::Basic);
        c.handle_input(0, keys(&[FightKey::Up]));
        assert!(c.fighter(0).is_jumping());
        run(&mut c, 1_000, 16);
        assert_eq!(c.fighter(0).y(), PLAYER_TOP);
        assert_eq!(c.fighter(0).current_move(), MoveType::Stand);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut c = past_countdown(ControlMode::Basic);
        c.reset();
        c.reset();
        assert!(!c.is_ready());
        c.tick(100_000);
        assert!(c.drain_events().is_empty());
    }
}
