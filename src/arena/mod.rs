//! Arena module - logical playfield, round labels, countdown/timer and spatial resolution

mod spatial;

pub use spatial::derive_orientation;

use crate::constants::*;
use crate::countdown::{CountdownPhase, RoundCountdown, RoundTimer};
use crate::fighter::Fighter;
use crate::tuning::FightTuning;

/// Something the arena's clocks produced during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaSignal {
    /// Countdown entered a new phase
    Countdown(CountdownPhase),
    /// Round timer reached zero
    TimeUp,
}

/// The shared playfield.
///
/// Works purely in logical coordinates (1200 x 800); device scaling lives in
/// the presentation layer.
#[derive(Debug, Clone)]
pub struct Arena {
    width: f32,
    height: f32,
    background: u32,
    round: u32,
    wins: [u32; 2],
    countdown: RoundCountdown,
    timer: RoundTimer,
    /// Fighter driven by a peer; local collision resolution never moves it
    remote: Option<usize>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(0, &FightTuning::default())
    }
}

impl Arena {
    pub fn new(background: u32, tuning: &FightTuning) -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            background,
            round: 1,
            wins: [0, 0],
            countdown: RoundCountdown::new(
                tuning.ready_ms,
                tuning.countdown_step_ms,
                tuning.countdown_start,
            ),
            timer: RoundTimer::new(tuning.round_seconds),
            remote: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    pub fn wins(&self) -> [u32; 2] {
        self.wins
    }

    pub fn set_wins(&mut self, player1: u32, player2: u32) {
        self.wins = [player1, player2];
    }

    pub fn countdown(&self) -> &RoundCountdown {
        &self.countdown
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    pub fn remote(&self) -> Option<usize> {
        self.remote
    }

    pub fn set_remote(&mut self, remote: Option<usize>) {
        self.remote = remote;
    }

    /// Restart the countdown with a full, stopped timer
    pub fn start_round(&mut self) {
        self.countdown.start();
        self.timer.reset();
    }

    /// Stop all clocks (match torn down)
    pub fn halt(&mut self) {
        self.timer.reset();
        self.countdown.stop();
    }

    /// Advance countdown and round timer
    pub fn tick(&mut self, dt_ms: u32) -> Vec<ArenaSignal> {
        let mut signals = Vec::new();
        let timer_was_running = self.timer.is_running();
        for phase in self.countdown.tick(dt_ms) {
            if phase == CountdownPhase::Finished {
                self.timer.start();
            }
            signals.push(ArenaSignal::Countdown(phase));
        }
        if timer_was_running && self.timer.tick(dt_ms) {
            signals.push(ArenaSignal::TimeUp);
        }
        signals
    }

    /// Loser of a round decided on time: the fighter with less life. `None` on a tie.
    pub fn time_up_loser(&self, fighters: &[Fighter; 2]) -> Option<usize> {
        let (a, b) = (fighters[0].life(), fighters[1].life());
        if a < b {
            Some(0)
        } else if b < a {
            Some(1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_starts_only_after_countdown() {
        let mut arena = Arena::default();
        arena.start_round();
        let signals = arena.tick(9_999);
        assert!(!signals.contains(&ArenaSignal::Countdown(CountdownPhase::Finished)));
        assert!(!arena.timer().is_running());
        let signals = arena.tick(1);
        assert_eq!(
            signals,
            vec![ArenaSignal::Countdown(CountdownPhase::Finished)]
        );
        assert!(arena.timer().is_running());
        assert_eq!(arena.timer().remaining_secs(), ROUND_SECONDS);
    }

    #[test]
    fn test_time_up_after_round_seconds() {
        let mut arena = Arena::default();
        arena.start_round();
        arena.tick(10_000);
        let mut time_up = 0;
        for _ in 0..(ROUND_SECONDS * 10) {
            if arena.tick(100).contains(&ArenaSignal::TimeUp) {
                time_up += 1;
            }
        }
        assert_eq!(time_up, 1);
        assert_eq!(arena.timer().remaining_secs(), 0);
    }

    #[test]
    fn test_time_up_loser_by_life() {
        let arena = Arena::default();
        let mut fighters = [Fighter::new("a", 0), Fighter::new("b", 1)];
        assert_eq!(arena.time_up_loser(&fighters), None);
        fighters[1].set_life(60.0);
        assert_eq!(arena.time_up_loser(&fighters), Some(1));
        fighters[0].set_life(10.0);
        assert_eq!(arena.time_up_loser(&fighters), Some(0));
    }

    #[test]
    fn test_halt_stops_clocks() {
        let mut arena = Arena::default();
        arena.start_round();
        arena.halt();
        assert!(arena.tick(100_000).is_empty());
    }
}
