//! Round countdown and round timer
//!
//! Every round opens with a READY (or ROUND n) banner, then counts 5-4-3-2-1
//! while both fighters stay locked. The round timer only runs once the
//! countdown has finished.

use bevy::prelude::*;

use crate::constants::*;
use crate::session::GameSlot;

/// Countdown phase. Phases are only ever entered in order:
/// `Ready` -> `Counting(n)` ... `Counting(1)` -> `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Ready,
    Counting(u32),
    Finished,
}

/// Pre-round countdown state machine
#[derive(Debug, Clone)]
pub struct RoundCountdown {
    phase: CountdownPhase,
    elapsed_ms: u32,
    ready_ms: u32,
    step_ms: u32,
    start_value: u32,
}

impl Default for RoundCountdown {
    fn default() -> Self {
        Self::new(READY_DURATION_MS, COUNTDOWN_STEP_MS, COUNTDOWN_START)
    }
}

impl RoundCountdown {
    pub fn new(ready_ms: u32, step_ms: u32, start_value: u32) -> Self {
        Self {
            phase: CountdownPhase::Ready,
            elapsed_ms: 0,
            ready_ms,
            step_ms,
            start_value,
        }
    }

    /// Restart from the banner
    pub fn start(&mut self) {
        self.phase = CountdownPhase::Ready;
        self.elapsed_ms = 0;
    }

    /// Jump to `Finished` without running the remaining phases (match torn down)
    pub fn stop(&mut self) {
        self.phase = CountdownPhase::Finished;
        self.elapsed_ms = 0;
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == CountdownPhase::Finished
    }

    /// Advance by `dt_ms` and return every phase entered, in order
    pub fn tick(&mut self, dt_ms: u32) -> Vec<CountdownPhase> {
        let mut entered = Vec::new();
        if self.is_finished() {
            return entered;
        }
        self.elapsed_ms += dt_ms;
        loop {
            let needed = match self.phase {
                CountdownPhase::Ready => self.ready_ms,
                CountdownPhase::Counting(_) => self.step_ms,
                CountdownPhase::Finished => break,
            };
            if self.elapsed_ms < needed {
                break;
            }
            self.elapsed_ms -= needed;
            self.phase = match self.phase {
                CountdownPhase::Ready if self.start_value > 0 => {
                    CountdownPhase::Counting(self.start_value)
                }
                CountdownPhase::Counting(n) if n > 1 => CountdownPhase::Counting(n - 1),
                _ => CountdownPhase::Finished,
            };
            entered.push(self.phase);
        }
        if self.is_finished() {
            self.elapsed_ms = 0;
        }
        entered
    }

    /// Banner text for the current phase ("READY" opens the match, "ROUND n" later rounds)
    pub fn banner(&self, round: u32) -> Option<String> {
        match self.phase {
            CountdownPhase::Ready if round <= 1 => Some("READY".to_string()),
            CountdownPhase::Ready => Some(format!("ROUND {}", round)),
            CountdownPhase::Counting(n) => Some(n.to_string()),
            CountdownPhase::Finished => None,
        }
    }
}

/// Whole-second round timer, started when the countdown finishes
#[derive(Debug, Clone)]
pub struct RoundTimer {
    round_secs: u32,
    remaining_secs: u32,
    carry_ms: u32,
    running: bool,
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new(ROUND_SECONDS)
    }
}

impl RoundTimer {
    pub fn new(round_secs: u32) -> Self {
        Self {
            round_secs,
            remaining_secs: round_secs,
            carry_ms: 0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.remaining_secs = self.round_secs;
        self.carry_ms = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Full time, not running
    pub fn reset(&mut self) {
        self.remaining_secs = self.round_secs;
        self.carry_ms = 0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_warning(&self) -> bool {
        self.remaining_secs <= TIMER_WARNING_SECONDS
    }

    /// Returns true on the tick the timer runs out (and stops itself)
    pub fn tick(&mut self, dt_ms: u32) -> bool {
        if !self.running {
            return false;
        }
        self.carry_ms += dt_ms;
        while self.carry_ms >= 1000 && self.remaining_secs > 0 {
            self.carry_ms -= 1000;
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            self.running = false;
            return true;
        }
        false
    }
}

/// Marker for the countdown banner text entity
#[derive(Component)]
pub struct CountdownText;

/// Marker for the dim overlay behind the countdown banner
#[derive(Component)]
pub struct CountdownOverlay;

/// Update the banner from the active session's countdown
pub fn update_countdown_text(
    slot: Res<GameSlot>,
    mut text_query: Query<(&mut Text2d, &mut Visibility), With<CountdownText>>,
    mut overlay_query: Query<&mut Visibility, (With<CountdownOverlay>, Without<CountdownText>)>,
) {
    let banner = slot.get_game().and_then(|session| {
        let arena = session.controller().arena();
        arena.countdown().banner(arena.round())
    });

    for (mut text, mut visibility) in &mut text_query {
        match &banner {
            Some(label) => {
                *visibility = Visibility::Visible;
                if text.0 != *label {
                    text.0 = label.clone();
                }
            }
            None => *visibility = Visibility::Hidden,
        }
    }
    for mut visibility in &mut overlay_query {
        *visibility = if banner.is_some() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Spawn the countdown banner and overlay (called from setup)
pub fn spawn_countdown_text(commands: &mut Commands) {
    commands.spawn((
        Sprite::from_color(
            COUNTDOWN_OVERLAY_COLOR,
            Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
        ),
        Transform::from_xyz(0.0, 0.0, 90.0),
        Visibility::Visible,
        CountdownOverlay,
    ));
    commands.spawn((
        Text2d::new("READY"),
        TextFont {
            font_size: 160.0,
            ..default()
        },
        TextLayout::new_with_justify(bevy::text::Justify::Center),
        TextColor(Color::srgb(1.0, 0.8, 0.2)),
        // Center of screen, high z to render on top
        Transform::from_xyz(0.0, 0.0, 100.0),
        Visibility::Visible,
        CountdownText,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_in_order_without_skipping() {
        let mut countdown = RoundCountdown::default();
        let mut seen = vec![countdown.phase()];
        // Odd tick sizes, including one that spans several phases
        for dt in [16, 4999, 700, 2500, 33, 1800, 16, 16, 2000] {
            seen.extend(countdown.tick(dt));
        }
        assert_eq!(
            seen,
            vec![
                CountdownPhase::Ready,
                CountdownPhase::Counting(5),
                CountdownPhase::Counting(4),
                CountdownPhase::Counting(3),
                CountdownPhase::Counting(2),
                CountdownPhase::Counting(1),
                CountdownPhase::Finished,
            ]
        );
        assert!(countdown.tick(5000).is_empty());
    }

    #[test]
    fn test_finishes_after_ten_seconds() {
        let mut countdown = RoundCountdown::default();
        countdown.tick(9999);
        assert_eq!(countdown.phase(), CountdownPhase::Counting(1));
        countdown.tick(1);
        assert!(countdown.is_finished());
    }

    #[test]
    fn test_banner_text() {
        let mut countdown = RoundCountdown::default();
        assert_eq!(countdown.banner(1).as_deref(), Some("READY"));
        assert_eq!(countdown.banner(2).as_deref(), Some("ROUND 2"));
        countdown.tick(5000);
        assert_eq!(countdown.banner(2).as_deref(), Some("5"));
        countdown.tick(5000);
        assert_eq!(countdown.banner(2), None);
    }

    #[test]
    fn test_timer_counts_whole_seconds() {
        let mut timer = RoundTimer::new(3);
        assert!(!timer.tick(5000));
        timer.start();
        assert!(!timer.tick(999));
        assert_eq!(timer.remaining_secs(), 3);
        assert!(!timer.tick(1));
        assert_eq!(timer.remaining_secs(), 2);
        assert!(timer.tick(2000));
        assert!(!timer.is_running());
        assert!(!timer.tick(1000));
    }
}
