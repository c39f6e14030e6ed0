//! Running move state: frame counter, step timer and per-frame effects

use super::kind::MoveType;
use super::table::{Motion, MoveSpec, StepPolicy, spec};
use crate::constants::{JUMP_LANDING_Y, JUMP_RISE_Y};

/// What a single frame asks the owner to do. Applied in order by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEffect {
    /// Relative displacement, resolved through the arena
    Translate { dx: f32, dy: f32 },
    /// Put the feet back on the ground line
    Ground,
    /// Attack frame reached
    Impact { damage: f32 },
    /// Move completed; `then` is the follow-up posture, if any
    Finished { then: Option<MoveType> },
}

/// One move instance owned by a fighter.
///
/// Frames are driven by [`Move::advance`]: every `step_ms` of accumulated time
/// the current frame's action runs, then the frame counter moves on according
/// to the move's [`StepPolicy`].
#[derive(Debug, Clone)]
pub struct Move {
    kind: MoveType,
    spec: MoveSpec,
    current_step: u32,
    elapsed_ms: u32,
    running: bool,
    moving_back: bool,
    impact_done: bool,
}

impl Move {
    pub fn new(kind: MoveType) -> Self {
        Self {
            kind,
            spec: spec(kind),
            current_step: 0,
            elapsed_ms: 0,
            running: false,
            moving_back: false,
            impact_done: false,
        }
    }

    /// `kind` picking up where the running `arc` is: same frame, same half of the arc
    pub fn continuing(kind: MoveType, arc: &Move) -> Self {
        Self {
            current_step: arc.current_step,
            elapsed_ms: arc.elapsed_ms,
            running: arc.running,
            moving_back: arc.moving_back,
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> MoveType {
        self.kind
    }

    pub fn spec(&self) -> &MoveSpec {
        &self.spec
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Descending half of an arc
    pub fn is_moving_back(&self) -> bool {
        self.moving_back
    }

    /// Reset to frame zero and start the step timer
    pub fn start(&mut self) {
        self.current_step = 0;
        self.elapsed_ms = 0;
        self.moving_back = false;
        self.impact_done = false;
        self.running = true;
    }

    /// Halt the step timer. The move stays current (a held posture) until replaced.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
    }

    /// Advance the step timer by `dt_ms`, collecting the effects of every frame that elapsed.
    pub fn advance(&mut self, dt_ms: u32) -> Vec<StepEffect> {
        let mut effects = Vec::new();
        if !self.running {
            return effects;
        }
        self.elapsed_ms += dt_ms;
        while self.running && self.elapsed_ms >= self.spec.step_ms {
            self.elapsed_ms -= self.spec.step_ms;
            self.action(&mut effects);
            self.next_step(&mut effects);
        }
        effects
    }

    fn action(&mut self, effects: &mut Vec<StepEffect>) {
        match self.spec.motion {
            Motion::Ground => effects.push(StepEffect::Ground),
            Motion::Walk { dx } => {
                effects.push(StepEffect::Translate { dx, dy: 0.0 });
                effects.push(StepEffect::Ground);
            }
            Motion::Arc { dx } => {
                let dy = if !self.moving_back {
                    -JUMP_RISE_Y
                } else if self.current_step == 1 {
                    JUMP_LANDING_Y
                } else {
                    JUMP_RISE_Y
                };
                effects.push(StepEffect::Translate { dx, dy });
            }
        }

        if let Some(impact) = self.spec.impact
            && !self.impact_done
            && !self.moving_back
            && self.current_step == impact.step
        {
            self.impact_done = true;
            effects.push(StepEffect::Impact {
                damage: impact.damage,
            });
        }
    }

    fn next_step(&mut self, effects: &mut Vec<StepEffect>) {
        let total = self.spec.steps;
        match self.spec.policy {
            StepPolicy::Cyclic => {
                self.current_step = (self.current_step + 1) % total;
            }
            StepPolicy::Finite => {
                self.current_step += 1;
                if self.current_step >= total {
                    self.current_step = total;
                    self.finish(effects);
                }
            }
            StepPolicy::Arc => {
                if !self.moving_back {
                    self.current_step += 1;
                    if self.current_step >= total {
                        self.moving_back = true;
                        self.current_step = total - 1;
                    }
                } else {
                    self.current_step -= 1;
                    if self.current_step == 0 {
                        self.finish(effects);
                    }
                }
            }
        }
    }

    fn finish(&mut self, effects: &mut Vec<StepEffect>) {
        self.stop();
        if self.spec.policy == StepPolicy::Arc {
            effects.push(StepEffect::Ground);
        }
        effects.push(StepEffect::Finished {
            then: self.spec.then,
        });
    }
}
