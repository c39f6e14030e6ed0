//! Scenario execution engine
//!
//! Each scenario runs in its own headless Bevy app. Every `app.update()` is one
//! frame: scripted keys go to the session, the session advances by the
//! scenario's fixed frame time, and new events are captured.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::session::{self, GameSlot, Session, StartOptions};

use super::assertions::{AssertionError, CapturedEvent, check_absent, check_sequence, check_state};
use super::input::ScriptedInputs;
use super::parser::{TestDefinition, TestSetup, fighter_index};

/// Result of running a scenario
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Frames beyond this are never run, whatever the script says
const MAX_FRAMES: u64 = 100_000;

/// Resource to track scenario progress
#[derive(Resource)]
struct TestControl {
    should_exit: bool,
    frame_ms: u32,
    current_frame: u64,
}

/// Resource to capture events during a scenario
#[derive(Resource, Default)]
struct EventCapture {
    events: Vec<CapturedEvent>,
}

/// Build the session and bring it to frame 0
fn prepare_session(setup: &TestSetup) -> Result<Session, String> {
    if setup.game_type.is_networked() {
        return Err(format!("{} scenarios are not supported", setup.game_type));
    }
    if setup.frame_ms == 0 {
        return Err("frame_ms must be positive".to_string());
    }
    let options = StartOptions {
        arena: setup.arena,
        fighters: setup.fighters.clone(),
        game_type: setup.game_type,
        tuning: setup.tuning,
        ..Default::default()
    };
    let mut session = session::start(options, None).map_err(|e| e.to_string())?;

    if setup.skip_countdown {
        let mut guard = 0;
        while !session.controller().arena().countdown().is_finished() {
            session.tick(setup.frame_ms);
            guard += 1;
            if guard > MAX_FRAMES {
                return Err("countdown never finished".to_string());
            }
        }
        // Countdown events are not part of the script
        session.events_mut().drain();
    }

    for def in &setup.fighter_overrides {
        let idx = fighter_index(&def.id).ok_or_else(|| format!("Unknown fighter '{}'", def.id))?;
        let controller = session.controller_mut();
        if let Some(posture) = def.posture
            && !controller.fighter_mut(idx).set_move(posture)
        {
            return Err(format!("{} cannot start in {}", def.id, posture));
        }
        let fighter = controller.fighter_mut(idx);
        if let Some(x) = def.x {
            fighter.set_x(x);
        }
        if let Some(y) = def.y {
            fighter.set_y(y);
        } else if def.posture.is_some() {
            let ground = fighter.ground_y();
            fighter.set_y(ground);
        }
        if let Some(life) = def.life {
            fighter.set_life(life);
        }
    }
    Ok(session)
}

/// Run a single scenario and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let session = match prepare_session(&test.setup) {
        Ok(session) => session,
        Err(message) => return TestResult::Error { message },
    };

    let mut scripted_inputs = match ScriptedInputs::from_inputs(&test.input) {
        Ok(inputs) => inputs,
        Err(message) => return TestResult::Error { message },
    };
    for state in &test.expect.state {
        scripted_inputs.set_max_frame(state.after_frame);
    }
    if scripted_inputs.max_frame == 0 {
        scripted_inputs.max_frame = 60;
    }
    if scripted_inputs.max_frame > MAX_FRAMES {
        return TestResult::Error {
            message: format!("Scenario runs past {} frames", MAX_FRAMES),
        };
    }

    // Create minimal Bevy app
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(
            test.setup.frame_ms as u64,
        ))),
    );

    app.insert_resource(GameSlot::new(session));
    app.insert_resource(scripted_inputs);
    app.insert_resource(TestControl {
        should_exit: false,
        frame_ms: test.setup.frame_ms,
        current_frame: 0,
    });
    app.init_resource::<EventCapture>();

    app.add_systems(
        Update,
        (input_injection, step_session, event_capture, test_end_check).chain(),
    );

    // State checks, sorted by frame
    let mut state_assertions = test.expect.state.clone();
    state_assertions.sort_by_key(|a| a.after_frame);
    let mut next_state_check = 0;

    loop {
        app.update();

        let current_frame = app.world().resource::<TestControl>().current_frame;
        while next_state_check < state_assertions.len()
            && current_frame > state_assertions[next_state_check].after_frame
        {
            let assertion = &state_assertions[next_state_check];
            let result = match app.world().resource::<GameSlot>().get_game() {
                Some(session) => check_state(assertion, session),
                None => {
                    return TestResult::Error {
                        message: "session disappeared".to_string(),
                    };
                }
            };
            if let Err(error) = result {
                return TestResult::Fail { error };
            }
            next_state_check += 1;
        }

        if app.world().resource::<TestControl>().should_exit {
            break;
        }
    }

    let world = app.world();
    let final_frame = world.resource::<TestControl>().current_frame;
    let captured_events = &world.resource::<EventCapture>().events;

    if let Err(error) = check_sequence(&test.expect.sequence, captured_events) {
        return TestResult::Fail { error };
    }
    if let Err(error) = check_absent(&test.expect.absent, captured_events) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: final_frame,
    }
}

/// Feed this frame's scripted key changes to the session
fn input_injection(mut scripted: ResMut<ScriptedInputs>, mut slot: ResMut<GameSlot>) {
    let changes = scripted.advance_frame();
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    for (idx, keys) in changes {
        session.handle_input(idx, keys);
    }
}

fn step_session(control: Res<TestControl>, mut slot: ResMut<GameSlot>) {
    if let Some(session) = slot.get_game_mut() {
        session.tick(control.frame_ms);
    }
}

fn event_capture(control: Res<TestControl>, mut slot: ResMut<GameSlot>, mut capture: ResMut<EventCapture>) {
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    for bus_event in session.events_mut().drain() {
        if let Some(event) = CapturedEvent::from_game_event(control.current_frame, &bus_event.event) {
            capture.events.push(event);
        }
    }
}

/// Count the frame and stop after the last scripted one
fn test_end_check(scripted: Res<ScriptedInputs>, mut control: ResMut<TestControl>) {
    control.current_frame += 1;
    if !scripted.should_continue() {
        control.should_exit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(toml: &str) -> TestResult {
        let def: TestDefinition = toml::from_str(toml).unwrap();
        run_test(&def)
    }

    #[test]
    fn test_crouch_dodges_high_punch() {
        let result = run(r#"
name = "crouch dodge"

[[setup.fighter]]
id = "p1"
x = 400.0

[[setup.fighter]]
id = "p2"
x = 520.0
move = "SQUAT"

[[input]]
frame = 0
p1 = ["high_punch"]

[[input]]
frame = 2
p1 = []

[expect]
absent = ["Attack"]

[[expect.state]]
after_frame = 80
checks = ["p2.life = 100", "p2.move = SQUAT"]
"#);
        assert!(matches!(result, TestResult::Pass { .. }), "{:?}", result);
    }

    #[test]
    fn test_failing_check_is_reported() {
        let result = run(r#"
name = "wrong life"

[[expect.state]]
after_frame = 5
checks = ["p1.life = 50"]
"#);
        assert!(matches!(result, TestResult::Fail { .. }), "{:?}", result);
    }

    #[test]
    fn test_networked_setup_is_rejected() {
        let result = run(r#"
name = "realtime"
[setup]
game_type = "realtime"
"#);
        assert!(matches!(result, TestResult::Error { .. }));
    }
}
