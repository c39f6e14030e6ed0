//! Input module - fight key model, move decision table and device capture
//!
//! Devices (keyboard, gamepad, touch) are reduced to a [`PressedKeys`] set per
//! locally controlled fighter. The session feeds every change through
//! [`decide_move`].

mod decision;
mod joystick;
mod keys;

pub use decision::decide_move;
pub use joystick::{ActionButton, joystick_keys};
pub use keys::{FightKey, PressedKeys};

use bevy::input::touch::Touches;
use bevy::prelude::*;

use crate::constants::JOYSTICK_MAX_DISTANCE;
use crate::session::GameSlot;

/// Left-hand keyboard layout (player one in local two-player games)
pub const PLAYER_ONE_KEYS: [(KeyCode, FightKey); 9] = [
    (KeyCode::KeyA, FightKey::Left),
    (KeyCode::KeyD, FightKey::Right),
    (KeyCode::KeyW, FightKey::Up),
    (KeyCode::KeyS, FightKey::Down),
    (KeyCode::ShiftLeft, FightKey::Block),
    (KeyCode::KeyF, FightKey::LowPunch),
    (KeyCode::KeyG, FightKey::HighPunch),
    (KeyCode::KeyH, FightKey::LowKick),
    (KeyCode::KeyJ, FightKey::HighKick),
];

/// Arrow-key layout (player two in local two-player games)
pub const PLAYER_TWO_KEYS: [(KeyCode, FightKey); 9] = [
    (KeyCode::ArrowLeft, FightKey::Left),
    (KeyCode::ArrowRight, FightKey::Right),
    (KeyCode::ArrowUp, FightKey::Up),
    (KeyCode::ArrowDown, FightKey::Down),
    (KeyCode::Numpad0, FightKey::Block),
    (KeyCode::Numpad1, FightKey::LowPunch),
    (KeyCode::Numpad2, FightKey::HighPunch),
    (KeyCode::Numpad4, FightKey::LowKick),
    (KeyCode::Numpad5, FightKey::HighKick),
];

/// Stick deflection below this is ignored before joystick mapping
const STICK_DEADZONE: f32 = 0.2;

/// Held keys per fighter slot, refreshed every frame by [`capture_input`]
#[derive(Resource, Default, Debug)]
pub struct FightInput {
    pub pressed: [PressedKeys; 2],
    /// Set when `pressed` changed since the session last consumed it
    pub changed: [bool; 2],
}

impl FightInput {
    /// Take the key sets that changed since the last call
    pub fn drain_changes(&mut self) -> Vec<(usize, PressedKeys)> {
        let mut out = Vec::new();
        for idx in 0..2 {
            if self.changed[idx] {
                self.changed[idx] = false;
                out.push((idx, self.pressed[idx]));
            }
        }
        out
    }
}

fn keyboard_keys(keyboard: &ButtonInput<KeyCode>, layout: &[(KeyCode, FightKey)]) -> PressedKeys {
    layout
        .iter()
        .filter(|(code, _)| keyboard.pressed(*code))
        .map(|(_, key)| *key)
        .collect()
}

fn gamepad_keys(gamepad: &Gamepad) -> PressedKeys {
    let mut keys = PressedKeys::empty();

    let stick_x = gamepad.get(GamepadAxis::LeftStickX).unwrap_or(0.0);
    let stick_y = gamepad.get(GamepadAxis::LeftStickY).unwrap_or(0.0);
    if stick_x.abs() > STICK_DEADZONE || stick_y.abs() > STICK_DEADZONE {
        // Stick y points up; the joystick mapping works in screen space
        keys = keys.merge(joystick_keys(
            stick_x * JOYSTICK_MAX_DISTANCE,
            -stick_y * JOYSTICK_MAX_DISTANCE,
        ));
    }

    let buttons = [
        (GamepadButton::DPadLeft, FightKey::Left),
        (GamepadButton::DPadRight, FightKey::Right),
        (GamepadButton::DPadUp, FightKey::Up),
        (GamepadButton::DPadDown, FightKey::Down),
        (GamepadButton::West, ActionButton::X.key()),
        (GamepadButton::North, ActionButton::Y.key()),
        (GamepadButton::South, ActionButton::A.key()),
        (GamepadButton::East, ActionButton::B.key()),
        (GamepadButton::LeftTrigger, FightKey::Block),
        (GamepadButton::RightTrigger, FightKey::Block),
    ];
    for (button, key) in buttons {
        if gamepad.pressed(button) {
            keys.press(key);
        }
    }
    keys
}

/// Left half of the screen is the joystick (drag from where the finger went
/// down); the right half is a diamond of action buttons: X top, Y left,
/// A right, B bottom.
fn touch_keys(touches: &Touches, screen_width: f32, screen_height: f32) -> PressedKeys {
    let mut keys = PressedKeys::empty();
    let half = screen_width / 2.0;
    for touch in touches.iter() {
        let start = touch.start_position();
        if start.x < half {
            let delta = touch.position() - start;
            keys = keys.merge(joystick_keys(delta.x, delta.y));
        } else {
            let center = Vec2::new(half + half / 2.0, screen_height / 2.0);
            let offset = start - center;
            let button = if offset.y.abs() > offset.x.abs() {
                if offset.y < 0.0 { ActionButton::X } else { ActionButton::B }
            } else if offset.x < 0.0 {
                ActionButton::Y
            } else {
                ActionButton::A
            };
            keys.press(button.key());
        }
    }
    keys
}

/// Runs in Update: gather held keys for each locally controlled fighter.
///
/// A single local fighter accepts both keyboard layouts, every gamepad and
/// touch. With two local fighters each gets its own layout and gamepad.
pub fn capture_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    touches: Option<Res<Touches>>,
    windows: Query<&Window>,
    slot: Res<GameSlot>,
    mut input: ResMut<FightInput>,
) {
    let Some(session) = slot.get_game() else {
        return;
    };
    let local = session.controller().mode().local_fighters();

    let touch = match (touches.as_deref(), windows.iter().next()) {
        (Some(touches), Some(window)) => touch_keys(touches, window.width(), window.height()),
        _ => PressedKeys::empty(),
    };

    for (n, &idx) in local.iter().enumerate() {
        let keys = if local.len() == 1 {
            let mut keys = keyboard_keys(&keyboard, &PLAYER_ONE_KEYS)
                .merge(keyboard_keys(&keyboard, &PLAYER_TWO_KEYS))
                .merge(touch);
            for gamepad in &gamepads {
                keys = keys.merge(gamepad_keys(gamepad));
            }
            keys
        } else {
            let layout: &[(KeyCode, FightKey)] = if n == 0 { &PLAYER_ONE_KEYS } else { &PLAYER_TWO_KEYS };
            let mut keys = keyboard_keys(&keyboard, layout);
            if let Some(gamepad) = gamepads.iter().nth(n) {
                keys = keys.merge(gamepad_keys(gamepad));
            }
            keys
        };

        if keys != input.pressed[idx] {
            input.pressed[idx] = keys;
            input.changed[idx] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_layouts_are_disjoint() {
        for (code, _) in PLAYER_ONE_KEYS {
            assert!(PLAYER_TWO_KEYS.iter().all(|(other, _)| *other != code));
        }
    }

    #[test]
    fn test_keyboard_keys_follow_layout() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyD);
        keyboard.press(KeyCode::KeyJ);
        let keys = keyboard_keys(&keyboard, &PLAYER_ONE_KEYS);
        assert!(keys.is_pressed(FightKey::Right));
        assert!(keys.is_pressed(FightKey::HighKick));
        assert!(keyboard_keys(&keyboard, &PLAYER_TWO_KEYS).is_empty());
    }

    #[test]
    fn test_drain_changes_clears_flags() {
        let mut input = FightInput::default();
        input.pressed[1] = PressedKeys::empty().with(FightKey::Left);
        input.changed[1] = true;
        let changes = input.drain_changes();
        assert_eq!(changes, vec![(1, PressedKeys::empty().with(FightKey::Left))]);
        assert!(input.drain_changes().is_empty());
    }
}
