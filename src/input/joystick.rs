//! Virtual joystick and action buttons for touch screens and gamepads

use super::keys::{FightKey, PressedKeys};
use crate::constants::{JOYSTICK_AXIS_RATIO, JOYSTICK_DEAD_ZONE, JOYSTICK_MAX_DISTANCE};

/// On-screen action buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    X,
    Y,
    A,
    B,
}

impl ActionButton {
    pub fn key(self) -> FightKey {
        match self {
            ActionButton::X => FightKey::HighPunch,
            ActionButton::Y => FightKey::LowPunch,
            ActionButton::A => FightKey::HighKick,
            ActionButton::B => FightKey::LowKick,
        }
    }
}

/// Map a drag offset from the joystick origin (screen space, y grows down) to direction keys.
///
/// Inside the dead zone nothing is held. A dominant axis holds one key;
/// otherwise a clear diagonal holds two.
pub fn joystick_keys(dx: f32, dy: f32) -> PressedKeys {
    let mut keys = PressedKeys::empty();
    let distance = (dx * dx + dy * dy).sqrt().min(JOYSTICK_MAX_DISTANCE);
    if distance <= JOYSTICK_DEAD_ZONE {
        return keys;
    }

    let dz = JOYSTICK_DEAD_ZONE;
    let (abs_x, abs_y) = (dx.abs(), dy.abs());
    if dy < -dz && abs_y > abs_x * JOYSTICK_AXIS_RATIO {
        keys.press(FightKey::Up);
    } else if dy > dz && abs_y > abs_x * JOYSTICK_AXIS_RATIO {
        keys.press(FightKey::Down);
    } else if dx < -dz && abs_x > abs_y * JOYSTICK_AXIS_RATIO {
        keys.press(FightKey::Left);
    } else if dx > dz && abs_x > abs_y * JOYSTICK_AXIS_RATIO {
        keys.press(FightKey::Right);
    } else if dy < -dz && dx < -dz {
        keys.press(FightKey::Up);
        keys.press(FightKey::Left);
    } else if dy < -dz && dx > dz {
        keys.press(FightKey::Up);
        keys.press(FightKey::Right);
    } else if dy > dz && dx < -dz {
        keys.press(FightKey::Down);
        keys.press(FightKey::Left);
    } else if dy > dz && dx > dz {
        keys.press(FightKey::Down);
        keys.press(FightKey::Right);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_zone_holds_nothing() {
        assert!(joystick_keys(0.0, 0.0).is_empty());
        assert!(joystick_keys(10.0, -10.0).is_empty());
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(joystick_keys(0.0, -30.0), PressedKeys::empty().with(FightKey::Up));
        assert_eq!(joystick_keys(5.0, 40.0), PressedKeys::empty().with(FightKey::Down));
        assert_eq!(joystick_keys(-40.0, 3.0), PressedKeys::empty().with(FightKey::Left));
        assert_eq!(joystick_keys(200.0, 0.0), PressedKeys::empty().with(FightKey::Right));
    }

    #[test]
    fn test_axis_ratio_catches_most_diagonals() {
        // |dy| > |dx| * 0.7 picks the vertical axis alone
        assert_eq!(joystick_keys(30.0, -30.0), PressedKeys::empty().with(FightKey::Up));
        assert_eq!(joystick_keys(-30.0, 30.0), PressedKeys::empty().with(FightKey::Down));
    }

    #[test]
    fn test_buttons() {
        assert_eq!(ActionButton::X.key(), FightKey::HighPunch);
        assert_eq!(ActionButton::Y.key(), FightKey::LowPunch);
        assert_eq!(ActionButton::A.key(), FightKey::HighKick);
        assert_eq!(ActionButton::B.key(), FightKey::LowKick);
    }
}
