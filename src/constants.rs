//! Tunable constants for fightgame
//!
//! All engine values are defined here for easy tweaking. Positions are in the
//! logical arena space: origin at the top-left corner, y grows downward.

use bevy::prelude::*;

// =============================================================================
// DEFAULT ARENA COLORS
// =============================================================================

pub const DEFAULT_BACKGROUND_COLOR: Color = Color::srgb(0.1, 0.1, 0.12);
/// Solid fill used when the arena background image fails to load (#2a2a2a)
pub const ARENA_FALLBACK_COLOR: Color = Color::srgb(0.165, 0.165, 0.165);
pub const FIGHTER_PLACEHOLDER_COLORS: [Color; 2] = [
    Color::srgb(0.85, 0.75, 0.2),  // Player 1 - amber
    Color::srgb(0.25, 0.55, 0.85), // Player 2 - steel blue
];

// =============================================================================
// TEXT/UI COLORS
// =============================================================================

pub const TEXT_PRIMARY: Color = Color::srgb(1.0, 1.0, 1.0);
pub const TEXT_SECONDARY: Color = Color::srgba(1.0, 1.0, 1.0, 0.7);
pub const TEXT_WARNING: Color = Color::srgb(1.0, 0.0, 0.0); // Timer at <= 10s
pub const HEALTH_EMPTY_COLOR: Color = Color::srgb(0.29, 0.0, 0.0); // #4A0000
pub const COUNTDOWN_OVERLAY_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);

// =============================================================================
// ARENA DIMENSIONS (logical space)
// =============================================================================

pub const ARENA_WIDTH: f32 = 1200.0;
pub const ARENA_HEIGHT: f32 = 800.0;
/// Feet line for grounded fighters
pub const GROUND_Y: f32 = 760.0;

// =============================================================================
// FIGHTER GEOMETRY
// =============================================================================

pub const FIGHTER_WIDTH: f32 = 100.0;
pub const FIGHTER_STAND_HEIGHT: f32 = 200.0;
pub const FIGHTER_SQUAT_HEIGHT: f32 = 130.0;
/// Top of a standing fighter
pub const PLAYER_TOP: f32 = GROUND_Y - FIGHTER_STAND_HEIGHT;
pub const FIGHTER_SPAWN_X: [f32; 2] = [100.0, 940.0];
pub const MAX_LIFE: f32 = 100.0;

// =============================================================================
// MOVE TIMING AND MOTION
// =============================================================================

/// Default animation frame duration in milliseconds
pub const STEP_DURATION_MS: u32 = 50;
pub const WALK_STEP_X: f32 = 12.0;
pub const JUMP_RISE_Y: f32 = 40.0;
/// Extra drop on the last descending frame of a jump (landing)
pub const JUMP_LANDING_Y: f32 = 80.0;
pub const JUMP_STEP_X: f32 = 24.0;

// =============================================================================
// ATTACK RULES
// =============================================================================

/// Max center-to-center horizontal distance for a hit
pub const ATTACK_RANGE: f32 = 200.0;
/// Relaxed vertical tolerance for jump attacks
pub const JUMP_ATTACK_VERTICAL_TOLERANCE: f32 = 30.0;
/// Fraction of damage taken while blocking
pub const BLOCK_DAMAGE: f32 = 0.2;

// =============================================================================
// ROUND LIFECYCLE
// =============================================================================

pub const READY_DURATION_MS: u32 = 5000;
pub const COUNTDOWN_START: u32 = 5;
pub const COUNTDOWN_STEP_MS: u32 = 1000;
pub const ROUND_SECONDS: u32 = 60;
pub const TIMER_WARNING_SECONDS: u32 = 10;
pub const ROUNDS_PER_MATCH: u32 = 3;
pub const WINS_TO_TAKE_MATCH: u32 = 2;
/// Pause between a round result and the next countdown
pub const ROUND_END_DELAY_MS: u32 = 3000;

// =============================================================================
// PEER SYNC
// =============================================================================

pub const POSITION_SYNC_INTERVAL_MS: u32 = 500;
pub const POSITION_SYNC_MIN_GAP_MS: u32 = 450;
pub const LIFE_SYNC_INTERVAL_MS: u32 = 2000;
pub const LIFE_SYNC_MIN_GAP_MS: u32 = 1900;

// =============================================================================
// DEVICE SCALING (presentation only)
// =============================================================================

pub const MOBILE_MIN_WIDTH: f32 = 375.0;
pub const MOBILE_MAX_WIDTH: f32 = 1024.0;
pub const MOBILE_MIN_SCALE: f32 = 0.35;
pub const MOBILE_MAX_SCALE: f32 = 0.6;

// =============================================================================
// TOUCH JOYSTICK
// =============================================================================

pub const JOYSTICK_DEAD_ZONE: f32 = 15.0;
pub const JOYSTICK_MAX_DISTANCE: f32 = 45.0;
/// Dominant-axis ratio for a straight (non-diagonal) direction
pub const JOYSTICK_AXIS_RATIO: f32 = 0.7;

// =============================================================================
// VIEWPORT PRESETS
// =============================================================================

/// Window size presets: (width, height, label)
pub const VIEWPORT_PRESETS: &[(f32, f32, &str)] = &[
    (1200.0, 800.0, "1200x800 (native)"),
    (1800.0, 1200.0, "1800x1200"),
    (900.0, 600.0, "900x600 (tablet)"),
    (812.0, 375.0, "812x375 (phone landscape)"),
];

pub const DEFAULT_VIEWPORT_INDEX: usize = 0;
