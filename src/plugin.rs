//! Bevy wiring: resources, the scene, and the per-frame systems that drive the session

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::time::Duration;

use crate::config_watcher::{ConfigWatcher, check_config_changes};
use crate::countdown::{spawn_countdown_text, update_countdown_text};
use crate::events::flush_events_to_sqlite;
use crate::input::{FightInput, capture_input};
use crate::presentation::{
    DeviceScale, ViewportScale, cycle_viewport, surface_size, update_device_scale,
};
use crate::session::GameSlot;
use crate::settings::{CurrentSettings, save_settings_system};
use crate::tuning::FightTuning;
use crate::ui;

/// Longest step handed to the engine in one frame (window drags, breakpoints)
pub const MAX_FRAME_MS: u32 = 250;

/// Turns frame times into whole engine milliseconds, carrying the remainder
#[derive(Resource, Default, Debug)]
pub struct FrameClock {
    carry_us: u64,
}

impl FrameClock {
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let total = self.carry_us + delta.as_micros() as u64;
        self.carry_us = total % 1000;
        (total / 1000).min(MAX_FRAME_MS as u64) as u32
    }
}

/// Systems that move the simulation forward, in order
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FightSimSet;

/// Engine plugin for the windowed game. The host inserts a [`GameSlot`]
/// holding the started session (and optionally a `SqliteEventLogger`).
pub struct FightPlugin;

impl Plugin for FightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSlot>()
            .init_resource::<FightInput>()
            .init_resource::<FrameClock>()
            .init_resource::<DeviceScale>()
            .init_resource::<ViewportScale>()
            .init_resource::<FightTuning>()
            .init_resource::<ConfigWatcher>()
            .init_resource::<CurrentSettings>()
            .init_resource::<ui::FighterTextures>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (capture_input, apply_fight_input, advance_session)
                    .chain()
                    .in_set(FightSimSet),
            )
            .add_systems(
                Update,
                (
                    ui::sync_arena_background,
                    ui::sync_fighter_sprites,
                    ui::update_fighter_names,
                    ui::update_health_bars,
                    ui::update_round_timer,
                    ui::update_round_indicator,
                    update_countdown_text,
                )
                    .after(FightSimSet),
            )
            .add_systems(
                Update,
                (
                    update_device_scale,
                    cycle_viewport,
                    check_config_changes,
                    flush_events_to_sqlite.after(FightSimSet),
                    save_settings_system,
                ),
            );
    }
}

/// Camera, background, fighters, HUD and countdown banner.
/// Without a primary window there is nothing to draw on and the app exits.
fn setup_scene(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut device: ResMut<DeviceScale>,
    mut exit: MessageWriter<AppExit>,
) {
    let size = match surface_size(windows.iter().next()) {
        Ok(size) => size,
        Err(e) => {
            error!("{}", e);
            exit.write(AppExit::error());
            return;
        }
    };
    *device = DeviceScale::for_window(size.x, size.y);
    info!(
        "Surface {}x{} (mobile: {}, canvas {:?})",
        size.x, size.y, device.mobile, device.canvas
    );

    commands.spawn((
        Camera2d,
        Transform::from_xyz(0.0, 0.0, 0.0),
        Projection::Orthographic(OrthographicProjection {
            scale: device.camera_scale(),
            ..OrthographicProjection::default_2d()
        }),
    ));

    ui::spawn_arena_background(&mut commands);
    ui::spawn_fighter_sprites(&mut commands);
    ui::spawn_hud(&mut commands);
    spawn_countdown_text(&mut commands);
}

/// Feed changed key sets to the session
fn apply_fight_input(mut input: ResMut<FightInput>, mut slot: ResMut<GameSlot>) {
    let changes = input.drain_changes();
    let Some(session) = slot.get_game_mut() else {
        return;
    };
    for (idx, pressed) in changes {
        session.handle_input(idx, pressed);
    }
}

/// Advance the session by the frame time
fn advance_session(time: Res<Time>, mut clock: ResMut<FrameClock>, mut slot: ResMut<GameSlot>) {
    let dt_ms = clock.advance(time.delta());
    if dt_ms == 0 {
        return;
    }
    if let Some(session) = slot.get_game_mut() {
        session.tick(dt_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_carries_fractions() {
        let mut clock = FrameClock::default();
        // 60 Hz frames: 16.666 ms each
        let ticks: u32 = (0..3).map(|_| clock.advance(Duration::from_micros(16_666))).sum();
        assert_eq!(ticks, 49);
        assert_eq!(clock.advance(Duration::from_micros(16_666)), 17);
    }

    #[test]
    fn test_frame_clock_caps_long_frames() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(Duration::from_secs(3)), MAX_FRAME_MS);
    }
}
