//! Device scaling adapter
//!
//! The engine works in one logical 1200x800 space. Everything here maps that
//! space onto the actual window: mobile detection, the canvas that keeps the
//! logical aspect ratio, fighter sprite magnification, UI scale, and the
//! logical-to-world transform used by the render systems.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized, WindowResolution};

use crate::constants::*;
use crate::session::EngineError;
use crate::settings::CurrentSettings;

/// Sprite magnification on desktop
pub const DESKTOP_SPRITE_SCALE: f32 = 3.0;
/// Sprite magnification on mobile, before the mobile UI scale is applied
pub const MOBILE_SPRITE_SCALE: f32 = 6.0;

/// Window widths in the mobile band use the mobile layout
pub fn is_mobile(window_width: f32) -> bool {
    (MOBILE_MIN_WIDTH..=MOBILE_MAX_WIDTH).contains(&window_width)
}

/// UI scale for a window width: 0.35 at 375 px rising linearly to 0.6 at 1024 px, 1.0 outside
pub fn mobile_scale(window_width: f32) -> f32 {
    if !is_mobile(window_width) {
        return 1.0;
    }
    let t = (window_width - MOBILE_MIN_WIDTH) / (MOBILE_MAX_WIDTH - MOBILE_MIN_WIDTH);
    MOBILE_MIN_SCALE + t * (MOBILE_MAX_SCALE - MOBILE_MIN_SCALE)
}

/// Current mapping from the logical arena to the window
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DeviceScale {
    pub window: Vec2,
    /// Drawn arena size in window pixels
    pub canvas: Vec2,
    pub mobile: bool,
    pub ui_scale: f32,
}

impl Default for DeviceScale {
    fn default() -> Self {
        Self::for_window(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

impl DeviceScale {
    pub fn for_window(width: f32, height: f32) -> Self {
        let mobile = is_mobile(width);
        let aspect = ARENA_WIDTH / ARENA_HEIGHT;
        let canvas = if mobile {
            // Fill the width, fall back to the height when too tall
            let mut size = Vec2::new(width, width / aspect);
            if size.y > height {
                size = Vec2::new(height * aspect, height);
            }
            size.floor()
        } else {
            Vec2::new(ARENA_WIDTH, ARENA_HEIGHT)
        };
        Self {
            window: Vec2::new(width, height),
            canvas,
            mobile,
            ui_scale: mobile_scale(width),
        }
    }

    /// Canvas pixels per logical unit
    pub fn scale_ratio(&self) -> f32 {
        if self.mobile {
            self.canvas.x / ARENA_WIDTH
        } else {
            1.0
        }
    }

    /// Orthographic camera scale that shows exactly the canvas area of the logical arena
    pub fn camera_scale(&self) -> f32 {
        1.0 / self.scale_ratio()
    }

    /// Magnification applied to fighter sprite images
    pub fn sprite_scale(&self) -> f32 {
        if self.mobile {
            MOBILE_SPRITE_SCALE * self.ui_scale
        } else {
            DESKTOP_SPRITE_SCALE
        }
    }
}

/// World-space center of a logical box (top-left `x`,`y`, size `w`x`h`).
/// World origin is the arena center with y up.
pub fn to_world(x: f32, y: f32, w: f32, h: f32) -> Vec2 {
    Vec2::new(
        x + w / 2.0 - ARENA_WIDTH / 2.0,
        ARENA_HEIGHT / 2.0 - (y + h / 2.0),
    )
}

/// Size of the window the arena gets mounted on
pub fn surface_size(window: Option<&Window>) -> Result<Vec2, EngineError> {
    let window = window.ok_or(EngineError::MissingSurface)?;
    let size = Vec2::new(window.width(), window.height());
    if size.x <= 0.0 || size.y <= 0.0 {
        return Err(EngineError::MissingSurface);
    }
    Ok(size)
}

/// Current window size preset index
#[derive(Resource, Default)]
pub struct ViewportScale {
    pub preset_index: usize,
}

impl ViewportScale {
    pub fn new(preset_index: usize) -> Self {
        Self {
            preset_index: preset_index.min(VIEWPORT_PRESETS.len() - 1),
        }
    }

    /// Current preset (width, height, label)
    pub fn current(&self) -> (f32, f32, &'static str) {
        VIEWPORT_PRESETS[self.preset_index]
    }

    pub fn cycle_next(&mut self) {
        self.preset_index = (self.preset_index + 1) % VIEWPORT_PRESETS.len();
    }
}

/// Cycle window size presets (V key); the choice is remembered in the settings file
pub fn cycle_viewport(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut viewport: ResMut<ViewportScale>,
    mut settings: ResMut<CurrentSettings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyV) {
        return;
    }
    viewport.cycle_next();
    let (width, height, label) = viewport.current();
    if let Ok(mut window) = windows.single_mut() {
        window.resolution =
            WindowResolution::new(width as u32, height as u32).with_scale_factor_override(1.0);
    }
    settings.settings.viewport_index = viewport.preset_index;
    settings.mark_dirty();
    info!("Viewport: {}", label);
}

/// Recompute the device mapping when the window changes size, and refit the camera
pub fn update_device_scale(
    mut resized: MessageReader<WindowResized>,
    mut scale: ResMut<DeviceScale>,
    mut camera_query: Query<&mut Projection, With<Camera2d>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    let updated = DeviceScale::for_window(last.width, last.height);
    if updated == *scale {
        return;
    }
    *scale = updated;
    if let Ok(mut projection) = camera_query.single_mut()
        && let Projection::Orthographic(ref mut ortho) = *projection
    {
        ortho.scale = scale.camera_scale();
    }
    debug!(
        "Device scale: mobile={} canvas={:?} ui={:.2}",
        scale.mobile, scale.canvas, scale.ui_scale
    );
}
