//! Placeholder fighter sprites
//!
//! Images are drawn facing right at desktop sprite resolution, so they come out
//! the size of the fighter's bounding box once scaled on screen.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;

use crate::constants::{FIGHTER_SQUAT_HEIGHT, FIGHTER_STAND_HEIGHT, FIGHTER_WIDTH};
use crate::moves::MoveType;
use crate::presentation::DESKTOP_SPRITE_SCALE;
use crate::ui::{PLACEHOLDER_FIGHTER, move_file_stem};

const BODY: Rgba<u8> = Rgba([200, 200, 205, 255]);
const STRIKE: Rgba<u8> = Rgba([235, 120, 60, 255]);
const GUARD: Rgba<u8> = Rgba([90, 150, 235, 255]);
const HURT: Rgba<u8> = Rgba([220, 60, 60, 255]);

/// Silhouette family a posture is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Idle,
    Stride,
    Crouch,
    Guard,
    Airborne,
    Punch { high: bool },
    Kick { high: bool },
    CrouchPunch,
    CrouchKick { high: bool },
    AirStrike,
    Hurt,
    Down,
    Victory,
}

impl Pose {
    pub fn for_move(kind: MoveType) -> Self {
        use MoveType::*;
        match kind {
            Stand | StandUp => Pose::Idle,
            Walk | WalkBackward => Pose::Stride,
            Squat => Pose::Crouch,
            Block => Pose::Guard,
            Jump | ForwardJump | BackwardJump => Pose::Airborne,
            HighPunch | Uppercut => Pose::Punch { high: true },
            LowPunch => Pose::Punch { high: false },
            HighKick | SpinKick => Pose::Kick { high: true },
            LowKick => Pose::Kick { high: false },
            SquatLowPunch => Pose::CrouchPunch,
            SquatLowKick => Pose::CrouchKick { high: false },
            SquatHighKick => Pose::CrouchKick { high: true },
            ForwardJumpKick | BackwardJumpKick | ForwardJumpPunch | BackwardJumpPunch => Pose::AirStrike,
            Endure | SquatEndure => Pose::Hurt,
            KnockDown | Fall => Pose::Down,
            Win => Pose::Victory,
        }
    }
}

/// Pixel size of the placeholder for a posture
pub fn image_size(kind: MoveType) -> (u32, u32) {
    let height = if kind.is_crouched() {
        FIGHTER_SQUAT_HEIGHT
    } else {
        FIGHTER_STAND_HEIGHT
    };
    (
        (FIGHTER_WIDTH / DESKTOP_SPRITE_SCALE).round() as u32,
        (height / DESKTOP_SPRITE_SCALE).round() as u32,
    )
}

/// Two-pixel limb from `a` to `b`
fn limb(img: &mut RgbaImage, a: (f32, f32), b: (f32, f32), color: Rgba<u8>) {
    draw_line_segment_mut(img, a, b, color);
    draw_line_segment_mut(img, (a.0 + 1.0, a.1), (b.0 + 1.0, b.1), color);
}

fn torso(img: &mut RgbaImage, x: f32, top: f32, w: f32, h: f32) {
    draw_filled_rect_mut(
        img,
        Rect::at(x.round() as i32, top.round() as i32).of_size(w.max(1.0) as u32, h.max(1.0) as u32),
        BODY,
    );
}

fn head(img: &mut RgbaImage, cx: f32, cy: f32, r: f32, color: Rgba<u8>) {
    draw_filled_circle_mut(img, (cx.round() as i32, cy.round() as i32), r.max(1.0) as i32, color);
}

/// Draw the silhouette for `kind`
pub fn render_pose(kind: MoveType) -> RgbaImage {
    let (w, h) = image_size(kind);
    let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    let (w, h) = (w as f32, h as f32);
    let cx = w / 2.0;
    let r = w * 0.14;
    let foot = h - 1.0;

    match Pose::for_move(kind) {
        Pose::Down => {
            // Lying along the floor
            let y = h - r - 1.0;
            head(&mut img, w - r - 1.0, y, r, HURT);
            limb(&mut img, (1.0, y), (w - 2.0 * r, y), BODY);
            limb(&mut img, (1.0, y - 2.0), (w - 2.0 * r, y - 2.0), BODY);
            return img;
        }
        Pose::Crouch | Pose::CrouchPunch | Pose::CrouchKick { .. } => {
            let hip = h * 0.7;
            head(&mut img, cx, r + 1.0, r, BODY);
            torso(&mut img, cx - w * 0.12, 2.0 * r + 1.0, w * 0.24, hip - 2.0 * r);
            limb(&mut img, (cx, hip), (cx + w * 0.2, h * 0.82), BODY);
            limb(&mut img, (cx + w * 0.2, h * 0.82), (cx + w * 0.1, foot), BODY);
            match Pose::for_move(kind) {
                Pose::CrouchPunch => limb(&mut img, (cx, hip * 0.45), (w - 1.0, hip * 0.6), STRIKE),
                Pose::CrouchKick { high } => {
                    let target = if high { r } else { foot };
                    limb(&mut img, (cx, hip), (w - 1.0, target), STRIKE);
                }
                _ => {
                    limb(&mut img, (cx - w * 0.2, hip), (cx - w * 0.1, foot), BODY);
                    limb(&mut img, (cx, hip * 0.45), (cx + w * 0.2, hip * 0.8), BODY);
                }
            }
            return img;
        }
        _ => {}
    }

    let pose = Pose::for_move(kind);
    let lift = if matches!(pose, Pose::Airborne | Pose::AirStrike) { h * 0.12 } else { 0.0 };
    let shoulder = 2.0 * r + 2.0;
    let hip = h * 0.55 - lift;
    let head_color = match pose {
        Pose::Hurt => HURT,
        Pose::Guard => GUARD,
        _ => BODY,
    };

    head(&mut img, cx, r + 1.0, r, head_color);
    torso(&mut img, cx - w * 0.12, shoulder, w * 0.24, hip - shoulder);

    // Legs
    match pose {
        Pose::Kick { high } => {
            limb(&mut img, (cx, hip), (cx - w * 0.15, foot), BODY);
            let target = if high { shoulder } else { hip };
            limb(&mut img, (cx, hip), (w - 1.0, target), STRIKE);
        }
        Pose::Airborne | Pose::AirStrike => {
            limb(&mut img, (cx, hip), (cx + w * 0.25, hip + h * 0.15), BODY);
            limb(&mut img, (cx, hip), (cx - w * 0.25, hip + h * 0.15), BODY);
            if pose == Pose::AirStrike {
                limb(&mut img, (cx, hip), (w - 1.0, hip + h * 0.05), STRIKE);
            }
        }
        Pose::Stride => {
            limb(&mut img, (cx, hip), (cx + w * 0.3, foot), BODY);
            limb(&mut img, (cx, hip), (cx - w * 0.3, foot), BODY);
        }
        _ => {
            limb(&mut img, (cx, hip), (cx + w * 0.12, foot), BODY);
            limb(&mut img, (cx, hip), (cx - w * 0.12, foot), BODY);
        }
    }

    // Arms
    let arm_y = shoulder + 2.0;
    match pose {
        Pose::Punch { high } => {
            let target = if high { shoulder - r } else { hip * 0.85 };
            limb(&mut img, (cx, arm_y), (w - 1.0, target), STRIKE);
            limb(&mut img, (cx, arm_y), (cx + w * 0.15, arm_y + h * 0.1), BODY);
        }
        Pose::Guard => {
            limb(&mut img, (cx, arm_y), (cx + w * 0.3, shoulder - r), GUARD);
            limb(&mut img, (cx, arm_y + 3.0), (cx + w * 0.3, shoulder), GUARD);
        }
        Pose::Victory => {
            limb(&mut img, (cx, arm_y), (cx + w * 0.3, 1.0), BODY);
            limb(&mut img, (cx, arm_y), (cx - w * 0.3, 1.0), BODY);
        }
        Pose::Hurt => {
            limb(&mut img, (cx, arm_y), (cx - w * 0.35, arm_y + h * 0.15), HURT);
        }
        _ => {
            limb(&mut img, (cx, arm_y), (cx + w * 0.2, hip), BODY);
            limb(&mut img, (cx, arm_y), (cx - w * 0.2, hip), BODY);
        }
    }
    img
}

/// Write every posture to `<assets_root>/fighters/placeholder/`; returns the file count
pub fn run(assets_root: &Path) -> Result<usize, String> {
    let dir = assets_root.join("fighters").join(PLACEHOLDER_FIGHTER);
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;

    for kind in MoveType::ALL {
        let path = dir.join(format!("{}.png", move_file_stem(kind)));
        render_pose(kind)
            .save(&path)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        println!("  {}", path.display());
    }
    Ok(MoveType::ALL.len())
}
