//! Two-body spatial resolution: bounds clamping, pushback and orientation

use super::Arena;
use crate::constants::GROUND_Y;
use crate::fighter::{Fighter, Orientation};

/// Split the pair into (mover, opponent)
fn pair_mut(fighters: &mut [Fighter; 2], idx: usize) -> (&mut Fighter, &mut Fighter) {
    let [a, b] = fighters;
    if idx == 0 { (a, b) } else { (b, a) }
}

fn overlaps_horizontally(x: f32, w: f32, other_x: f32, other_w: f32) -> bool {
    x < other_x + other_w && x + w > other_x
}

impl Arena {
    /// Move fighter `idx` towards `(x, y)`, keeping it inside the arena and
    /// out of the opponent's box.
    ///
    /// Only two grounded boxes collide. A jump arc in the air neither pushes
    /// nor gets pushed, and boxes stacked one above the other pass freely.
    /// Otherwise the mover pressing into the opponent pushes it by the
    /// overlap, limited by the arena edge; whatever cannot be pushed curtails
    /// the mover so the two end up touching. A landing arc counts as grounded,
    /// so a fighter coming down on the opponent is set beside it.
    pub fn move_fighter(&self, fighters: &mut [Fighter; 2], idx: usize, x: f32, y: f32) {
        let pushable = self.remote() != Some(1 - idx);
        let arena_width = self.width();
        {
            let (mover, opponent) = pair_mut(fighters, idx);
            let w = mover.width();
            let h = mover.height();
            let max_x = (arena_width - w).max(0.0);
            let mut x = x.clamp(0.0, max_x);

            let mover_airborne = mover.current_move().is_jump() && y + h < GROUND_Y;
            let opponent_airborne = opponent.is_jumping() && opponent.bottom() < GROUND_Y;
            let stacked = y + h <= opponent.y() || opponent.bottom() <= y;
            if !mover_airborne
                && !opponent_airborne
                && !stacked
                && overlaps_horizontally(x, w, opponent.x(), opponent.width())
            {
                x = push_back(mover, opponent, x, arena_width, pushable);
            }
            mover.set_x(x);
            mover.set_y(y);
        }
        derive_orientation(fighters);
    }
}

/// Resolve a grounded overlap; returns the mover's final x.
/// An opponent that can't be pushed and leaves no room on the mover's side
/// gets the mover on its other side.
fn push_back(
    mover: &Fighter,
    opponent: &mut Fighter,
    x: f32,
    arena_width: f32,
    pushable: bool,
) -> f32 {
    let w = mover.width();
    let ow = opponent.width();
    let ox = opponent.x();
    let max_x = (arena_width - w).max(0.0);
    let op_max_x = (arena_width - ow).max(0.0);

    if mover.center_x() <= opponent.center_x() {
        // Pressing rightwards
        let overlap = x + w - ox;
        let room = if pushable { (op_max_x - ox).max(0.0) } else { 0.0 };
        opponent.set_x(ox + overlap.min(room).max(0.0));
        let resolved = opponent.x() - w;
        if resolved < 0.0 {
            if pushable {
                opponent.set_x(w.min(op_max_x));
                return 0.0;
            }
            return (ox + ow).min(max_x);
        }
        resolved
    } else {
        // Pressing leftwards
        let overlap = ox + ow - x;
        let room = if pushable { ox.max(0.0) } else { 0.0 };
        opponent.set_x(ox - overlap.min(room).max(0.0));
        let resolved = opponent.x() + ow;
        if resolved > max_x {
            if pushable {
                opponent.set_x((max_x - ow).max(0.0));
                return max_x;
            }
            return (ox - w).max(0.0);
        }
        resolved
    }
}

/// The fighter further left gets `Orientation::Left`; a dead heat keeps the current sides
pub fn derive_orientation(fighters: &mut [Fighter; 2]) {
    let (c0, c1) = (fighters[0].center_x(), fighters[1].center_x());
    if c0 < c1 {
        fighters[0].set_orientation(Orientation::Left);
        fighters[1].set_orientation(Orientation::Right);
    } else if c0 > c1 {
        fighters[0].set_orientation(Orientation::Right);
        fighters[1].set_orientation(Orientation::Left);
    }
}
