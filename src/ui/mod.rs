//! UI module - arena background, fighter sprites and HUD

pub mod arena;
mod fighters;
mod hud;

pub use arena::{ArenaBackground, spawn_arena_background, sync_arena_background};
pub use fighters::*;
pub use hud::*;
