//! Fighter-related render components

use bevy::prelude::*;

/// Sprite entity mirroring one engine fighter (0 or 1)
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
pub struct FighterSprite(pub usize);

/// Fighter drawn as a solid rectangle because its sprite sheet failed to load
#[derive(Component)]
pub struct PlaceholderSprite;

/// Name label above a fighter's health bar
#[derive(Component, Clone, Copy)]
pub struct FighterNameText(pub usize);
