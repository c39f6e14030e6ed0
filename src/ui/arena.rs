//! Arena background: image per arena id, solid fill when it can't be loaded

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::path::Path;

use crate::constants::*;
use crate::session::GameSlot;

/// Root directory the asset server reads from
pub const ASSETS_DIR: &str = "assets";

/// Background sprite for the arena currently in the slot
#[derive(Component, Default)]
pub struct ArenaBackground {
    /// Arena id the sprite was built for
    pub arena: Option<u32>,
    pub fallback: bool,
}

/// Asset path of an arena background image
pub fn arena_image_path(arena: u32) -> String {
    format!("arenas/arena{}.png", arena)
}

/// Asset path for `arena` when the file is present under `root`
pub fn resolve_arena_image(root: &Path, arena: u32) -> Option<String> {
    let path = arena_image_path(arena);
    root.join(&path).exists().then_some(path)
}

/// Spawn the (empty) background sprite; [`sync_arena_background`] fills it in
pub fn spawn_arena_background(commands: &mut Commands) {
    commands.spawn((
        Sprite::from_color(ARENA_FALLBACK_COLOR, Vec2::new(ARENA_WIDTH, ARENA_HEIGHT)),
        Transform::from_xyz(0.0, 0.0, -10.0),
        ArenaBackground::default(),
    ));
}

fn use_fallback(sprite: &mut Sprite, background: &mut ArenaBackground) {
    sprite.image = Handle::default();
    sprite.color = ARENA_FALLBACK_COLOR;
    background.fallback = true;
}

/// Load the background of the session's arena, and switch to the fallback fill
/// when the image is missing or fails to load
pub fn sync_arena_background(
    slot: Res<GameSlot>,
    asset_server: Res<AssetServer>,
    mut query: Query<(&mut Sprite, &mut ArenaBackground)>,
) {
    let Some(session) = slot.get_game() else {
        return;
    };
    let arena = session.controller().arena().background();

    for (mut sprite, mut background) in &mut query {
        if background.arena != Some(arena) {
            background.arena = Some(arena);
            background.fallback = false;
            match resolve_arena_image(Path::new(ASSETS_DIR), arena) {
                Some(path) => {
                    sprite.image = asset_server.load(path);
                    sprite.color = Color::WHITE;
                    sprite.custom_size = Some(Vec2::new(ARENA_WIDTH, ARENA_HEIGHT));
                }
                None => {
                    warn!(
                        "Arena background {} not found, using solid fill",
                        arena_image_path(arena)
                    );
                    use_fallback(&mut sprite, &mut background);
                }
            }
            continue;
        }

        if !background.fallback
            && matches!(asset_server.load_state(&sprite.image), LoadState::Failed(_))
        {
            warn!("Arena background {} failed to load, using solid fill", arena);
            use_fallback(&mut sprite, &mut background);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_background_resolves_to_none() {
        let root = std::env::temp_dir().join(format!("fightgame-{}", uuid::Uuid::new_v4()));
        assert_eq!(resolve_arena_image(&root, 2), None);

        std::fs::create_dir_all(root.join("arenas")).unwrap();
        std::fs::write(root.join("arenas/arena2.png"), b"png").unwrap();
        assert_eq!(resolve_arena_image(&root, 2).as_deref(), Some("arenas/arena2.png"));
        let _ = std::fs::remove_dir_all(&root);
    }
}
