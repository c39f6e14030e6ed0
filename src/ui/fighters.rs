//! Fighter sprites
//!
//! Each posture has one image, `fighters/<name>/<move>.png`. When a fighter has
//! no image for a posture the generated placeholder set under
//! `fighters/placeholder/` is used, and when that is missing too (or an image
//! fails to load) the fighter is drawn as a solid rectangle in its slot color.

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use crate::constants::*;
use crate::fighter::{Fighter, FighterNameText, FighterSprite, Orientation, PlaceholderSprite};
use crate::moves::MoveType;
use crate::presentation::{DeviceScale, to_world};
use crate::session::GameSlot;
use crate::ui::arena::ASSETS_DIR;

/// Directory name of the generated placeholder set
pub const PLACEHOLDER_FIGHTER: &str = "placeholder";

/// File stem for a posture image (`high_kick`)
pub fn move_file_stem(kind: MoveType) -> String {
    kind.as_str().to_ascii_lowercase()
}

pub fn fighter_image_path(name: &str, kind: MoveType) -> String {
    format!("fighters/{}/{}.png", name, move_file_stem(kind))
}

/// First image present under `root` for this fighter and posture: own sprite, then placeholder
pub fn resolve_fighter_image(root: &Path, name: &str, kind: MoveType) -> Option<String> {
    [name, PLACEHOLDER_FIGHTER]
        .into_iter()
        .map(|n| fighter_image_path(n, kind))
        .find(|path| root.join(path).exists())
}

/// Image handles per (fighter name, posture); `None` once known to be unavailable
#[derive(Resource, Default)]
pub struct FighterTextures {
    handles: HashMap<(String, MoveType), Option<Handle<Image>>>,
}

impl FighterTextures {
    fn get(&mut self, asset_server: &AssetServer, name: &str, kind: MoveType) -> Option<Handle<Image>> {
        let entry = self
            .handles
            .entry((name.to_string(), kind))
            .or_insert_with(|| {
                let path = resolve_fighter_image(Path::new(ASSETS_DIR), name, kind);
                if path.is_none() {
                    warn!(
                        "No sprite for {} {}, drawing placeholder",
                        name,
                        kind.as_str()
                    );
                }
                path.map(|p| asset_server.load(p))
            });

        if let Some(handle) = entry
            && matches!(asset_server.load_state(&*handle), LoadState::Failed(_))
        {
            warn!("Sprite for {} {} failed to load, drawing placeholder", name, kind.as_str());
            *entry = None;
        }
        entry.clone()
    }
}

/// Spawn one sprite and one name label per fighter slot
pub fn spawn_fighter_sprites(commands: &mut Commands) {
    for idx in 0..2 {
        commands.spawn((
            Sprite::from_color(
                FIGHTER_PLACEHOLDER_COLORS[idx],
                Vec2::new(FIGHTER_WIDTH, FIGHTER_STAND_HEIGHT),
            ),
            Transform::from_xyz(0.0, 0.0, 10.0 + idx as f32),
            Visibility::Hidden,
            FighterSprite(idx),
        ));
    }
}

fn sprite_box(fighter: &Fighter) -> (Vec2, Vec2) {
    let size = Vec2::new(fighter.width(), fighter.height());
    (to_world(fighter.x(), fighter.y(), size.x, size.y), size)
}

/// Mirror fighter position, posture and facing onto the sprites
pub fn sync_fighter_sprites(
    mut commands: Commands,
    slot: Res<GameSlot>,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    device: Res<DeviceScale>,
    mut textures: ResMut<FighterTextures>,
    mut query: Query<(
        Entity,
        &FighterSprite,
        &mut Sprite,
        &mut Transform,
        &mut Visibility,
        Has<PlaceholderSprite>,
    )>,
) {
    let Some(session) = slot.get_game() else {
        for (.., mut visibility, _) in &mut query {
            *visibility = Visibility::Hidden;
        }
        return;
    };

    for (entity, slot_idx, mut sprite, mut transform, mut visibility, placeholder) in &mut query {
        let Some(fighter) = session.controller().fighters().get(slot_idx.0) else {
            continue;
        };
        *visibility = Visibility::Visible;
        let (center, size) = sprite_box(fighter);
        let image = textures.get(&asset_server, fighter.name(), fighter.current_move());

        match image {
            Some(handle) => {
                // Image sprites stand on the fighter's feet at their own magnified size
                let drawn = images
                    .get(&handle)
                    .map(|img| img.size_f32() * device.sprite_scale() / device.scale_ratio())
                    .unwrap_or(size);
                let bottom = center.y - size.y / 2.0;
                transform.translation.x = center.x;
                transform.translation.y = bottom + drawn.y / 2.0;
                sprite.image = handle;
                sprite.color = Color::WHITE;
                sprite.custom_size = Some(drawn);
                if placeholder {
                    commands.entity(entity).remove::<PlaceholderSprite>();
                }
            }
            None => {
                transform.translation.x = center.x;
                transform.translation.y = center.y;
                sprite.image = Handle::default();
                sprite.color = FIGHTER_PLACEHOLDER_COLORS[slot_idx.0.min(1)];
                sprite.custom_size = Some(size);
                if !placeholder {
                    commands.entity(entity).insert(PlaceholderSprite);
                }
            }
        }
        sprite.flip_x = fighter.orientation() == Orientation::Right;
    }
}

/// Keep name labels in step with the fighters in the slot
pub fn update_fighter_names(slot: Res<GameSlot>, mut query: Query<(&FighterNameText, &mut Text2d)>) {
    let Some(session) = slot.get_game() else {
        return;
    };
    for (label, mut text) in &mut query {
        if let Some(fighter) = session.controller().fighters().get(label.0) {
            let name = fighter.name().to_uppercase();
            if text.0 != name {
                text.0 = name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_paths_use_lowercase_tags() {
        assert_eq!(
            fighter_image_path("subzero", MoveType::ForwardJumpKick),
            "fighters/subzero/forward_jump_kick.png"
        );
    }

    #[test]
    fn test_resolution_falls_back_to_placeholder_then_none() {
        let root = std::env::temp_dir().join(format!("fightgame-{}", uuid::Uuid::new_v4()));
        assert_eq!(resolve_fighter_image(&root, "kano", MoveType::Walk), None);

        std::fs::create_dir_all(root.join("fighters/placeholder")).unwrap();
        std::fs::write(root.join("fighters/placeholder/walk.png"), b"png").unwrap();
        assert_eq!(
            resolve_fighter_image(&root, "kano", MoveType::Walk).as_deref(),
            Some("fighters/placeholder/walk.png")
        );

        std::fs::create_dir_all(root.join("fighters/kano")).unwrap();
        std::fs::write(root.join("fighters/kano/walk.png"), b"png").unwrap();
        assert_eq!(
            resolve_fighter_image(&root, "kano", MoveType::Walk).as_deref(),
            Some("fighters/kano/walk.png")
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_sprite_box_tracks_crouch_height() {
        let mut fighter = Fighter::new("kano", 0);
        let (_, standing) = sprite_box(&fighter);
        assert_eq!(standing, Vec2::new(FIGHTER_WIDTH, FIGHTER_STAND_HEIGHT));
        fighter.set_move(MoveType::Squat);
        let (_, crouched) = sprite_box(&fighter);
        assert_eq!(crouched.y, FIGHTER_SQUAT_HEIGHT);
    }
}
