//! HUD: health bars, fighter names, round timer and round indicator

use bevy::prelude::*;

use crate::constants::*;
use crate::fighter::FighterNameText;
use crate::presentation::to_world;
use crate::session::GameSlot;

const BAR_PADDING: f32 = 20.0;
const BAR_WIDTH: f32 = 400.0;
const BAR_HEIGHT: f32 = 24.0;
/// Top of the health bars
const BAR_TOP: f32 = 56.0;
const ROUND_INDICATOR_TOP: f32 = 120.0;

const HEALTH_FULL: Color = Color::srgb(0.0, 1.0, 0.0);
const HEALTH_HALF: Color = Color::srgb(1.0, 1.0, 0.0);
const HEALTH_LOW: Color = Color::srgb(1.0, 0.0, 0.0);

/// Colored part of a health bar
#[derive(Component, Clone, Copy)]
pub struct HealthBarFill(pub usize);

#[derive(Component)]
pub struct RoundTimerText;

#[derive(Component)]
pub struct RoundIndicatorText;

/// Bar color for a life fraction: green at full, yellow at half, red when empty
pub fn health_color(fraction: f32) -> Color {
    let f = fraction.clamp(0.0, 1.0);
    let (from, to, t) = if f >= 0.5 {
        (HEALTH_HALF, HEALTH_FULL, (f - 0.5) * 2.0)
    } else {
        (HEALTH_LOW, HEALTH_HALF, f * 2.0)
    };
    let (a, b) = (from.to_srgba(), to.to_srgba());
    Color::srgb(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
    )
}

pub fn round_indicator_text(round: u32, wins: [u32; 2]) -> String {
    format!(
        "Round {} of {}\nPlayer 1: {} | Player 2: {}",
        round, ROUNDS_PER_MATCH, wins[0], wins[1]
    )
}

/// Left edge of a fighter's health bar in arena space
fn bar_left(idx: usize) -> f32 {
    if idx == 0 {
        BAR_PADDING
    } else {
        ARENA_WIDTH - BAR_PADDING - BAR_WIDTH
    }
}

/// Spawn health bars, names, timer and round indicator
pub fn spawn_hud(commands: &mut Commands) {
    for idx in 0..2 {
        let left = bar_left(idx);
        commands.spawn((
            Sprite::from_color(HEALTH_EMPTY_COLOR, Vec2::new(BAR_WIDTH, BAR_HEIGHT)),
            Transform::from_translation(to_world(left, BAR_TOP, BAR_WIDTH, BAR_HEIGHT).extend(50.0)),
        ));
        commands.spawn((
            Sprite::from_color(HEALTH_FULL, Vec2::new(BAR_WIDTH, BAR_HEIGHT)),
            Transform::from_translation(to_world(left, BAR_TOP, BAR_WIDTH, BAR_HEIGHT).extend(51.0)),
            HealthBarFill(idx),
        ));

        // Name centered over its bar
        commands.spawn((
            Text2d::new(""),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextLayout::new_with_justify(Justify::Center),
            TextColor(TEXT_PRIMARY),
            Transform::from_translation(to_world(left, BAR_TOP - 24.0, BAR_WIDTH, 20.0).extend(52.0)),
            FighterNameText(idx),
        ));
    }

    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 40.0,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
        TextColor(TEXT_PRIMARY),
        Transform::from_translation(
            to_world(ARENA_WIDTH / 2.0, BAR_TOP - 8.0, 0.0, 40.0).extend(52.0),
        ),
        Visibility::Hidden,
        RoundTimerText,
    ));

    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
        TextColor(TEXT_SECONDARY),
        Transform::from_translation(
            to_world(ARENA_WIDTH / 2.0, ROUND_INDICATOR_TOP, 0.0, 40.0).extend(52.0),
        ),
        RoundIndicatorText,
    ));
}

/// Shrink each fill toward the outer edge of its bar and recolor it
pub fn update_health_bars(
    slot: Res<GameSlot>,
    mut query: Query<(&HealthBarFill, &mut Sprite, &mut Transform)>,
) {
    let Some(session) = slot.get_game() else {
        return;
    };
    for (fill, mut sprite, mut transform) in &mut query {
        let Some(fighter) = session.controller().fighters().get(fill.0) else {
            continue;
        };
        let fraction = (fighter.life() / MAX_LIFE).clamp(0.0, 1.0);
        let width = BAR_WIDTH * fraction;
        let left = if fill.0 == 0 {
            bar_left(0)
        } else {
            bar_left(1) + BAR_WIDTH - width
        };
        sprite.custom_size = Some(Vec2::new(width, BAR_HEIGHT));
        sprite.color = health_color(fraction);
        transform.translation.x = to_world(left, BAR_TOP, width, BAR_HEIGHT).x;
    }
}

/// Remaining round seconds, red in the last stretch; hidden until the countdown is over
pub fn update_round_timer(
    slot: Res<GameSlot>,
    mut query: Query<(&mut Text2d, &mut TextColor, &mut Visibility), With<RoundTimerText>>,
) {
    let Ok((mut text, mut color, mut visibility)) = query.single_mut() else {
        return;
    };
    let Some(session) = slot.get_game() else {
        *visibility = Visibility::Hidden;
        return;
    };
    let arena = session.controller().arena();
    if !arena.countdown().is_finished() {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Visible;
    let label = arena.timer().remaining_secs().to_string();
    if text.0 != label {
        text.0 = label;
    }
    color.0 = if arena.timer().is_warning() {
        TEXT_WARNING
    } else {
        TEXT_PRIMARY
    };
}

pub fn update_round_indicator(
    slot: Res<GameSlot>,
    mut query: Query<&mut Text2d, With<RoundIndicatorText>>,
) {
    let Some(session) = slot.get_game() else {
        return;
    };
    let state = session.match_state();
    let label = round_indicator_text(state.current_round, state.wins);
    for mut text in &mut query {
        if text.0 != label {
            text.0 = label.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: Color) -> [f32; 3] {
        let c = color.to_srgba();
        [c.red, c.green, c.blue]
    }

    #[test]
    fn test_health_color_ramp() {
        assert_eq!(rgb(health_color(1.0)), [0.0, 1.0, 0.0]);
        assert_eq!(rgb(health_color(0.5)), [1.0, 1.0, 0.0]);
        assert_eq!(rgb(health_color(0.0)), [1.0, 0.0, 0.0]);

        let [r, g, b] = rgb(health_color(0.75));
        assert!((r - 0.5).abs() < 1e-4 && (g - 1.0).abs() < 1e-4 && b.abs() < 1e-4);
        // Out-of-range life is clamped
        assert_eq!(rgb(health_color(1.7)), rgb(health_color(1.0)));
    }

    #[test]
    fn test_round_indicator_text() {
        assert_eq!(
            round_indicator_text(2, [1, 0]),
            "Round 2 of 3\nPlayer 1: 1 | Player 2: 0"
        );
    }

    #[test]
    fn test_bars_mirror_each_other() {
        assert_eq!(bar_left(0), 20.0);
        assert_eq!(bar_left(1) + BAR_WIDTH, ARENA_WIDTH - 20.0);
    }
}
