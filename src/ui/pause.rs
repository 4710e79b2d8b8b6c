//! Pause round-trip. The virtual clock is frozen while paused, so every
//! ms deadline in the session (buffs, spawns, speech, rain) resumes
//! exactly where it left off with no catch-up burst.

use bevy::audio::AudioSink;
use bevy::prelude::*;

use crate::shared::*;

#[derive(Component)]
pub struct PauseOverlayRoot;

pub fn request_pause(input: Res<RunnerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.pause {
        next_state.set(GameState::Paused);
    }
}

pub fn enter_pause(
    mut commands: Commands,
    mut virtual_time: ResMut<Time<Virtual>>,
    sinks: Query<&AudioSink>,
) {
    virtual_time.pause();
    for sink in &sinks {
        sink.pause();
    }

    commands
        .spawn((
            PauseOverlayRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("PAUSED"),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.5)),
            ));
            parent.spawn((
                Text::new("Esc or Enter: Resume"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.75, 0.85)),
            ));
        });
}

pub fn exit_pause(
    mut commands: Commands,
    mut virtual_time: ResMut<Time<Virtual>>,
    sinks: Query<&AudioSink>,
    overlay: Query<Entity, With<PauseOverlayRoot>>,
) {
    virtual_time.unpause();
    for sink in &sinks {
        sink.play();
    }
    for entity in &overlay {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn pause_navigation(input: Res<RunnerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.pause || input.ui_confirm {
        next_state.set(GameState::Playing);
    }
}
