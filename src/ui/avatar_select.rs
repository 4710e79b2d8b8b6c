use bevy::prelude::*;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct AvatarSelectRoot;

#[derive(Component)]
pub struct AvatarSelectItem {
    pub index: usize,
}

/// Tracks avatar select cursor
#[derive(Resource)]
pub struct AvatarSelectState {
    pub cursor: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_avatar_select(
    mut commands: Commands,
    registry: Res<AvatarRegistry>,
    selected: Res<SelectedAvatar>,
) {
    // Settings handoff pre-seeds the cursor onto the carried-over avatar.
    let cursor = registry
        .order
        .iter()
        .position(|id| *id == selected.id)
        .unwrap_or(0);
    commands.insert_resource(AvatarSelectState { cursor });

    commands
        .spawn((
            AvatarSelectRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.07, 0.09, 0.16)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("PACELINE"),
                TextFont {
                    font_size: 52.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.5)),
            ));

            parent.spawn((
                Text::new("Choose Your Runner"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.75, 0.85)),
            ));

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(8.0),
                    ..default()
                })
                .with_children(|menu| {
                    for (i, id) in registry.order.iter().enumerate() {
                        let Some(def) = registry.get(id) else { continue };
                        menu.spawn((
                            AvatarSelectItem { index: i },
                            Node {
                                width: Val::Px(260.0),
                                height: Val::Px(44.0),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                column_gap: Val::Px(12.0),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.35)),
                            BorderColor(Color::NONE),
                        ))
                        .with_children(|item| {
                            // Color swatch standing in for the portrait.
                            item.spawn((
                                Node {
                                    width: Val::Px(20.0),
                                    height: Val::Px(28.0),
                                    ..default()
                                },
                                BackgroundColor(def.body_color),
                            ));
                            item.spawn((
                                Text::new(def.name.clone()),
                                TextFont {
                                    font_size: 20.0,
                                    ..default()
                                },
                                TextColor(Color::WHITE),
                            ));
                        });
                    }
                });

            parent.spawn((
                Text::new("Up/Down: Select | Enter: Run"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.45, 0.5, 0.6)),
            ));
        });
}

pub fn despawn_avatar_select(
    mut commands: Commands,
    query: Query<Entity, With<AvatarSelectRoot>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<AvatarSelectState>();
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE / INTERACTION
// ═══════════════════════════════════════════════════════════════════════

pub fn update_avatar_select_visuals(
    state: Option<Res<AvatarSelectState>>,
    registry: Res<AvatarRegistry>,
    mut query: Query<(&AvatarSelectItem, &mut BorderColor)>,
) {
    let Some(state) = state else { return };
    for (item, mut border) in &mut query {
        if item.index == state.cursor {
            let trim = registry
                .order
                .get(item.index)
                .and_then(|id| registry.get(id))
                .map(|def| def.trim_color)
                .unwrap_or(Color::WHITE);
            *border = BorderColor(trim);
        } else {
            *border = BorderColor(Color::NONE);
        }
    }
}

pub fn avatar_select_navigation(
    input: Res<RunnerInput>,
    registry: Res<AvatarRegistry>,
    mut state: Option<ResMut<AvatarSelectState>>,
    mut selected: ResMut<SelectedAvatar>,
    mut next_state: ResMut<NextState<GameState>>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let Some(ref mut state) = state else { return };
    if registry.order.is_empty() {
        return;
    }

    if input.ui_down && state.cursor < registry.order.len() - 1 {
        state.cursor += 1;
        sfx.send(PlaySfxEvent::new(SfxId::MenuMove));
    }
    if input.ui_up && state.cursor > 0 {
        state.cursor -= 1;
        sfx.send(PlaySfxEvent::new(SfxId::MenuMove));
    }

    if input.ui_confirm {
        if let Some(id) = registry.order.get(state.cursor) {
            selected.id = id.clone();
            sfx.send(PlaySfxEvent::new(SfxId::MenuSelect));
            next_state.set(GameState::Playing);
        }
    }
}
