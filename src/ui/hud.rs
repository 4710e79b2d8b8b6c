use bevy::prelude::*;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
pub struct HealthGaugeFill;

#[derive(Component)]
pub struct HealthPercentText;

#[derive(Component)]
pub struct BuffStatusText;

#[derive(Component)]
pub struct MagnetButtonLabel;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            // Score + party counter, top left.
            parent
                .spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(12.0),
                        top: Val::Px(10.0),
                        padding: UiRect::all(Val::Px(6.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.45)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        ScoreText,
                        Text::new("COINS 0  PARTY 1/20"),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.9, 0.5)),
                    ));
                });

            // Buff/weather status lines, top right.
            parent
                .spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        right: Val::Px(40.0),
                        top: Val::Px(10.0),
                        padding: UiRect::all(Val::Px(6.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.45)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        BuffStatusText,
                        Text::new(""),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.8, 0.9, 1.0)),
                    ));
                });

            // Vertical health gauge, right edge, fill anchored at the bottom.
            parent
                .spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        right: Val::Px(12.0),
                        top: Val::Px(60.0),
                        width: Val::Px(18.0),
                        height: Val::Px(120.0),
                        flex_direction: FlexDirection::ColumnReverse,
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
                    BorderColor(Color::srgb(0.35, 0.4, 0.5)),
                ))
                .with_children(|gauge| {
                    gauge.spawn((
                        HealthGaugeFill,
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(Color::srgb(0.3, 0.85, 0.4)),
                    ));
                });

            // Percent readout under the gauge.
            parent.spawn((
                HealthPercentText,
                Node {
                    position_type: PositionType::Absolute,
                    right: Val::Px(6.0),
                    top: Val::Px(184.0),
                    ..default()
                },
                Text::new("100%"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.85, 0.9)),
            ));

            // Magnet toggle button label (the M key's on-screen face).
            parent
                .spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        right: Val::Px(8.0),
                        top: Val::Px(206.0),
                        padding: UiRect::axes(Val::Px(6.0), Val::Px(3.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
                    BorderColor(Color::srgb(0.35, 0.4, 0.5)),
                ))
                .with_children(|button| {
                    button.spawn((
                        MagnetButtonLabel,
                        Text::new("MAGNET"),
                        TextFont {
                            font_size: 11.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.5, 0.55, 0.65)),
                    ));
                });

            // Key help, bottom.
            parent.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(6.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                Text::new(
                    "Arrows: Run  Space: Jump  Shift: Sprint  R: Potion  \
                     M: Magnet  U: Auto  K: Sprint Lock  N: Rain  G/F: Shout",
                ),
                TextFont {
                    font_size: 11.0,
                    ..default()
                },
                TextColor(Color::srgb(0.5, 0.55, 0.65)),
            ));
        });
}

pub fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_score_display(
    wallet: Res<Wallet>,
    roster: Res<PartyRoster>,
    mut query: Query<&mut Text, With<ScoreText>>,
) {
    let Ok(mut text) = query.get_single_mut() else { return };
    text.0 = format!(
        "COINS {}  PARTY {}/{}",
        wallet.coins,
        roster.len(),
        MAX_PARTY_SIZE
    );
}

pub fn update_health_gauge(
    health: Res<HealthMeter>,
    mut query: Query<(&mut Node, &mut BackgroundColor), With<HealthGaugeFill>>,
    mut percent_query: Query<&mut Text, With<HealthPercentText>>,
) {
    let Ok((mut node, mut color)) = query.get_single_mut() else { return };
    let percent = health.percent();
    if let Ok(mut text) = percent_query.get_single_mut() {
        text.0 = format!("{}%", percent);
    }
    node.height = Val::Percent(percent as f32);
    color.0 = if percent > 66 {
        Color::srgb(0.3, 0.85, 0.4)
    } else if percent > 33 {
        Color::srgb(0.95, 0.75, 0.25)
    } else {
        Color::srgb(0.9, 0.25, 0.2)
    };
}

pub fn update_buff_status(
    time: Res<Time>,
    buffs: Res<BuffWindows>,
    rain: Res<RainCycle>,
    mut query: Query<&mut Text, With<BuffStatusText>>,
    mut magnet_query: Query<&mut TextColor, With<MagnetButtonLabel>>,
) {
    let Ok(mut text) = query.get_single_mut() else { return };
    let now = now_ms(&time);

    if let Ok(mut label) = magnet_query.get_single_mut() {
        label.0 = if buffs.is_active(BuffKind::Magnet, now) {
            Color::srgb(0.3, 0.95, 0.75)
        } else {
            Color::srgb(0.5, 0.55, 0.65)
        };
    }

    let mut lines = Vec::new();
    if buffs.magnet_manual {
        lines.push("MAGNET ON".to_string());
    } else if buffs.is_active(BuffKind::Magnet, now) {
        lines.push(format!(
            "MAGNET {}s",
            buffs.remaining_secs(BuffKind::Magnet, now)
        ));
    }
    if buffs.auto_run_manual {
        lines.push("AUTO RUN ON".to_string());
    } else if buffs.is_active(BuffKind::AutoRun, now) {
        lines.push(format!(
            "AUTO RUN {}s",
            buffs.remaining_secs(BuffKind::AutoRun, now)
        ));
    }
    if buffs.sprint_manual {
        lines.push("SPRINT LOCK".to_string());
    }
    if rain.manual {
        lines.push("RAIN PINNED".to_string());
    }

    text.0 = lines.join("\n");
}
