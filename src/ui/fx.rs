//! Floating feedback labels ("+10!", "MAGNET 30s", …) — small world-space
//! texts that rise from the collection point and fade out.

use bevy::prelude::*;
use crate::shared::*;

const FLOAT_LIFETIME_SEC: f32 = 0.9;
const FLOAT_RISE_PX: f32 = 52.0;

/// Component on the floating label entity.
#[derive(Component)]
pub struct FloatingLabel {
    pub timer: Timer,
    pub start_y: f32,
}

/// Spawn label texts in response to FloatingTextEvent.
pub fn spawn_floating_text(mut events: EventReader<FloatingTextEvent>, mut commands: Commands) {
    for event in events.read() {
        commands.spawn((
            FloatingLabel {
                timer: Timer::from_seconds(FLOAT_LIFETIME_SEC, TimerMode::Once),
                start_y: event.at.y,
            },
            Text2d::new(event.text.clone()),
            TextFont {
                font_size: event.font_size,
                ..default()
            },
            TextColor(event.color),
            Transform::from_xyz(event.at.x, event.at.y, Z_FX),
        ));
    }
}

/// Float labels upward and fade them out over their lifetime.
pub fn update_floating_text(
    time: Res<Time>,
    mut commands: Commands,
    mut labels: Query<(Entity, &mut FloatingLabel, &mut Transform, &mut TextColor)>,
) {
    for (entity, mut label, mut transform, mut color) in &mut labels {
        label.timer.tick(time.delta());
        if label.timer.finished() {
            commands.entity(entity).despawn_recursive();
            continue;
        }
        let progress = label.timer.fraction();
        transform.translation.y = label.start_y + FLOAT_RISE_PX * progress;
        // Hold full opacity for the first half, then fade.
        let alpha = if progress < 0.5 {
            1.0
        } else {
            1.0 - (progress - 0.5) * 2.0
        };
        color.0 = color.0.with_alpha(alpha);
    }
}
