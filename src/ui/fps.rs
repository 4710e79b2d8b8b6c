use bevy::prelude::*;

use crate::shared::FPS_UPDATE_INTERVAL_MS;

#[derive(Component)]
pub struct FpsText;

#[derive(Default)]
pub struct FpsSample {
    pub smoothed_dt: f32,
    pub last_refresh_ms: f64,
}

pub fn spawn_fps_overlay(mut commands: Commands) {
    commands.spawn((
        FpsText,
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(6.0),
            bottom: Val::Px(4.0),
            ..default()
        },
        Text::new("-- fps"),
        TextFont {
            font_size: 11.0,
            ..default()
        },
        TextColor(Color::srgb(0.45, 0.8, 0.45)),
    ));
}

/// Exponentially smoothed frame time, refreshed on a coarse interval so
/// the readout doesn't flicker. Runs on the real clock so it stays live
/// while the session is paused.
pub fn update_fps_overlay(
    time: Res<Time<Real>>,
    mut sample: Local<FpsSample>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    sample.smoothed_dt = if sample.smoothed_dt == 0.0 {
        dt
    } else {
        sample.smoothed_dt * 0.9 + dt * 0.1
    };

    let now = time.elapsed_secs_f64() * 1000.0;
    if now - sample.last_refresh_ms < FPS_UPDATE_INTERVAL_MS {
        return;
    }
    sample.last_refresh_ms = now;

    let Ok(mut text) = query.get_single_mut() else { return };
    text.0 = format!("{:.0} fps", 1.0 / sample.smoothed_dt);
}
