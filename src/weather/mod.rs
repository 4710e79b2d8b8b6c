//! Rain cycle state machine and the pooled drop field.
//!
//! The cycle flips between raining and dry on randomized dwell timers
//! unless the manual override is set, in which case the deadline is
//! simply ignored until the override clears. Drops are spawned once and
//! recycled, never allocated mid-session.

use bevy::prelude::*;
use rand::{thread_rng, Rng};

use crate::shared::*;

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RainCycle>();
        app.add_systems(OnEnter(GameState::Playing), spawn_rain_pool);
        app.add_systems(
            Update,
            (advance_rain_cycle, fall_rain_drops)
                .chain()
                .in_set(TickSet::Weather),
        );
    }
}

#[derive(Component, Debug)]
pub struct RainDrop {
    pub fall_speed: f32,
    pub drift: f32,
}

/// Picks the next dwell deadline for the state the cycle just entered.
pub fn schedule_rain_toggle(rng: &mut impl Rng, now: f64, raining: bool) -> f64 {
    let dwell = if raining {
        rng.gen_range(RAIN_MIN_ON_MS..RAIN_MAX_ON_MS)
    } else {
        rng.gen_range(RAIN_MIN_OFF_MS..RAIN_MAX_OFF_MS)
    };
    now + dwell
}

fn spawn_rain_pool(mut commands: Commands, existing: Query<(), With<RainDrop>>) {
    if !existing.is_empty() {
        return;
    }

    let mut rng = thread_rng();
    for _ in 0..RAIN_DROP_COUNT {
        let length = rng.gen_range(8.0..14.0_f32);
        let alpha = rng.gen_range(0.18..0.45_f32);
        commands.spawn((
            RainDrop {
                fall_speed: rng.gen_range(680.0..980.0),
                drift: rng.gen_range(-70.0..-25.0),
            },
            Sprite {
                color: Color::srgba(0.65, 0.75, 0.95, alpha),
                custom_size: Some(Vec2::new(1.5, length)),
                ..default()
            },
            Transform::from_xyz(
                rng.gen_range(-SCREEN_WIDTH / 2.0..SCREEN_WIDTH / 2.0),
                rng.gen_range(-SCREEN_HEIGHT / 2.0..SCREEN_HEIGHT / 2.0),
                Z_RAIN,
            ),
        ));
    }
    info!("Rain pool ready: {} drops", RAIN_DROP_COUNT);
}

/// Flips the cycle at its deadline and reschedules. Manual override
/// freezes the machine entirely; clearing it re-arms from whatever state
/// the override left behind.
fn advance_rain_cycle(time: Res<Time>, mut cycle: ResMut<RainCycle>) {
    if cycle.manual {
        return;
    }
    let now = now_ms(&time);
    if now < cycle.next_toggle_ms {
        return;
    }
    cycle.raining = !cycle.raining;
    cycle.next_toggle_ms = schedule_rain_toggle(&mut thread_rng(), now, cycle.raining);
    info!(
        "Rain {} (next toggle in {:.1}s)",
        if cycle.raining { "started" } else { "stopped" },
        (cycle.next_toggle_ms - now) / 1000.0
    );
}

/// Streaks the drops downward with a leftward drift, recycling each one
/// to a fresh column above the screen when it leaves the bottom or drifts
/// off the left edge. Dry spells hide the pool instead of despawning it.
fn fall_rain_drops(
    time: Res<Time>,
    cycle: Res<RainCycle>,
    mut drops: Query<(&RainDrop, &mut Transform, &mut Visibility)>,
) {
    let dt = time.delta_secs();
    let mut rng = thread_rng();

    for (drop, mut transform, mut visibility) in &mut drops {
        *visibility = if cycle.raining {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if !cycle.raining {
            continue;
        }

        transform.translation.y -= drop.fall_speed * dt;
        transform.translation.x += drop.drift * dt;

        if drop_off_screen(transform.translation) {
            transform.translation.y = SCREEN_HEIGHT / 2.0 + rng.gen_range(0.0..40.0);
            transform.translation.x =
                rng.gen_range(-SCREEN_WIDTH / 2.0..SCREEN_WIDTH / 2.0 + 80.0);
        }
    }
}

/// A drop is spent once it falls past the bottom or drifts off the left
/// edge; the spawn band overshoots the right edge to feed the drift.
pub fn drop_off_screen(translation: Vec3) -> bool {
    translation.y < -SCREEN_HEIGHT / 2.0 - 20.0 || translation.x < -SCREEN_WIDTH / 2.0 - 40.0
}
