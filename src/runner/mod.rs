//! Leader motion and the shared animation clock.
//!
//! The leader stays horizontally fixed at screen center; the signed scroll
//! speed it computes here is what the spawner, meter drain, formation sway,
//! and footstep cadence all key off.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub struct RunnerPlugin;

impl Plugin for RunnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), (spawn_leader, spawn_backdrop));
        app.add_systems(
            Update,
            (
                leader_motion,
                sync_animation_clocks,
                advance_animation_clocks,
                scroll_backdrop,
            )
                .chain()
                .in_set(TickSet::Drive),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// One vertical parallax stripe of the looping backdrop.
#[derive(Component, Debug)]
pub struct BackdropStripe {
    pub width: f32,
}

/// Marker for the static ground bar.
#[derive(Component, Debug)]
pub struct GroundBar;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

/// Spawns the leader once per session. Re-entering Playing after a pause
/// must not produce a second runner.
fn spawn_leader(
    mut commands: Commands,
    selected: Res<SelectedAvatar>,
    registry: Res<AvatarRegistry>,
    mut roster: ResMut<PartyRoster>,
    existing: Query<(), With<Leader>>,
) {
    if !existing.is_empty() {
        return;
    }

    // The selection step guarantees a registered id, but an absent or
    // unrecognized one still degrades to the default avatar, never a panic.
    let def = registry
        .get(&selected.id)
        .or_else(|| registry.get(DEFAULT_AVATAR))
        .cloned();
    let Some(def) = def else {
        warn!("spawn_leader: avatar registry is empty; no leader spawned");
        return;
    };

    let mut rng = rand::thread_rng();
    let idle_start = roster.allocate_idle_start(&def.id);

    let entity = commands
        .spawn((
            Leader,
            PartyMember {
                avatar_id: def.id.clone(),
                scale: 1.0,
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
                idle_start_frame: idle_start,
            },
            LeaderMotion::default(),
            AnimClock::default(),
            Sprite {
                color: def.body_color,
                custom_size: Some(Vec2::new(24.0, def.sprite_height)),
                ..default()
            },
            Transform::from_xyz(0.0, GROUND_Y + def.sprite_height * 0.5, Z_PARTY_BASE),
        ))
        .id();

    roster.members.insert(0, entity);
    info!("Leader spawned as '{}'", def.id);
}

/// Flat-color stand-in for the scrolling background art: a row of looping
/// stripes plus a static ground bar.
fn spawn_backdrop(mut commands: Commands, existing: Query<(), With<BackdropStripe>>) {
    if !existing.is_empty() {
        return;
    }

    let stripe_w = 160.0;
    let count = (SCREEN_WIDTH / stripe_w) as i32 + 2;
    for i in 0..count {
        let shade = if i % 2 == 0 { 0.13 } else { 0.16 };
        commands.spawn((
            BackdropStripe { width: stripe_w },
            Sprite {
                color: Color::srgb(shade, shade + 0.02, shade + 0.06),
                custom_size: Some(Vec2::new(stripe_w, SCREEN_HEIGHT)),
                ..default()
            },
            Transform::from_xyz(
                -SCREEN_WIDTH * 0.5 + stripe_w * (i as f32 + 0.5),
                0.0,
                Z_BACKGROUND,
            ),
        ));
    }

    commands.spawn((
        GroundBar,
        Sprite {
            color: Color::srgb(0.20, 0.17, 0.14),
            custom_size: Some(Vec2::new(SCREEN_WIDTH, 24.0)),
            ..default()
        },
        Transform::from_xyz(0.0, GROUND_Y - 12.0, Z_BACKGROUND + 1.0),
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// MOTION
// ═══════════════════════════════════════════════════════════════════════

/// Input → signed scroll speed, jump impulse, gravity, facing.
///
/// Sprint doubles the scroll speed but is hard-gated by the health meter:
/// at zero health neither the held key nor the manual flag sprints.
fn leader_motion(
    time: Res<Time>,
    input: Res<RunnerInput>,
    buffs: Res<BuffWindows>,
    meter: Res<HealthMeter>,
    mut query: Query<(&mut LeaderMotion, &mut Transform, &PartyMember), With<Leader>>,
) {
    let Ok((mut motion, mut transform, member)) = query.get_single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let now = now_ms(&time);

    let sprint_active = (input.sprint_held || buffs.sprint_manual) && meter.can_sprint();
    let speed = if sprint_active {
        MOVE_SPEED * SPRINT_MULTIPLIER
    } else {
        MOVE_SPEED
    };

    // Held direction wins over auto-run; auto-run keeps the party moving
    // rightward with no input at all.
    motion.scroll_speed = if input.move_axis < 0.0 {
        -speed
    } else if input.move_axis > 0.0 {
        speed
    } else if buffs.is_active(BuffKind::AutoRun, now) {
        speed
    } else {
        0.0
    };

    if motion.scroll_speed != 0.0 {
        motion.facing = motion.scroll_speed.signum();
    }

    // Vertical: impulse on jump, gravity while airborne, rest on ground.
    if input.jump && motion.grounded {
        motion.vertical_velocity = JUMP_VELOCITY;
        motion.grounded = false;
    }

    if !motion.grounded {
        motion.vertical_velocity -= GRAVITY * dt;
        transform.translation.y += motion.vertical_velocity * dt;

        let rest_y = GROUND_Y + leader_half_height(member);
        if transform.translation.y <= rest_y {
            transform.translation.y = rest_y;
            motion.vertical_velocity = 0.0;
            motion.grounded = true;
        }
    }
}

fn leader_half_height(member: &PartyMember) -> f32 {
    LEADER_FRAME_HEIGHT * member.scale * 0.5
}

// ═══════════════════════════════════════════════════════════════════════
// ANIMATION CLOCK
// ═══════════════════════════════════════════════════════════════════════

/// Decides run vs. idle and the playback rate for every member. All members
/// mirror the leader's grounded-and-moving state; only the idle clip start
/// frame differs per member.
fn sync_animation_clocks(
    input: Res<RunnerInput>,
    buffs: Res<BuffWindows>,
    meter: Res<HealthMeter>,
    leader_query: Query<&LeaderMotion, With<Leader>>,
    mut members: Query<(&mut AnimClock, &PartyMember)>,
) {
    let Ok(motion) = leader_query.get_single() else {
        return;
    };

    let running = motion.grounded && motion.moving_horizontally();
    let sprint_active = (input.sprint_held || buffs.sprint_manual) && meter.can_sprint();
    let rate = if sprint_active { 2.0 } else { 1.0 };

    for (mut clock, member) in &mut members {
        if running != clock.running {
            clock.running = running;
            clock.accumulator = 0.0;
            // Idle restarts from the member's assigned phase offset; the
            // run clip always starts from its first frame.
            clock.frame = if running { 0 } else { member.idle_start_frame };
        }
        clock.rate = if running { rate } else { 1.0 };
    }
}

/// Advances every member's clock at ANIM_FPS × rate and reports each leader
/// run-clip frame advance — the footstep synchronizer's event source.
fn advance_animation_clocks(
    time: Res<Time>,
    mut members: Query<(&mut AnimClock, Option<&Leader>)>,
    mut run_frames: EventWriter<RunFrameEvent>,
) {
    let dt = time.delta_secs();

    for (mut clock, leader) in &mut members {
        let frame_count = if clock.running {
            RUN_FRAME_COUNT
        } else {
            IDLE_FRAME_COUNT
        };

        clock.accumulator += dt * ANIM_FPS * clock.rate;
        while clock.accumulator >= 1.0 {
            clock.accumulator -= 1.0;
            clock.frame = (clock.frame + 1) % frame_count;

            if leader.is_some() && clock.running {
                run_frames.send(RunFrameEvent {
                    frame: clock.frame,
                    rate: clock.rate,
                });
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BACKDROP SCROLL
// ═══════════════════════════════════════════════════════════════════════

/// Parallax: stripes drift opposite to the run direction at a fraction of
/// the scroll speed and wrap around the screen edges.
fn scroll_backdrop(
    time: Res<Time>,
    leader_query: Query<&LeaderMotion, With<Leader>>,
    mut stripes: Query<(&BackdropStripe, &mut Transform)>,
) {
    let Ok(motion) = leader_query.get_single() else {
        return;
    };
    if !motion.moving_horizontally() {
        return;
    }

    let shift = -motion.scroll_speed * BG_SCROLL_FACTOR * time.delta_secs();
    let half = SCREEN_WIDTH * 0.5;

    for (stripe, mut transform) in &mut stripes {
        transform.translation.x += shift;
        if transform.translation.x < -half - stripe.width {
            transform.translation.x += SCREEN_WIDTH + stripe.width * 2.0;
        } else if transform.translation.x > half + stripe.width {
            transform.translation.x -= SCREEN_WIDTH + stripe.width * 2.0;
        }
    }
}
