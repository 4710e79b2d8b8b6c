//! Party roster and the sway formation.
//!
//! Followers trail the leader in a centered line, weave on a per-member
//! sine phase while moving, and ease toward their targets with a
//! frame-time-scaled lerp so the formation feels identical at any frame
//! rate. Members join via RecruitEvent and never leave mid-run.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub struct PartyPlugin;

impl Plugin for PartyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PartyRoster>();
        app.add_systems(
            Update,
            (handle_recruits, update_formation, update_tilt)
                .chain()
                .in_set(TickSet::Formation),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FORMATION KERNEL
// ═══════════════════════════════════════════════════════════════════════

/// Target offset from the leader for the follower at `rank` (0-based among
/// followers). The sway terms only contribute while the party is moving;
/// the vertical amplitude ships at zero but the cosine stays live as a
/// tunable. The size compensation keeps differently scaled sprites'
/// feet on the same line.
pub fn formation_target(
    rank: usize,
    follower_count: usize,
    t_secs: f32,
    phase: f32,
    moving: bool,
    leader_scale: f32,
    member_scale: f32,
) -> Vec2 {
    let spread = rank as f32 - (follower_count.saturating_sub(1)) as f32 * 0.5;
    let base_x = spread * PARTY_BASE_SPACING_X;

    let (sway_x, sway_y) = if moving {
        let freq = PARTY_SWAY_BASE_SPEED + rank as f32 * 0.03;
        (
            (t_secs * freq + phase).sin() * PARTY_SWAY_X,
            (t_secs * (PARTY_SWAY_BASE_SPEED * 1.14 + rank as f32 * 0.03) + phase).cos()
                * PARTY_SWAY_Y,
        )
    } else {
        (0.0, 0.0)
    };

    let size_y = (leader_scale - member_scale) * LEADER_FRAME_HEIGHT * 0.5;

    Vec2::new(base_x + sway_x, sway_y + size_y)
}

/// Frame-rate-independent smoothing strength for one tick.
pub fn follow_lerp_factor(dt_secs: f32) -> f32 {
    (PARTY_FOLLOW_LERP_BASE + dt_secs * PARTY_FOLLOW_LERP_DT).min(1.0)
}

/// Follower scale: leader scale × a random size ratio × a normalization
/// ratio that pulls visually taller or shorter avatar art toward the
/// leader's apparent size.
pub fn follower_scale(
    rng: &mut impl Rng,
    leader_scale: f32,
    leader_height: f32,
    member_height: f32,
) -> f32 {
    let random_ratio = rng.gen_range(FOLLOWER_MIN_SCALE_RATIO..FOLLOWER_MAX_SCALE_RATIO);
    let normalize =
        (leader_height / member_height).clamp(FOLLOWER_NORMALIZE_MIN, FOLLOWER_NORMALIZE_MAX);
    leader_scale * random_ratio * normalize
}

// ═══════════════════════════════════════════════════════════════════════
// RECRUITMENT
// ═══════════════════════════════════════════════════════════════════════

/// Consumes ally pickups. A full party or an unknown avatar id produces no
/// member, no FX, and no sound — the failure is silent by design of the
/// error surface.
fn handle_recruits(
    mut commands: Commands,
    mut events: EventReader<RecruitEvent>,
    mut roster: ResMut<PartyRoster>,
    registry: Res<AvatarRegistry>,
    leader_query: Query<(&Transform, &PartyMember), With<Leader>>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut fx: EventWriter<FloatingTextEvent>,
) {
    for event in events.read() {
        if roster.is_full() {
            debug!("Recruit '{}' skipped: party at cap", event.avatar_id);
            continue;
        }
        let Some(def) = registry.get(&event.avatar_id).cloned() else {
            warn!("Recruit skipped: unknown avatar '{}'", event.avatar_id);
            continue;
        };
        let Ok((leader_tf, leader_member)) = leader_query.get_single() else {
            continue;
        };
        let leader_height = registry
            .get(&leader_member.avatar_id)
            .map(|d| d.sprite_height)
            .unwrap_or(LEADER_FRAME_HEIGHT);

        let mut rng = rand::thread_rng();
        let scale = follower_scale(
            &mut rng,
            leader_member.scale,
            leader_height,
            def.sprite_height,
        );
        let idle_start = roster.allocate_idle_start(&def.id);
        let rank = roster.len(); // joining follower's rank + 1

        let entity = commands
            .spawn((
                PartyMember {
                    avatar_id: def.id.clone(),
                    scale,
                    phase: rng.gen_range(0.0..std::f32::consts::TAU),
                    idle_start_frame: idle_start,
                },
                AnimClock::default(),
                Sprite {
                    color: def.body_color,
                    custom_size: Some(Vec2::new(24.0, def.sprite_height)),
                    ..default()
                },
                Transform {
                    translation: Vec3::new(
                        leader_tf.translation.x,
                        leader_tf.translation.y,
                        Z_PARTY_BASE - rank as f32 * 0.1,
                    ),
                    scale: Vec3::splat(scale),
                    ..default()
                },
            ))
            .id();

        roster.members.push(entity);
        info!(
            "'{}' joined the party ({} members, scale {:.2})",
            def.id,
            roster.len(),
            scale
        );

        sfx.send(PlaySfxEvent::new(SfxId::AllyJoin));
        fx.send(FloatingTextEvent {
            text: format!("{} JOIN!", def.name.to_uppercase()),
            at: leader_tf.translation.truncate() + Vec2::new(0.0, 50.0),
            color: def.trim_color,
            font_size: 20.0,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FORMATION UPDATE
// ═══════════════════════════════════════════════════════════════════════

/// Eases every follower toward its formation target. Depth shifts slightly
/// with the sway so the line weaves in front of and behind the leader.
fn update_formation(
    time: Res<Time>,
    roster: Res<PartyRoster>,
    leader_query: Query<(&Transform, &PartyMember, &LeaderMotion), With<Leader>>,
    mut followers: Query<(&mut Transform, &PartyMember), Without<Leader>>,
) {
    if roster.len() < 2 {
        return;
    }
    let Ok((leader_tf, leader_member, motion)) = leader_query.get_single() else {
        return;
    };

    let t = time.elapsed_secs();
    let factor = follow_lerp_factor(time.delta_secs());
    let moving = motion.moving_horizontally();
    let follower_count = roster.len() - 1;

    for (rank, &entity) in roster.members[1..].iter().enumerate() {
        let Ok((mut transform, member)) = followers.get_mut(entity) else {
            continue;
        };

        let offset = formation_target(
            rank,
            follower_count,
            t,
            member.phase,
            moving,
            leader_member.scale,
            member.scale,
        );
        let target = leader_tf.translation.truncate() + offset;

        let current = transform.translation.truncate();
        let next = current.lerp(target, factor);
        transform.translation.x = next.x;
        transform.translation.y = next.y;

        // Pseudo-3D weave: drift through the depth band with the sway.
        let weave = if moving {
            (offset.x - (rank as f32 - (follower_count - 1) as f32 * 0.5) * PARTY_BASE_SPACING_X)
                / PARTY_SWAY_X
        } else {
            0.0
        };
        transform.translation.z = Z_PARTY_BASE - (rank as f32 + 1.0) * 0.1 + weave * 0.04;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILT
// ═══════════════════════════════════════════════════════════════════════

/// All members lean into the jump: rotation eases toward a fixed forward
/// tilt while airborne and back to upright once grounded.
fn update_tilt(
    roster: Res<PartyRoster>,
    leader_query: Query<&LeaderMotion, With<Leader>>,
    mut members: Query<&mut Transform, With<PartyMember>>,
) {
    let Ok(motion) = leader_query.get_single() else {
        return;
    };

    let target = if motion.grounded {
        0.0
    } else {
        // Leaning "forward" is a clockwise tilt when facing right.
        -motion.facing * JUMP_TILT_DEG.to_radians()
    };

    for &entity in &roster.members {
        let Ok(mut transform) = members.get_mut(entity) else {
            continue;
        };
        let current = transform.rotation.to_euler(EulerRot::ZYX).0;
        let eased = current + (target - current) * TILT_EASE;
        transform.rotation = Quat::from_rotation_z(eased);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn single_follower_centers_behind_the_leader() {
        let offset = formation_target(0, 1, 0.0, 0.0, false, 1.0, 1.0);
        assert_eq!(offset.x, 0.0);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn ranks_spread_symmetrically() {
        // Three followers: ranks at -1, 0, +1 spacing steps.
        let left = formation_target(0, 3, 0.0, 0.0, false, 1.0, 1.0);
        let mid = formation_target(1, 3, 0.0, 0.0, false, 1.0, 1.0);
        let right = formation_target(2, 3, 0.0, 0.0, false, 1.0, 1.0);
        assert_eq!(left.x, -PARTY_BASE_SPACING_X);
        assert_eq!(mid.x, 0.0);
        assert_eq!(right.x, PARTY_BASE_SPACING_X);
    }

    #[test]
    fn sway_only_applies_while_moving() {
        let still = formation_target(2, 5, 12.3, 1.0, false, 1.0, 1.0);
        let moving = formation_target(2, 5, 12.3, 1.0, true, 1.0, 1.0);
        assert_eq!(still.x, PARTY_BASE_SPACING_X * 0.0);
        assert!((moving.x - still.x).abs() <= PARTY_SWAY_X + 1e-3);
        assert_ne!(moving.x, still.x);
    }

    #[test]
    fn smaller_members_ride_lower_to_align_feet() {
        let small = formation_target(0, 1, 0.0, 0.0, false, 1.0, 0.8);
        let large = formation_target(0, 1, 0.0, 0.0, false, 1.0, 1.2);
        assert!(small.y > 0.0);
        assert!(large.y < 0.0);
        assert!((small.y - (1.0 - 0.8) * LEADER_FRAME_HEIGHT * 0.5).abs() < 1e-5);
    }

    #[test]
    fn lerp_factor_scales_with_frame_time_and_clamps() {
        assert!(follow_lerp_factor(0.0) == PARTY_FOLLOW_LERP_BASE);
        assert!(follow_lerp_factor(1.0 / 60.0) > follow_lerp_factor(1.0 / 120.0));
        assert_eq!(follow_lerp_factor(100.0), 1.0);
    }

    #[test]
    fn follower_scales_stay_in_the_normalized_band() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            // Extreme art heights get clamped by the normalization ratio.
            let s = follower_scale(&mut rng, 1.0, 34.0, 10.0);
            assert!(s <= FOLLOWER_MAX_SCALE_RATIO * FOLLOWER_NORMALIZE_MAX);
            let s = follower_scale(&mut rng, 1.0, 34.0, 200.0);
            assert!(s >= FOLLOWER_MIN_SCALE_RATIO * FOLLOWER_NORMALIZE_MIN);
        }
    }

    #[test]
    fn idle_start_frames_walk_coprime_steps() {
        let mut roster = PartyRoster::default();
        let first = roster.allocate_idle_start("redhat");
        let second = roster.allocate_idle_start("redhat");
        let third = roster.allocate_idle_start("redhat");
        assert_eq!(first, 0);
        assert_eq!(second, 7);
        assert_eq!(third, 14);
        // A different kind starts its own sequence.
        assert_eq!(roster.allocate_idle_start("bluehair"), 0);
    }
}
