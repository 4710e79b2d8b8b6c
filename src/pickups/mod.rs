//! Coin/item spawning, scroll motion, magnet steering, and collection.
//!
//! Spawn-kind selection is an ordered rule list (ally → auto-run → magnet →
//! coin tiers) so the tie-break order is fixed and testable. Collection
//! pairs a plain overlap test with a swept X-range test that catches
//! pickups tunneling past the hitbox between frames at sprint speed.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub struct PickupPlugin;

impl Plugin for PickupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnDirector>();
        app.add_systems(
            Update,
            (schedule_spawns, move_pickups, collect_pickups, despawn_out_of_bounds)
                .chain()
                .in_set(TickSet::Spawn),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN KIND SELECTION — ordered, mutually exclusive rules
// ═══════════════════════════════════════════════════════════════════════

/// What a single non-burst spawn slot should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnChoice {
    Pickup(PickupKind),
    Ally(AvatarId),
}

/// Rolls the spawn kind for a normal (non-burst) slot. Each category rolls
/// independently and the first hit wins; coins are the fallthrough.
pub fn roll_spawn_kind(
    rng: &mut impl Rng,
    party_full: bool,
    auto_run_active: bool,
    magnet_active: bool,
    avatar_order: &[AvatarId],
) -> SpawnChoice {
    if !party_full
        && !avatar_order.is_empty()
        && rng.gen_range(0..100) < ALLY_ITEM_CHANCE_PERCENT
    {
        let pick = rng.gen_range(0..avatar_order.len());
        return SpawnChoice::Ally(avatar_order[pick].clone());
    }
    if !auto_run_active && rng.gen_range(0..100) < AUTO_ITEM_CHANCE_PERCENT {
        return SpawnChoice::Pickup(PickupKind::AutoRunItem);
    }
    if !magnet_active && rng.gen_range(0..100) < MAGNET_ITEM_CHANCE_PERCENT {
        return SpawnChoice::Pickup(PickupKind::MagnetItem);
    }
    SpawnChoice::Pickup(roll_coin_tier(rng))
}

/// Coin tier roll, shared by normal and burst spawns (kings and supers can
/// appear inside bursts).
pub fn roll_coin_tier(rng: &mut impl Rng) -> PickupKind {
    let roll = rng.gen_range(0..100);
    if roll < SUPER_KING_COIN_CHANCE_PERCENT {
        PickupKind::SuperKingCoin
    } else if roll < SUPER_KING_COIN_CHANCE_PERCENT + KING_COIN_CHANCE_PERCENT {
        PickupKind::KingCoin
    } else {
        PickupKind::Coin
    }
}

pub fn coin_value(kind: PickupKind) -> u32 {
    match kind {
        PickupKind::Coin => 1,
        PickupKind::KingCoin => KING_COIN_VALUE,
        PickupKind::SuperKingCoin => SUPER_KING_COIN_VALUE,
        _ => 0,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COLLISION KERNELS
// ═══════════════════════════════════════════════════════════════════════

/// Direct overlap against the player hitbox.
pub fn overlap_hit(player: Vec2, pickup: Vec2) -> bool {
    player.distance_squared(pickup) <= MAGNET_COLLECT_RADIUS * MAGNET_COLLECT_RADIUS
}

/// Supplemental sweep: the player's X sits inside the pickup's
/// previous-to-current X range (± tolerance) and the vertical separation
/// is small. Covers a pickup skipping the hitbox in one high-speed frame.
pub fn sweep_hit(player: Vec2, pickup_y: f32, prev_x: f32, cur_x: f32) -> bool {
    let min_x = prev_x.min(cur_x) - SWEEP_X_TOLERANCE;
    let max_x = prev_x.max(cur_x) + SWEEP_X_TOLERANCE;
    player.x >= min_x && player.x <= max_x && (pickup_y - player.y).abs() <= SWEEP_Y_MAX
}

/// Distance-proportional magnet pull speed with a floor so the last few
/// pixels never crawl.
pub fn magnet_pull_speed(distance: f32) -> f32 {
    (MAGNET_PULL_SPEED * (1.0 - distance / MAGNET_ATTRACT_RADIUS)).max(MAGNET_PULL_FLOOR)
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWNING
// ═══════════════════════════════════════════════════════════════════════

fn spawn_height(rng: &mut impl Rng) -> f32 {
    // One of two discrete levels: collectible while running, or only by jump.
    if rng.gen_range(0..2) == 0 {
        GROUND_Y + COIN_RUN_HEIGHT_OFFSET
    } else {
        GROUND_Y + COIN_JUMP_HEIGHT_OFFSET
    }
}

/// The spawn director. Idle gap 550–1200 ms; a 24% roll opens a burst of
/// 4–7 coins at one shared height with 85–140 ms gaps. Pickups enter from
/// the edge the leader is running toward; nothing spawns while standing
/// still.
fn schedule_spawns(
    mut commands: Commands,
    time: Res<Time>,
    mut director: ResMut<SpawnDirector>,
    buffs: Res<BuffWindows>,
    roster: Res<PartyRoster>,
    registry: Res<AvatarRegistry>,
    leader_query: Query<&LeaderMotion, With<Leader>>,
) {
    let Ok(motion) = leader_query.get_single() else {
        return;
    };
    let now = now_ms(&time);

    if !motion.moving_horizontally() {
        // Hold the deadline so resuming motion doesn't replay missed spawns.
        director.next_spawn_ms = director.next_spawn_ms.max(now);
        return;
    }
    if now < director.next_spawn_ms {
        return;
    }

    let mut rng = rand::thread_rng();
    let spawn_x = if motion.facing > 0.0 {
        SCREEN_WIDTH * 0.5 + PICKUP_SPAWN_LEAD
    } else {
        -SCREEN_WIDTH * 0.5 - PICKUP_SPAWN_LEAD
    };

    if director.burst_remaining > 0 {
        director.burst_remaining -= 1;
        let tier = roll_coin_tier(&mut rng);
        spawn_pickup(&mut commands, tier, None, spawn_x, director.burst_y, &registry);
        director.next_spawn_ms =
            now + rng.gen_range(COIN_BURST_MIN_GAP_MS..COIN_BURST_MAX_GAP_MS);
        return;
    }

    if rng.gen_range(0..100) < COIN_BURST_CHANCE_PERCENT {
        let count = rng.gen_range(COIN_BURST_MIN_COUNT..=COIN_BURST_MAX_COUNT);
        director.burst_y = spawn_height(&mut rng);
        director.burst_remaining = count - 1;
        let tier = roll_coin_tier(&mut rng);
        spawn_pickup(&mut commands, tier, None, spawn_x, director.burst_y, &registry);
        director.next_spawn_ms =
            now + rng.gen_range(COIN_BURST_MIN_GAP_MS..COIN_BURST_MAX_GAP_MS);
        debug!("Coin burst of {} started", count);
        return;
    }

    let y = spawn_height(&mut rng);
    let choice = roll_spawn_kind(
        &mut rng,
        roster.is_full(),
        buffs.is_active(BuffKind::AutoRun, now),
        buffs.is_active(BuffKind::Magnet, now),
        &registry.order,
    );
    match choice {
        SpawnChoice::Pickup(kind) => {
            spawn_pickup(&mut commands, kind, None, spawn_x, y, &registry)
        }
        SpawnChoice::Ally(avatar_id) => spawn_pickup(
            &mut commands,
            PickupKind::AllyItem,
            Some(avatar_id),
            spawn_x,
            y,
            &registry,
        ),
    }
    director.next_spawn_ms = now + rng.gen_range(COIN_SPAWN_MIN_MS..COIN_SPAWN_MAX_MS);
}

fn spawn_pickup(
    commands: &mut Commands,
    kind: PickupKind,
    ally: Option<AvatarId>,
    x: f32,
    y: f32,
    registry: &AvatarRegistry,
) {
    let (color, size) = match kind {
        PickupKind::Coin => (Color::srgb(0.98, 0.85, 0.25), 18.0),
        PickupKind::KingCoin => (Color::srgb(1.0, 0.72, 0.15), 26.0),
        PickupKind::SuperKingCoin => (Color::srgb(1.0, 0.5, 0.1), 34.0),
        PickupKind::MagnetItem => (Color::srgb(0.2, 0.85, 0.7), 24.0),
        PickupKind::AutoRunItem => (Color::srgb(0.65, 0.45, 0.95), 24.0),
        PickupKind::AllyItem => {
            let body = ally
                .as_deref()
                .and_then(|id| registry.get(id))
                .map(|def| def.body_color)
                .unwrap_or(Color::WHITE);
            (body, 26.0)
        }
    };

    commands.spawn((
        Pickup {
            kind,
            value: coin_value(kind),
            prev_x: x,
            ally,
        },
        Sprite {
            color,
            custom_size: Some(Vec2::splat(size)),
            ..default()
        },
        Transform::from_xyz(x, y, Z_PICKUP),
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// MOTION
// ═══════════════════════════════════════════════════════════════════════

/// Pickups scroll opposite to the run direction. While the magnet is
/// active, anything inside the attraction radius steers straight at the
/// player instead, faster the closer it gets.
fn move_pickups(
    time: Res<Time>,
    buffs: Res<BuffWindows>,
    leader_query: Query<(&LeaderMotion, &Transform), With<Leader>>,
    mut pickups: Query<(&mut Pickup, &mut Transform), Without<Leader>>,
) {
    let Ok((motion, leader_tf)) = leader_query.get_single() else {
        return;
    };
    let dt = time.delta_secs();
    let now = now_ms(&time);
    let magnet = buffs.is_active(BuffKind::Magnet, now);
    let player = leader_tf.translation.truncate();

    for (mut pickup, mut transform) in &mut pickups {
        pickup.prev_x = transform.translation.x;

        let pos = transform.translation.truncate();
        let to_player = player - pos;
        let dist = to_player.length();

        if magnet && dist < MAGNET_ATTRACT_RADIUS && dist > f32::EPSILON {
            let step = to_player / dist * magnet_pull_speed(dist) * dt;
            transform.translation.x += step.x;
            transform.translation.y += step.y;
        } else {
            transform.translation.x -= motion.scroll_speed * dt;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════

/// Overlap + sweep collection. Each hit applies its kind-specific side
/// effect exactly once and despawns the entity; plain coins get sound
/// only, everything else also floats a label.
fn collect_pickups(
    mut commands: Commands,
    mut wallet: ResMut<Wallet>,
    mut buffs: ResMut<BuffWindows>,
    time: Res<Time>,
    leader_query: Query<&Transform, With<Leader>>,
    pickups: Query<(Entity, &Pickup, &Transform), Without<Leader>>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut fx: EventWriter<FloatingTextEvent>,
    mut recruits: EventWriter<RecruitEvent>,
) {
    let Ok(leader_tf) = leader_query.get_single() else {
        return;
    };
    let player = leader_tf.translation.truncate();
    let now = now_ms(&time);

    for (entity, pickup, transform) in &pickups {
        let pos = transform.translation.truncate();
        let hit = overlap_hit(player, pos)
            || sweep_hit(player, pos.y, pickup.prev_x, transform.translation.x);
        if !hit {
            continue;
        }

        let above = pos + Vec2::new(0.0, 26.0);
        match pickup.kind {
            PickupKind::Coin => {
                wallet.earn(pickup.value);
                sfx.send(PlaySfxEvent::new(SfxId::Coin));
            }
            PickupKind::KingCoin => {
                wallet.earn(pickup.value);
                sfx.send(PlaySfxEvent::new(SfxId::KingCoin));
                fx.send(FloatingTextEvent {
                    text: format!("+{}!", pickup.value),
                    at: above,
                    color: Color::srgb(1.0, 0.8, 0.2),
                    font_size: 20.0,
                });
            }
            PickupKind::SuperKingCoin => {
                wallet.earn(pickup.value);
                sfx.send(PlaySfxEvent::new(SfxId::SuperKingCoin));
                fx.send(FloatingTextEvent {
                    text: format!("SUPER +{}!", pickup.value),
                    at: above,
                    color: Color::srgb(1.0, 0.55, 0.1),
                    font_size: 24.0,
                });
            }
            PickupKind::MagnetItem => {
                buffs.activate(BuffKind::Magnet, now);
                sfx.send(PlaySfxEvent::new(SfxId::Magnet));
                fx.send(FloatingTextEvent {
                    text: "MAGNET 30s".to_string(),
                    at: above,
                    color: Color::srgb(0.3, 0.95, 0.75),
                    font_size: 18.0,
                });
                info!("Magnet buff collected");
            }
            PickupKind::AutoRunItem => {
                buffs.activate(BuffKind::AutoRun, now);
                sfx.send(PlaySfxEvent::new(SfxId::Powerup));
                fx.send(FloatingTextEvent {
                    text: "AUTO RUN 60s".to_string(),
                    at: above,
                    color: Color::srgb(0.75, 0.55, 1.0),
                    font_size: 18.0,
                });
                info!("Auto-run buff collected");
            }
            PickupKind::AllyItem => {
                // The party domain owns the cap/registry check and all
                // success feedback; a full party degrades to nothing.
                if let Some(avatar_id) = pickup.ally.clone() {
                    recruits.send(RecruitEvent { avatar_id });
                }
            }
        }

        commands.entity(entity).despawn();
    }
}

/// Drops pickups that scrolled past the visible bounds plus margin.
fn despawn_out_of_bounds(
    mut commands: Commands,
    pickups: Query<(Entity, &Transform), With<Pickup>>,
) {
    let limit = SCREEN_WIDTH * 0.5 + PICKUP_DESPAWN_MARGIN;
    for (entity, transform) in &pickups {
        if transform.translation.x.abs() > limit {
            commands.entity(entity).despawn();
        }
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

    fn avatar_ids() -> Vec<AvatarId> {
        vec!["batcop".into(), "bluehair".into(), "redhat".into(), "redman".into()]
    }

    #[test]
    fn full_party_never_rolls_ally_items() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = avatar_ids();
        for _ in 0..2000 {
            let choice = roll_spawn_kind(&mut rng, true, false, false, &ids);
            assert!(!matches!(choice, SpawnChoice::Ally(_)));
        }
    }

    #[test]
    fn active_buffs_suppress_their_own_items() {
        let mut rng = StdRng::seed_from_u64(11);
        let ids = avatar_ids();
        for _ in 0..2000 {
            let choice = roll_spawn_kind(&mut rng, true, true, true, &ids);
            assert!(
                !matches!(
                    choice,
                    SpawnChoice::Pickup(PickupKind::AutoRunItem)
                        | SpawnChoice::Pickup(PickupKind::MagnetItem)
                ),
                "buff item rolled while that buff was active"
            );
        }
    }

    #[test]
    fn spawn_distribution_matches_the_rule_order() {
        let mut rng = StdRng::seed_from_u64(23);
        let ids = avatar_ids();
        let n = 40_000;
        let mut allies = 0usize;
        let mut supers = 0usize;
        let mut kings = 0usize;
        for _ in 0..n {
            match roll_spawn_kind(&mut rng, false, false, false, &ids) {
                SpawnChoice::Ally(_) => allies += 1,
                SpawnChoice::Pickup(PickupKind::SuperKingCoin) => supers += 1,
                SpawnChoice::Pickup(PickupKind::KingCoin) => kings += 1,
                _ => {}
            }
        }
        let ally_rate = allies as f64 / n as f64;
        assert!((0.16..0.20).contains(&ally_rate), "ally rate {}", ally_rate);
        // Coin tiers only roll after the three item rules all miss
        // (0.82 * 0.95 * 0.93 of spawns), so observed super/king rates sit
        // below their local 2% / 12%.
        let fallthrough = 0.82 * 0.95 * 0.93;
        let super_rate = supers as f64 / n as f64;
        let king_rate = kings as f64 / n as f64;
        assert!((super_rate - 0.02 * fallthrough).abs() < 0.005, "{}", super_rate);
        assert!((king_rate - 0.12 * fallthrough).abs() < 0.01, "{}", king_rate);
    }

    #[test]
    fn coin_values_per_tier() {
        assert_eq!(coin_value(PickupKind::Coin), 1);
        assert_eq!(coin_value(PickupKind::KingCoin), 10);
        assert_eq!(coin_value(PickupKind::SuperKingCoin), 30);
        assert_eq!(coin_value(PickupKind::MagnetItem), 0);
    }

    #[test]
    fn sweep_catches_a_tunneled_pickup() {
        let player = Vec2::new(0.0, GROUND_Y + 20.0);
        // Crossed from +60 to -60 in one frame: plain overlap missed it.
        assert!(sweep_hit(player, player.y + 10.0, 60.0, -60.0));
        // Same sweep but far above the player's head.
        assert!(!sweep_hit(player, player.y + 100.0, 60.0, -60.0));
        // Range that never reaches the player, tolerance included.
        assert!(!sweep_hit(player, player.y, 60.0, 15.0));
        // Tolerance pads the near edge.
        assert!(sweep_hit(player, player.y, 60.0, 10.0));
    }

    #[test]
    fn overlap_uses_the_collect_radius() {
        let player = Vec2::ZERO;
        assert!(overlap_hit(player, Vec2::new(MAGNET_COLLECT_RADIUS - 1.0, 0.0)));
        assert!(!overlap_hit(player, Vec2::new(MAGNET_COLLECT_RADIUS + 1.0, 0.0)));
    }

    #[test]
    fn magnet_pull_speeds_are_floored_and_scale_inward() {
        assert!((magnet_pull_speed(0.0) - MAGNET_PULL_SPEED).abs() < 1e-3);
        assert_eq!(magnet_pull_speed(MAGNET_ATTRACT_RADIUS), MAGNET_PULL_FLOOR);
        let near = magnet_pull_speed(40.0);
        let far = magnet_pull_speed(200.0);
        assert!(near > far);
        assert!(far >= MAGNET_PULL_FLOOR);
    }
}
