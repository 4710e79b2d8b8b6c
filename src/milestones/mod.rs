//! Score milestone detection and the serialized celebration queue.
//!
//! Detection and presentation are deliberately decoupled: one big
//! collection may enqueue several thresholds at once, but at most one
//! celebration card is ever in flight, and the queue drains itself as
//! each card finishes.

use bevy::prelude::*;
use crate::shared::*;

pub struct MilestonePlugin;

impl Plugin for MilestonePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MilestoneLedger>();
        app.add_systems(
            Update,
            (detect_milestones, play_next_celebration, retire_celebrations)
                .chain()
                .in_set(TickSet::Chatter),
        );
    }
}

/// The centered "<N> COINS!" card shown for one celebration.
#[derive(Component, Debug)]
pub struct CelebrationCard {
    pub expire_ms: f64,
}

/// Walks the ledger forward over every threshold the lifetime score has
/// crossed since last tick.
fn detect_milestones(wallet: Res<Wallet>, mut ledger: ResMut<MilestoneLedger>) {
    let before = ledger.queue.len();
    ledger.record(wallet.lifetime);
    let added = ledger.queue.len() - before;
    if added > 0 {
        info!(
            "Milestone detection: {} new threshold(s), next at {}",
            added, ledger.next_threshold
        );
    }
}

/// Starts the next queued celebration, but only when none is playing.
fn play_next_celebration(
    mut commands: Commands,
    time: Res<Time>,
    mut ledger: ResMut<MilestoneLedger>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if ledger.in_flight {
        return;
    }
    let Some(threshold) = ledger.queue.pop_front() else {
        return;
    };
    ledger.in_flight = true;

    sfx.send(PlaySfxEvent::new(SfxId::Milestone));
    info!("Milestone celebration: {} coins", threshold);

    commands
        .spawn((
            CelebrationCard {
                expire_ms: now_ms(&time) + MILESTONE_CARD_MS,
            },
            Sprite {
                color: Color::srgba(0.05, 0.05, 0.12, 0.8),
                custom_size: Some(Vec2::new(340.0, 110.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 60.0, Z_FX + 1.0),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(format!("{} COINS!", threshold)),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.85, 0.3)),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        });
}

/// Scales the card up slightly over its life, then releases the in-flight
/// slot so the next queued celebration can start on the following tick.
fn retire_celebrations(
    mut commands: Commands,
    time: Res<Time>,
    mut ledger: ResMut<MilestoneLedger>,
    mut cards: Query<(Entity, &CelebrationCard, &mut Transform)>,
) {
    let now = now_ms(&time);

    for (entity, card, mut transform) in &mut cards {
        let progress =
            (1.0 - (card.expire_ms - now) / MILESTONE_CARD_MS).clamp(0.0, 1.0) as f32;
        transform.scale = Vec3::splat(1.0 + progress * 0.18);

        if now >= card.expire_ms {
            commands.entity(entity).despawn_recursive();
            ledger.in_flight = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::shared::*;

    #[test]
    fn thresholds_enqueue_in_order_with_no_skips() {
        let mut ledger = MilestoneLedger::default();
        ledger.record(95);
        assert!(ledger.queue.is_empty());

        // One collection jumps across three thresholds at once.
        ledger.record(315);
        let queued: Vec<u32> = ledger.queue.iter().copied().collect();
        assert_eq!(queued, vec![100, 200, 300]);
        assert_eq!(ledger.next_threshold, 400);
    }

    #[test]
    fn recording_the_same_score_twice_enqueues_nothing_new() {
        let mut ledger = MilestoneLedger::default();
        ledger.record(100);
        ledger.record(100);
        assert_eq!(ledger.queue.len(), 1);
    }

    #[test]
    fn exact_threshold_counts() {
        let mut ledger = MilestoneLedger::default();
        ledger.record(100);
        assert_eq!(ledger.queue.front(), Some(&100));
    }
}
