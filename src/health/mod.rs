//! The health/stamina meter: continuous drain while running, potion
//! recharges paid in coins, and the hard sprint gate.

use bevy::prelude::*;
use crate::shared::*;

pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        // The sprint gate and potion handler force snapshot pushes, so the
        // channel must exist even without the UI plugin.
        app.init_resource::<SnapshotChannel>();
        app.add_systems(
            Update,
            (drain_meter, enforce_sprint_gate, handle_drink_potion)
                .chain()
                .in_set(TickSet::Meter),
        );
    }
}

/// Drains the meter while the leader is grounded and moving horizontally.
/// The multiplier scales with speed, so sprinting empties the meter twice
/// as fast.
fn drain_meter(
    time: Res<Time>,
    mut meter: ResMut<HealthMeter>,
    leader_query: Query<&LeaderMotion, With<Leader>>,
) {
    let Ok(motion) = leader_query.get_single() else {
        return;
    };

    if !(motion.grounded && motion.moving_horizontally()) {
        return;
    }

    let multiplier = (motion.scroll_speed.abs() / MOVE_SPEED).max(1.0);
    meter.drain(time.delta_secs(), multiplier);
}

/// Sprint eligibility is rechecked every tick. The instant the meter hits
/// zero any stale sprint-manual flag is force-cleared — not just ignored —
/// and the very next snapshot push happens immediately so the shell never
/// shows a sprint toggle the player doesn't actually have.
fn enforce_sprint_gate(
    meter: Res<HealthMeter>,
    mut buffs: ResMut<BuffWindows>,
    mut channel: ResMut<SnapshotChannel>,
) {
    if !meter.can_sprint() && buffs.sprint_manual {
        buffs.sprint_manual = false;
        channel.force_push = true;
        info!("Health empty: sprint mode force-cleared");
    }
}

/// Potion requests from the R key or the external command surface. Both
/// paths land here, so an out-of-tick shell command obeys the exact same
/// cost and cap rules as an in-tick one.
fn handle_drink_potion(
    mut events: EventReader<DrinkPotionEvent>,
    mut meter: ResMut<HealthMeter>,
    mut wallet: ResMut<Wallet>,
    mut channel: ResMut<SnapshotChannel>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut fx: EventWriter<FloatingTextEvent>,
    leader_query: Query<&Transform, With<Leader>>,
) {
    for _ in events.read() {
        if meter.try_recharge(&mut wallet) {
            info!(
                "Potion: health {}%, {} coins left",
                meter.percent(),
                wallet.coins
            );
            sfx.send(PlaySfxEvent::new(SfxId::Potion));
            if let Ok(transform) = leader_query.get_single() {
                fx.send(FloatingTextEvent {
                    text: format!("+{}%", (HEALTH_RECHARGE_RATIO * 100.0) as u32),
                    at: transform.translation.truncate() + Vec2::new(0.0, 30.0),
                    color: Color::srgb(0.4, 1.0, 0.5),
                    font_size: 18.0,
                });
            }
        }
        // Denied potions (full meter or empty wallet) stay silent: no FX,
        // no sound, no state change.
        channel.force_push = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::shared::*;

    #[test]
    fn drain_stays_in_unit_range() {
        let mut meter = HealthMeter::default();
        meter.drain(1e6, 1.0);
        assert_eq!(meter.ratio, 0.0);

        let mut meter = HealthMeter::default();
        meter.drain(0.0, 1.0);
        assert_eq!(meter.ratio, 1.0);
        meter.drain(-5.0, 1.0);
        assert_eq!(meter.ratio, 1.0);
        meter.drain(5.0, 0.0);
        assert_eq!(meter.ratio, 1.0);
    }

    #[test]
    fn eighteen_seconds_of_running_costs_a_tenth() {
        let mut meter = HealthMeter::default();
        meter.drain(18.0, 1.0);
        assert!((meter.ratio - 0.9).abs() < 1e-5);
    }

    #[test]
    fn sprint_multiplier_drains_twice_as_fast() {
        let mut slow = HealthMeter::default();
        let mut fast = HealthMeter::default();
        slow.drain(9.0, 1.0);
        fast.drain(9.0, 2.0);
        assert!((slow.ratio - 0.95).abs() < 1e-5);
        assert!((fast.ratio - 0.9).abs() < 1e-5);
    }

    #[test]
    fn recharge_spends_coins_and_caps_at_full() {
        let mut meter = HealthMeter { ratio: 0.85 };
        let mut wallet = Wallet {
            coins: 25,
            lifetime: 25,
        };

        assert!(meter.try_recharge(&mut wallet));
        assert_eq!(wallet.coins, 15);
        assert!((meter.ratio - 0.95).abs() < 1e-5);

        // Second step would exceed 1.0 — clamped, still costs.
        assert!(meter.try_recharge(&mut wallet));
        assert_eq!(wallet.coins, 5);
        assert_eq!(meter.ratio, 1.0);

        // Full meter: no-op, no spend.
        assert!(!meter.try_recharge(&mut wallet));
        assert_eq!(wallet.coins, 5);
    }

    #[test]
    fn recharge_is_a_noop_when_broke() {
        let mut meter = HealthMeter { ratio: 0.2 };
        let mut wallet = Wallet {
            coins: 9,
            lifetime: 9,
        };
        assert!(!meter.try_recharge(&mut wallet));
        assert_eq!(wallet.coins, 9);
        assert!((meter.ratio - 0.2).abs() < 1e-6);
    }

    #[test]
    fn lifetime_total_is_never_spent() {
        let mut meter = HealthMeter { ratio: 0.0 };
        let mut wallet = Wallet::default();
        wallet.earn(40);
        meter.try_recharge(&mut wallet);
        assert_eq!(wallet.coins, 30);
        assert_eq!(wallet.lifetime, 40);
    }
}
