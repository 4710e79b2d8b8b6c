//! Rate-limited state publication for the embedding shell.
//!
//! The shell receives immutable JSON snapshots of everything the player
//! can see as a number or flag. Pushes are throttled to one per
//! SNAPSHOT_MIN_GAP_MS and skipped entirely when nothing changed, except
//! that commands force an immediate push regardless of both rules.

use bevy::prelude::*;
use crate::shared::*;

/// Assembles the full player-facing snapshot from the session resources.
pub fn build_snapshot(
    now: f64,
    wallet: &Wallet,
    roster: &PartyRoster,
    health: &HealthMeter,
    buffs: &BuffWindows,
    rain: &RainCycle,
) -> UiSnapshot {
    UiSnapshot {
        coin_score: wallet.coins,
        party_count: roster.len() as u32,
        health_percent: health.percent(),
        magnet_manual: buffs.magnet_manual,
        magnet_seconds: buffs.remaining_secs(BuffKind::Magnet, now),
        auto_manual: buffs.auto_run_manual,
        auto_seconds: buffs.remaining_secs(BuffKind::AutoRun, now),
        sprint_manual: buffs.sprint_manual,
        rain_manual: rain.manual,
        rain_active: rain.raining,
    }
}

pub fn publish_snapshot(
    time: Res<Time>,
    wallet: Res<Wallet>,
    roster: Res<PartyRoster>,
    health: Res<HealthMeter>,
    buffs: Res<BuffWindows>,
    rain: Res<RainCycle>,
    mut channel: ResMut<SnapshotChannel>,
) {
    let now = now_ms(&time);
    let snapshot = build_snapshot(now, &wallet, &roster, &health, &buffs, &rain);

    let due = now - channel.last_push_ms >= SNAPSHOT_MIN_GAP_MS;
    if !channel.force_push && (!due || snapshot == channel.published) {
        return;
    }

    match serde_json::to_string(&snapshot) {
        Ok(json) => debug!("UI snapshot: {}", json),
        Err(err) => warn!("UI snapshot serialization failed: {}", err),
    }

    channel.published = snapshot;
    channel.last_push_ms = now;
    channel.force_push = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_with_camel_case_keys() {
        let snapshot = UiSnapshot {
            coin_score: 42,
            party_count: 3,
            health_percent: 90,
            sprint_manual: false,
            ..default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"coinScore\":42"));
        assert!(json.contains("\"partyCount\":3"));
        assert!(json.contains("\"healthPercent\":90"));
        assert!(json.contains("\"sprintManual\":false"));
        assert!(json.contains("\"rainActive\""));
    }

    #[test]
    fn snapshot_reflects_timed_buff_seconds() {
        let mut buffs = BuffWindows::default();
        buffs.activate(BuffKind::Magnet, 1000.0);
        let snapshot = build_snapshot(
            2000.0,
            &Wallet::default(),
            &PartyRoster::default(),
            &HealthMeter::default(),
            &buffs,
            &RainCycle::default(),
        );
        assert_eq!(snapshot.magnet_seconds, 29);
        assert!(!snapshot.magnet_manual);
        assert_eq!(snapshot.auto_seconds, 0);
    }
}
