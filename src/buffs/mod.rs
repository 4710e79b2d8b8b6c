//! Timed buff windows (magnet, auto-run) and their manual overrides.
//!
//! All the state lives in the shared `BuffWindows` resource so the spawner
//! and the command surface can activate or toggle without going through
//! this plugin. The tick here only watches for expiries so they get logged
//! and the HUD countdown hits zero on time.

use bevy::prelude::*;
use crate::shared::*;

pub struct BuffPlugin;

impl Plugin for BuffPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, watch_buff_expiry.in_set(TickSet::Buffs));
    }
}

/// Tracks which timed windows were live last tick to log the transition
/// the moment one lapses. Deadlines are polled against the virtual clock,
/// so a pause freezes them instead of letting them lapse mid-pause.
#[derive(Default)]
pub struct ExpiryWatch {
    magnet_live: bool,
    auto_live: bool,
}

fn watch_buff_expiry(time: Res<Time>, buffs: Res<BuffWindows>, mut watch: Local<ExpiryWatch>) {
    let now = now_ms(&time);

    let magnet_live = now < buffs.magnet_until_ms;
    if watch.magnet_live && !magnet_live {
        info!("Magnet buff expired");
    }
    watch.magnet_live = magnet_live;

    let auto_live = now < buffs.auto_run_until_ms;
    if watch.auto_live && !auto_live {
        info!("Auto-run buff expired");
    }
    watch.auto_live = auto_live;
}

#[cfg(test)]
mod tests {
    use crate::shared::*;

    #[test]
    fn activate_makes_buff_active_until_expiry() {
        let mut buffs = BuffWindows::default();
        buffs.activate(BuffKind::Magnet, 1000.0);

        assert!(buffs.is_active(BuffKind::Magnet, 1000.0));
        assert!(buffs.is_active(BuffKind::Magnet, 1000.0 + MAGNET_DURATION_MS - 1.0));
        assert!(!buffs.is_active(BuffKind::Magnet, 1000.0 + MAGNET_DURATION_MS));
    }

    #[test]
    fn reactivation_never_shortens_the_window() {
        let mut buffs = BuffWindows::default();
        buffs.activate(BuffKind::AutoRun, 5000.0);
        let first = buffs.auto_run_until_ms;

        // A second pickup later extends.
        buffs.activate(BuffKind::AutoRun, 9000.0);
        assert!(buffs.auto_run_until_ms > first);

        // An earlier-now activation (late event delivery) cannot retract.
        let extended = buffs.auto_run_until_ms;
        buffs.activate(BuffKind::AutoRun, 0.0);
        assert_eq!(buffs.auto_run_until_ms, extended);
    }

    #[test]
    fn manual_override_is_active_regardless_of_window() {
        let mut buffs = BuffWindows::default();
        buffs.magnet_manual = true;
        assert!(buffs.is_active(BuffKind::Magnet, 1e9));
        buffs.magnet_manual = false;
        assert!(!buffs.is_active(BuffKind::Magnet, 1e9));
    }

    #[test]
    fn remaining_seconds_round_up_and_floor_at_zero() {
        let mut buffs = BuffWindows::default();
        buffs.activate(BuffKind::Magnet, 0.0);
        assert_eq!(buffs.remaining_secs(BuffKind::Magnet, 0.0), 30);
        assert_eq!(buffs.remaining_secs(BuffKind::Magnet, 29_100.0), 1);
        assert_eq!(buffs.remaining_secs(BuffKind::Magnet, 30_000.0), 0);
        assert_eq!(buffs.remaining_secs(BuffKind::Magnet, 99_999.0), 0);
    }

    #[test]
    fn auto_run_uses_the_sixty_second_constant() {
        let mut buffs = BuffWindows::default();
        buffs.activate(BuffKind::AutoRun, 0.0);
        assert_eq!(buffs.remaining_secs(BuffKind::AutoRun, 0.0), 60);
    }
}
