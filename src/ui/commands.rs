//! The player command surface: the keyboard bindings mirror the commands
//! the embedding shell can issue (potion, magnet, auto-run, sprint, rain).
//! Every command forces an immediate snapshot push so the shell sees the
//! result synchronously, including rejections.

use bevy::prelude::*;
use rand::thread_rng;

use crate::shared::*;

const SHOUT_GO: &str = "가자!";
const SHOUT_CHEER: &str = "화이팅!";

pub fn apply_player_commands(
    time: Res<Time>,
    input: Res<RunnerInput>,
    health: Res<HealthMeter>,
    mut buffs: ResMut<BuffWindows>,
    mut rain: ResMut<RainCycle>,
    mut channel: ResMut<SnapshotChannel>,
    mut potions: EventWriter<DrinkPotionEvent>,
    mut shouts: EventWriter<ShoutEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if input.drink_potion {
        potions.send(DrinkPotionEvent);
    }

    if input.toggle_magnet {
        buffs.magnet_manual = !buffs.magnet_manual;
        channel.force_push = true;
        sfx.send(PlaySfxEvent::new(SfxId::MenuSelect));
        info!("Magnet manual: {}", buffs.magnet_manual);
    }

    if input.toggle_auto_run {
        buffs.auto_run_manual = !buffs.auto_run_manual;
        channel.force_push = true;
        sfx.send(PlaySfxEvent::new(SfxId::MenuSelect));
        info!("Auto-run manual: {}", buffs.auto_run_manual);
    }

    if input.toggle_sprint {
        let enabling = !buffs.sprint_manual;
        if enabling && !health.can_sprint() {
            // Hard gate: the request is rejected, but the push still
            // happens so the shell sees sprintManual unchanged.
            info!("Sprint request rejected: health empty");
        } else {
            buffs.sprint_manual = enabling;
            sfx.send(PlaySfxEvent::new(SfxId::MenuSelect));
            info!("Sprint manual: {}", buffs.sprint_manual);
        }
        channel.force_push = true;
    }

    if input.toggle_rain {
        let enabled = !rain.manual;
        rain.set_manual(enabled, now_ms(&time), &mut thread_rng());
        channel.force_push = true;
        sfx.send(PlaySfxEvent::new(SfxId::MenuSelect));
        info!("Rain manual: {} (raining: {})", rain.manual, rain.raining);
    }

    if input.shout_go {
        shouts.send(ShoutEvent {
            line: SHOUT_GO.to_string(),
        });
    }
    if input.shout_cheer {
        shouts.send(ShoutEvent {
            line: SHOUT_CHEER.to_string(),
        });
    }
}
