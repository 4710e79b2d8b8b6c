mod avatar_select;
mod commands;
mod fps;
mod fx;
mod hud;
mod pause;
mod snapshot;

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnapshotChannel>();

        // ─── AVATAR SELECT ───
        app.add_systems(
            OnEnter(GameState::AvatarSelect),
            avatar_select::spawn_avatar_select,
        );
        app.add_systems(
            OnExit(GameState::AvatarSelect),
            avatar_select::despawn_avatar_select,
        );
        app.add_systems(
            Update,
            (
                avatar_select::update_avatar_select_visuals,
                avatar_select::avatar_select_navigation,
            )
                .run_if(in_state(GameState::AvatarSelect)),
        );

        // ─── COMMAND SURFACE — before the tick chain so toggles land
        //     in the same frame's simulation ───
        app.add_systems(
            Update,
            commands::apply_player_commands
                .before(TickSet::Drive)
                .run_if(in_state(GameState::Playing)),
        );

        // ─── HUD — visible during Playing state ───
        app.add_systems(OnEnter(GameState::Playing), hud::spawn_hud);
        app.add_systems(OnExit(GameState::Playing), hud::despawn_hud);
        app.add_systems(
            Update,
            (
                hud::update_score_display,
                hud::update_health_gauge,
                hud::update_buff_status,
            )
                .run_if(in_state(GameState::Playing)),
        );

        // ─── FLOATING FEEDBACK LABELS ───
        app.add_systems(
            Update,
            (fx::spawn_floating_text, fx::update_floating_text)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );

        // ─── SNAPSHOT PUBLISHER ───
        app.add_systems(
            Update,
            snapshot::publish_snapshot.in_set(TickSet::Publish),
        );

        // ─── PAUSE ───
        app.add_systems(
            Update,
            pause::request_pause.run_if(in_state(GameState::Playing)),
        );
        app.add_systems(OnEnter(GameState::Paused), pause::enter_pause);
        app.add_systems(OnExit(GameState::Paused), pause::exit_pause);
        app.add_systems(
            Update,
            pause::pause_navigation.run_if(in_state(GameState::Paused)),
        );

        // ─── FPS OVERLAY — always present ───
        app.add_systems(Startup, fps::spawn_fps_overlay);
        app.add_systems(Update, fps::update_fps_overlay);
    }
}
