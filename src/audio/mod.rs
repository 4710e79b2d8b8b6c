use bevy::audio::Volume;
use bevy::prelude::*;

use crate::shared::*;

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>();
        app.init_resource::<FootstepClock>();
        app.add_systems(OnEnter(GameState::Playing), start_game_music);
        app.add_systems(Update, handle_play_sfx);
        app.add_systems(Update, cue_footsteps.in_set(TickSet::Footsteps));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MUSIC STATE — tracks the currently playing music entity
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
}

// ═══════════════════════════════════════════════════════════════════════
// SFX PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps SFX IDs (sent by other domains) to actual audio file paths.
fn sfx_path(id: SfxId) -> &'static str {
    match id {
        SfxId::Coin => "audio/sfx/sfx_coin_single1.ogg",
        SfxId::KingCoin => "audio/sfx/sfx_coin_double1.ogg",
        SfxId::SuperKingCoin => "audio/sfx/sfx_coin_cluster1.ogg",
        SfxId::Magnet => "audio/sfx/sfx_sounds_powerup1.ogg",
        SfxId::Powerup => "audio/sfx/sfx_sounds_powerup2.ogg",
        SfxId::AllyJoin => "audio/sfx/sfx_sounds_fanfare1.ogg",
        SfxId::Milestone => "audio/sfx/sfx_sounds_fanfare2.ogg",
        SfxId::Footstep => "audio/sfx/sfx_movement_footsteps1a.ogg",
        SfxId::Potion => "audio/sfx/sfx_sounds_interaction5.ogg",
        SfxId::MenuMove => "audio/sfx/sfx_menu_move1.ogg",
        SfxId::MenuSelect => "audio/sfx/sfx_menu_select1.ogg",
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Listen for PlaySfxEvent and spawn one-shot audio sources that
/// auto-despawn. The event's rate doubles as playback speed, which is how
/// fast footsteps get their pitched-up click.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
) {
    for event in events.read() {
        commands.spawn((
            AudioPlayer::new(asset_server.load(sfx_path(event.id))),
            PlaybackSettings {
                speed: event.rate,
                volume: Volume::new(settings.volume),
                ..PlaybackSettings::DESPAWN
            },
        ));
    }
}

/// Start the looping background track once, the first time Playing is
/// entered. Pause round-trips re-enter Playing and must not restart it.
pub fn start_game_music(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
    mut music_state: ResMut<MusicState>,
) {
    if music_state.current_track.is_some() {
        return;
    }
    let entity = commands
        .spawn((
            AudioPlayer::new(asset_server.load("audio/music/run_theme.ogg")),
            PlaybackSettings {
                volume: Volume::new(settings.volume * 0.6),
                ..PlaybackSettings::LOOP
            },
        ))
        .id();
    music_state.current_track = Some(entity);
}

// ═══════════════════════════════════════════════════════════════════════
// FOOTSTEPS — run-clip frames to audio cues
// ═══════════════════════════════════════════════════════════════════════

/// True when the run clip's `frame` lands on a foot plant. At high
/// playback rate the audio lags the sprite, so the check looks one frame
/// ahead and fires early instead.
pub fn is_footstep_frame(frame: usize, rate: f32) -> bool {
    let adjusted = frame + usize::from(rate >= FOOTSTEP_HIGH_SPEED_THRESHOLD);
    adjusted >= FOOTSTEP_FRAME_START
        && adjusted <= FOOTSTEP_FRAME_END
        && (adjusted - FOOTSTEP_FRAME_START) % FOOTSTEP_FRAME_STEP == 0
}

/// Turns leader run-frame advances into footstep SFX, debounced so two
/// cue frames landing in the same burst of events never double-fire.
fn cue_footsteps(
    time: Res<Time>,
    mut clock: ResMut<FootstepClock>,
    mut frames: EventReader<RunFrameEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let now = now_ms(&time);
    for event in frames.read() {
        if !is_footstep_frame(event.frame, event.rate) {
            continue;
        }
        if now - clock.last_step_ms < FOOTSTEP_MIN_INTERVAL_MS {
            continue;
        }
        clock.last_step_ms = now;
        sfx.send(PlaySfxEvent {
            id: SfxId::Footstep,
            rate: event.rate.max(1.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_frames_every_fourth_from_three() {
        let plants: Vec<usize> = (0..RUN_FRAME_COUNT)
            .filter(|&f| is_footstep_frame(f, 1.0))
            .collect();
        assert_eq!(plants, vec![3, 7, 11, 15, 19]);
    }

    #[test]
    fn high_rate_fires_one_frame_early() {
        let plants: Vec<usize> = (0..RUN_FRAME_COUNT)
            .filter(|&f| is_footstep_frame(f, 2.0))
            .collect();
        assert_eq!(plants, vec![2, 6, 10, 14, 18, 22]);
    }

    #[test]
    fn high_rate_shifts_rather_than_widens_the_window() {
        // The look-ahead moves each cue, it does not add extra ones.
        assert!(is_footstep_frame(2, 1.4));
        assert!(!is_footstep_frame(3, 1.4));
        assert!(!is_footstep_frame(4, 1.4));
    }

    #[test]
    fn frames_before_first_plant_are_silent() {
        assert!(!is_footstep_frame(0, 2.0));
        assert!(!is_footstep_frame(0, 1.0));
        assert!(!is_footstep_frame(2, 1.0));
    }
}
