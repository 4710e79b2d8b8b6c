//! Data layer — populates the avatar registry and speech lines at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the registries,
//! reads the optional `settings.ron` handoff from the embedding shell, and
//! then transitions the game into GameState::AvatarSelect.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Single system that populates every registry, applies the settings
/// handoff, and transitions to AvatarSelect.
fn load_all_data(
    mut avatar_registry: ResMut<AvatarRegistry>,
    mut speech_lines: ResMut<SpeechLines>,
    mut settings: ResMut<GameSettings>,
    mut selected: ResMut<SelectedAvatar>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    populate_avatars(&mut avatar_registry);
    info!("  Avatars loaded: {}", avatar_registry.avatars.len());

    populate_speech_lines(&mut speech_lines);
    info!("  Speech lines loaded: {}", speech_lines.lines.len());

    match read_settings() {
        Ok(loaded) => {
            info!(
                "  Settings loaded: avatar={:?} volume={:.2}",
                loaded.avatar, loaded.volume
            );
            *settings = loaded;
        }
        Err(reason) => {
            // Absent or malformed settings are not an error worth surfacing;
            // the defaults carry the session.
            warn!("  Settings unavailable ({}); using defaults", reason);
        }
    }

    // Avatar handoff pre-seeds the select screen. Unknown ids fall back to
    // the default avatar instead of failing.
    if let Some(id) = settings.avatar.as_deref() {
        if avatar_registry.contains(id) {
            selected.id = id.to_string();
        } else {
            warn!("  Unknown avatar '{}' in settings; using '{}'", id, DEFAULT_AVATAR);
            selected.id = DEFAULT_AVATAR.to_string();
        }
    }

    info!("DataPlugin: registries populated. Transitioning to AvatarSelect.");
    next_state.set(GameState::AvatarSelect);
}

/// The four playable avatars. Colors stand in for sprite sheets; the
/// nominal frame height feeds the follower visual-size normalization.
fn populate_avatars(registry: &mut AvatarRegistry) {
    let defs = [
        AvatarDef {
            id: "batcop".to_string(),
            name: "Batcop".to_string(),
            body_color: Color::srgb(0.25, 0.28, 0.42),
            trim_color: Color::srgb(0.95, 0.85, 0.25),
            sprite_height: 34.0,
        },
        AvatarDef {
            id: "bluehair".to_string(),
            name: "Bluehair".to_string(),
            body_color: Color::srgb(0.30, 0.55, 0.90),
            trim_color: Color::srgb(0.85, 0.92, 1.0),
            sprite_height: 30.0,
        },
        AvatarDef {
            id: "redhat".to_string(),
            name: "Redhat".to_string(),
            body_color: Color::srgb(0.82, 0.25, 0.23),
            trim_color: Color::srgb(1.0, 0.92, 0.80),
            sprite_height: 28.0,
        },
        AvatarDef {
            id: "redman".to_string(),
            name: "Redman".to_string(),
            body_color: Color::srgb(0.70, 0.15, 0.30),
            trim_color: Color::srgb(0.98, 0.72, 0.40),
            sprite_height: 32.0,
        },
    ];

    for def in defs {
        registry.order.push(def.id.clone());
        registry.avatars.insert(def.id.clone(), def);
    }
}

fn populate_speech_lines(lines: &mut SpeechLines) {
    lines.lines = [
        "가자!",
        "달려보자!",
        "할 수 있어!",
        "좋은 페이스야!",
        "끝까지 가보자!",
        "오늘도 전진!",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
}

/// Reads `settings.ron` from the working directory.
#[cfg(not(target_arch = "wasm32"))]
fn read_settings() -> Result<GameSettings, String> {
    let raw = std::fs::read_to_string("settings.ron").map_err(|e| e.to_string())?;
    ron::from_str::<GameSettings>(&raw).map_err(|e| e.to_string())
}

/// Browser builds have no filesystem; settings come from localStorage instead.
#[cfg(target_arch = "wasm32")]
fn read_settings() -> Result<GameSettings, String> {
    let window = web_sys::window().ok_or("no window")?;
    let storage = window
        .local_storage()
        .map_err(|_| "localStorage unavailable".to_string())?
        .ok_or("localStorage unavailable")?;
    let raw = storage
        .get_item("paceline_settings")
        .map_err(|_| "localStorage read failed".to_string())?
        .ok_or("no saved settings")?;
    ron::from_str::<GameSettings>(&raw).map_err(|e| e.to_string())
}
