use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunnerInput>();
        app.add_systems(PreUpdate, reset_and_read_input);
    }
}

/// The single point where hardware input becomes game actions. The active
/// context follows GameState, so menu keys and gameplay keys never leak
/// into each other.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    game_state: Res<State<GameState>>,
    mut input: ResMut<RunnerInput>,
) {
    *input = RunnerInput::default();

    input.any_key = keys.get_just_pressed().next().is_some();

    let context = match *game_state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::AvatarSelect => InputContext::Menu,
        GameState::Playing => InputContext::Gameplay,
        GameState::Paused => InputContext::Menu,
    };

    match context {
        InputContext::Disabled => {}

        InputContext::Menu => {
            input.ui_up = keys.just_pressed(KeyCode::ArrowUp) || keys.just_pressed(KeyCode::KeyW);
            input.ui_down =
                keys.just_pressed(KeyCode::ArrowDown) || keys.just_pressed(KeyCode::KeyS);
            input.ui_confirm =
                keys.just_pressed(KeyCode::Enter) || keys.just_pressed(KeyCode::Space);
            input.pause = keys.just_pressed(KeyCode::Escape);
        }

        InputContext::Gameplay => {
            let mut axis = 0.0;
            if keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA) {
                axis -= 1.0;
            }
            if keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD) {
                axis += 1.0;
            }
            input.move_axis = axis;

            input.jump = keys.just_pressed(KeyCode::Space);
            input.sprint_held =
                keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight);

            // Command surface (same actions the external shell exposes).
            input.drink_potion = keys.just_pressed(KeyCode::KeyR);
            input.toggle_magnet = keys.just_pressed(KeyCode::KeyM);
            input.toggle_auto_run = keys.just_pressed(KeyCode::KeyU);
            input.toggle_sprint = keys.just_pressed(KeyCode::KeyK);
            input.toggle_rain = keys.just_pressed(KeyCode::KeyN);
            input.shout_go = keys.just_pressed(KeyCode::KeyG);
            input.shout_cheer = keys.just_pressed(KeyCode::KeyF);

            input.pause = keys.just_pressed(KeyCode::Escape);
        }
    }
}
