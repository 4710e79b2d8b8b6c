mod shared;
mod input;
mod runner;
mod buffs;
mod health;
mod pickups;
mod party;
mod speech;
mod milestones;
mod weather;
mod audio;
mod ui;
mod data;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Paceline".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared session resources
        .init_resource::<AvatarRegistry>()
        .init_resource::<SelectedAvatar>()
        .init_resource::<SpeechLines>()
        .init_resource::<GameSettings>()
        .init_resource::<BuffWindows>()
        .init_resource::<HealthMeter>()
        .init_resource::<Wallet>()
        // Events
        .add_event::<PlaySfxEvent>()
        .add_event::<FloatingTextEvent>()
        .add_event::<RecruitEvent>()
        .add_event::<ShoutEvent>()
        .add_event::<DrinkPotionEvent>()
        .add_event::<RunFrameEvent>()
        // Tick order: later stages read state produced earlier in the
        // same frame, so the chain must stay in this order.
        .configure_sets(
            Update,
            (
                TickSet::Drive,
                TickSet::Buffs,
                TickSet::Meter,
                TickSet::Spawn,
                TickSet::Formation,
                TickSet::Chatter,
                TickSet::Weather,
                TickSet::Footsteps,
                TickSet::Publish,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(runner::RunnerPlugin)
        .add_plugins(buffs::BuffPlugin)
        .add_plugins(health::HealthPlugin)
        .add_plugins(pickups::PickupPlugin)
        .add_plugins(party::PartyPlugin)
        .add_plugins(speech::SpeechPlugin)
        .add_plugins(milestones::MilestonePlugin)
        .add_plugins(weather::WeatherPlugin)
        .add_plugins(audio::SoundPlugin)
        .add_plugins(ui::UiPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
