//! Headless integration tests for Paceline.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic systems (skipping rendering and audio output), and verify
//! that the core session loops work correctly.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use paceline::data::DataPlugin;
use paceline::health::HealthPlugin;
use paceline::milestones::{CelebrationCard, MilestonePlugin};
use paceline::party::PartyPlugin;
use paceline::pickups::PickupPlugin;
use paceline::runner::RunnerPlugin;
use paceline::shared::*;
use paceline::speech::{SpeechBubble, SpeechPlugin};
use paceline::ui::UiPlugin;
use paceline::weather::WeatherPlugin;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a minimal Bevy app with all shared resources, events, and the
/// tick chain registered, but NO rendering, windowing, or asset loading.
/// Plugins must be added per-test depending on what's being exercised.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs; RunnerInput is set by hand
    //    since the real input plugin needs a keyboard) ────────────────────
    app.init_resource::<AvatarRegistry>()
        .init_resource::<SelectedAvatar>()
        .init_resource::<SpeechLines>()
        .init_resource::<GameSettings>()
        .init_resource::<BuffWindows>()
        .init_resource::<HealthMeter>()
        .init_resource::<Wallet>()
        .init_resource::<RunnerInput>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<PlaySfxEvent>()
        .add_event::<FloatingTextEvent>()
        .add_event::<RecruitEvent>()
        .add_event::<ShoutEvent>()
        .add_event::<DrinkPotionEvent>()
        .add_event::<RunFrameEvent>();

    // ── Tick chain (mirrors main.rs) ─────────────────────────────────────
    app.configure_sets(
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
    );

    app
}

/// Transitions the test app to Playing state and ticks once to process it.
fn enter_playing_state(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update(); // process state transition
}

/// Boots through Loading so the registries are populated, then forces the
/// session into Playing (skipping the avatar select screen).
fn boot_into_playing(app: &mut App) {
    app.update(); // OnEnter(Loading) populates registries
    app.update(); // NextState → AvatarSelect applied
    enter_playing_state(app);
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot & session smoke
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_smoke_transitions_and_ticks() {
    let mut app = build_test_app();
    app.add_plugins((
        DataPlugin,
        RunnerPlugin,
        PickupPlugin,
        PartyPlugin,
        MilestonePlugin,
        WeatherPlugin,
    ));

    app.update();
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(
        state.get(),
        &GameState::AvatarSelect,
        "Expected to reach AvatarSelect after loading data"
    );

    let registry = app.world().resource::<AvatarRegistry>();
    assert_eq!(registry.avatars.len(), 4, "All four avatars registered");
    assert_eq!(registry.order.len(), 4);
    assert!(registry.contains(DEFAULT_AVATAR));

    let lines = app.world().resource::<SpeechLines>().lines.len();
    assert!(lines > 0, "Speech line set should be populated during boot");

    enter_playing_state(&mut app);

    // The leader exists and heads the roster.
    let roster = app.world().resource::<PartyRoster>();
    assert_eq!(roster.len(), 1, "Leader spawned into the roster");

    // Smoke: run a batch of frames in Playing without panic.
    for _ in 0..120 {
        app.update();
    }

    // Pause round-trip must not duplicate the leader.
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();
    enter_playing_state(&mut app);
    let leaders = app
        .world_mut()
        .query_filtered::<(), With<Leader>>()
        .iter(app.world())
        .count();
    assert_eq!(leaders, 1, "Pause round-trip duplicated the leader");
}

// ─────────────────────────────────────────────────────────────────────────────
// Party cap
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_party_never_exceeds_the_cap() {
    let mut app = build_test_app();
    app.add_plugins((DataPlugin, RunnerPlugin, PartyPlugin));
    boot_into_playing(&mut app);

    for _ in 0..(MAX_PARTY_SIZE + 5) {
        app.world_mut().send_event(RecruitEvent {
            avatar_id: "bluehair".to_string(),
        });
    }
    app.update();
    app.update();

    let roster = app.world().resource::<PartyRoster>();
    assert_eq!(
        roster.len(),
        MAX_PARTY_SIZE,
        "Recruits beyond the cap must be dropped"
    );

    // Further recruits are silent no-ops.
    app.world_mut().send_event(RecruitEvent {
        avatar_id: "redhat".to_string(),
    });
    app.update();
    assert_eq!(app.world().resource::<PartyRoster>().len(), MAX_PARTY_SIZE);
}

#[test]
fn test_unknown_avatar_recruit_is_a_silent_no_op() {
    let mut app = build_test_app();
    app.add_plugins((DataPlugin, RunnerPlugin, PartyPlugin));
    boot_into_playing(&mut app);

    app.world_mut().send_event(RecruitEvent {
        avatar_id: "mystery-guest".to_string(),
    });
    app.update();

    assert_eq!(app.world().resource::<PartyRoster>().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Milestones
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_milestone_celebrations_are_serialized() {
    let mut app = build_test_app();
    app.add_plugins(MilestonePlugin);
    enter_playing_state(&mut app);

    // One big collection crosses three thresholds at once.
    app.world_mut().resource_mut::<Wallet>().earn(350);
    app.update();

    let ledger = app.world().resource::<MilestoneLedger>();
    assert!(ledger.in_flight, "First celebration should start");
    assert_eq!(
        ledger.queue.len(),
        2,
        "Remaining thresholds wait their turn"
    );

    // While the first card is up, no second one may appear.
    for _ in 0..5 {
        app.update();
    }
    let cards = app
        .world_mut()
        .query::<&CelebrationCard>()
        .iter(app.world())
        .count();
    assert_eq!(cards, 1, "At most one celebration card in flight");
}

#[test]
fn test_milestone_scenario_small_coins_then_king() {
    let mut app = build_test_app();
    app.add_plugins(MilestonePlugin);
    enter_playing_state(&mut app);

    // Warm-up collections below the first threshold.
    app.world_mut().resource_mut::<Wallet>().earn(90);
    app.update();
    {
        let ledger = app.world().resource::<MilestoneLedger>();
        assert!(ledger.queue.is_empty() && !ledger.in_flight);
    }

    // Five plain coins: still below.
    for _ in 0..5 {
        app.world_mut().resource_mut::<Wallet>().earn(1);
    }
    app.update();
    assert!(!app.world().resource::<MilestoneLedger>().in_flight);

    // A king coin pushes the score across 100: exactly one milestone.
    app.world_mut().resource_mut::<Wallet>().earn(10);
    app.update();
    let ledger = app.world().resource::<MilestoneLedger>();
    assert!(ledger.in_flight, "Crossing 100 starts a celebration");
    assert!(ledger.queue.is_empty(), "Only one threshold was crossed");
    assert_eq!(ledger.next_threshold, 200);
}

// ─────────────────────────────────────────────────────────────────────────────
// Health & potions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_potion_recharges_and_spends_coins() {
    let mut app = build_test_app();
    app.add_plugins(HealthPlugin);
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<Wallet>().earn(10);
    app.world_mut().resource_mut::<HealthMeter>().ratio = 0.5;

    app.world_mut().send_event(DrinkPotionEvent);
    app.update();

    let meter = app.world().resource::<HealthMeter>();
    let wallet = app.world().resource::<Wallet>();
    assert!((meter.ratio - 0.6).abs() < 1e-5);
    assert_eq!(wallet.coins, 0, "Recharge costs 10 coins");
    assert_eq!(wallet.lifetime, 10, "Spending never touches lifetime score");
}

#[test]
fn test_potion_with_no_coins_changes_nothing() {
    let mut app = build_test_app();
    app.add_plugins(HealthPlugin);
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<HealthMeter>().ratio = 0.5;
    app.world_mut().send_event(DrinkPotionEvent);
    app.update();

    assert!((app.world().resource::<HealthMeter>().ratio - 0.5).abs() < 1e-6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Speech
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ambient_chatter_respects_the_bubble_cap() {
    let mut app = build_test_app();
    app.add_plugins((DataPlugin, RunnerPlugin, PartyPlugin, SpeechPlugin));
    boot_into_playing(&mut app);

    for _ in 0..6 {
        app.world_mut().send_event(RecruitEvent {
            avatar_id: "bluehair".to_string(),
        });
    }
    app.update();

    // Force the scheduler due every tick; the cap must still hold.
    for _ in 0..20 {
        app.world_mut()
            .resource_mut::<SpeechDirector>()
            .next_speech_ms = 0.0;
        app.update();
        let bubbles = app.world().resource::<ActiveBubbles>();
        assert!(
            bubbles.thought_count <= SPEECH_MAX_ACTIVE,
            "Ambient bubbles exceeded the cap"
        );
    }

    let bubbles = app.world().resource::<ActiveBubbles>();
    assert_eq!(bubbles.thought_count, SPEECH_MAX_ACTIVE);
    let live_thoughts = app
        .world_mut()
        .query::<&SpeechBubble>()
        .iter(app.world())
        .count();
    assert_eq!(live_thoughts, SPEECH_MAX_ACTIVE, "Side-table count drifted");
}

#[test]
fn test_shout_evicts_the_existing_bubble() {
    let mut app = build_test_app();
    app.add_plugins((DataPlugin, RunnerPlugin, PartyPlugin, SpeechPlugin));
    boot_into_playing(&mut app);

    for _ in 0..4 {
        app.world_mut().send_event(RecruitEvent {
            avatar_id: "redhat".to_string(),
        });
    }
    app.update();

    // Get a thought bubble up on someone.
    for _ in 0..10 {
        app.world_mut()
            .resource_mut::<SpeechDirector>()
            .next_speech_ms = 0.0;
        app.update();
        if !app.world().resource::<ActiveBubbles>().by_member.is_empty() {
            break;
        }
    }
    let (talker, old_bubble) = {
        let bubbles = app.world().resource::<ActiveBubbles>();
        let (&member, &bubble) = bubbles.by_member.iter().next().unwrap();
        (member, bubble)
    };

    app.world_mut().send_event(ShoutEvent {
        line: "가자!".to_string(),
    });
    app.update();

    let survivors: Vec<Entity> = app
        .world_mut()
        .query_filtered::<Entity, With<SpeechBubble>>()
        .iter(app.world())
        .collect();
    assert!(
        !survivors.contains(&old_bubble),
        "Shout must evict the bubble it replaces"
    );

    let bubbles = app.world().resource::<ActiveBubbles>();
    let new_bubble = bubbles.by_member[&talker];
    assert_ne!(new_bubble, old_bubble);
    let style = app
        .world()
        .entity(new_bubble)
        .get::<SpeechBubble>()
        .map(|b| b.style);
    assert_eq!(style, Some(BubbleStyle::Shout));
}

// ─────────────────────────────────────────────────────────────────────────────
// Command surface & snapshot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sprint_command_rejected_at_zero_health() {
    let mut app = build_test_app();
    // Party and weather plugins own resources the snapshot publisher reads.
    app.add_plugins((HealthPlugin, PartyPlugin, WeatherPlugin, UiPlugin));
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<HealthMeter>().ratio = 0.0;
    app.world_mut().resource_mut::<RunnerInput>().toggle_sprint = true;
    app.update();
    app.world_mut().resource_mut::<RunnerInput>().toggle_sprint = false;

    let buffs = app.world().resource::<BuffWindows>();
    assert!(!buffs.sprint_manual, "Sprint must stay off at zero health");

    // The rejection still forced a push, and the snapshot shows it.
    let channel = app.world().resource::<SnapshotChannel>();
    assert!(!channel.force_push, "Forced push was consumed");
    assert!(!channel.published.sprint_manual);
    assert_eq!(channel.published.health_percent, 0);
}

#[test]
fn test_magnet_command_pushes_snapshot_immediately() {
    let mut app = build_test_app();
    app.add_plugins((HealthPlugin, PartyPlugin, WeatherPlugin, UiPlugin));
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<RunnerInput>().toggle_magnet = true;
    app.update();
    app.world_mut().resource_mut::<RunnerInput>().toggle_magnet = false;

    let buffs = app.world().resource::<BuffWindows>();
    assert!(buffs.magnet_manual);

    // No 140ms wait: the toggle bypassed the rate limiter.
    let channel = app.world().resource::<SnapshotChannel>();
    assert!(channel.published.magnet_manual);
}

// ─────────────────────────────────────────────────────────────────────────────
// Rain
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rain_manual_override_is_sticky() {
    let mut app = build_test_app();
    app.add_plugins(WeatherPlugin);
    enter_playing_state(&mut app);

    {
        let mut cycle = app.world_mut().resource_mut::<RainCycle>();
        let mut rng = rand::thread_rng();
        cycle.set_manual(true, 0.0, &mut rng);
        // A long-expired deadline must be ignored while manual.
        cycle.next_toggle_ms = 0.0;
    }

    for _ in 0..10 {
        app.update();
    }
    let cycle = app.world().resource::<RainCycle>();
    assert!(cycle.manual);
    assert!(cycle.raining, "Manual-on pins rain On across ticks");

    // Back to auto: dry immediately, scheduler re-armed in the future.
    {
        let mut cycle = app.world_mut().resource_mut::<RainCycle>();
        let mut rng = rand::thread_rng();
        cycle.set_manual(false, 5000.0, &mut rng);
    }
    let cycle = app.world().resource::<RainCycle>();
    assert!(!cycle.manual);
    assert!(!cycle.raining);
    assert!(
        cycle.next_toggle_ms >= 5000.0 + RAIN_MIN_OFF_MS,
        "Auto loop re-armed with an Off-state dwell"
    );
}
