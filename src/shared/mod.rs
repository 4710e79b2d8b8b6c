//! Shared components, resources, events, and states for Paceline.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    AvatarSelect,
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// TICK ORDER — one chained SystemSet sequence, configured in main.rs
// ═══════════════════════════════════════════════════════════════════════

/// Per-frame stage order. Later stages may read state produced earlier in
/// the same tick, so the chain must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum TickSet {
    /// Leader motion, jump physics, animation clocks.
    Drive,
    /// Buff expiry bookkeeping.
    Buffs,
    /// Health meter drain and the sprint hard gate.
    Meter,
    /// Pickup spawning, motion, and collection.
    Spawn,
    /// Party formation, tilt, and animation sync.
    Formation,
    /// Speech bubbles and milestone celebrations.
    Chatter,
    /// Rain cycle state machine and drop recycling.
    Weather,
    /// Footstep frame events to audio cues.
    Footsteps,
    /// Rate-limited external UI snapshot publication.
    Publish,
}

// ═══════════════════════════════════════════════════════════════════════
// AVATARS
// ═══════════════════════════════════════════════════════════════════════

/// String avatar identifiers ("batcop", "bluehair", "redhat", "redman")
/// for a data-driven registry — the external shell hands one over as text.
pub type AvatarId = String;

#[derive(Debug, Clone)]
pub struct AvatarDef {
    pub id: AvatarId,
    pub name: String,
    /// Flat body color the renderer uses in place of sprite art.
    pub body_color: Color,
    /// Accent color (trim stripe / select-screen swatch).
    pub trim_color: Color,
    /// Nominal frame height in px. Drives the visual-size normalization
    /// so differently proportioned avatars read as roughly leader-sized.
    pub sprite_height: f32,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct AvatarRegistry {
    pub avatars: HashMap<AvatarId, AvatarDef>,
    /// Stable ordering for the select screen and uniform random picks.
    pub order: Vec<AvatarId>,
}

impl AvatarRegistry {
    pub fn get(&self, id: &str) -> Option<&AvatarDef> {
        self.avatars.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.avatars.contains_key(id)
    }
}

/// The avatar the player confirmed on the select screen (or the settings
/// handoff). Always holds a registered id once Playing begins.
#[derive(Resource, Debug, Clone)]
pub struct SelectedAvatar {
    pub id: AvatarId,
}

impl Default for SelectedAvatar {
    fn default() -> Self {
        Self {
            id: DEFAULT_AVATAR.to_string(),
        }
    }
}

/// Ambient one-liners party members mutter while running.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpeechLines {
    pub lines: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// SETTINGS — optional settings.ron handoff from the outer shell
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    /// Pre-selected avatar id. Unknown or absent falls back to the default.
    pub avatar: Option<String>,
    /// Master volume for SFX and music, 0.0–1.0.
    pub volume: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            avatar: None,
            volume: 0.8,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT — filled once per frame in PreUpdate
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Menu,
    Gameplay,
}

/// The single frame-scoped view of player intent. Domains read this, never
/// the keyboard directly.
#[derive(Resource, Debug, Clone, Default)]
pub struct RunnerInput {
    /// -1.0, 0.0, or 1.0.
    pub move_axis: f32,
    pub jump: bool,
    pub sprint_held: bool,
    pub pause: bool,
    pub drink_potion: bool,
    pub toggle_magnet: bool,
    pub toggle_auto_run: bool,
    pub toggle_sprint: bool,
    pub toggle_rain: bool,
    pub shout_go: bool,
    pub shout_cheer: bool,
    pub ui_up: bool,
    pub ui_down: bool,
    pub ui_confirm: bool,
    pub any_key: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// LEADER & PARTY COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Marker for the party leader (the controlled runner).
#[derive(Component, Debug, Clone, Default)]
pub struct Leader;

/// One party member, leader included. Index 0 of the roster is always the
/// leader; followers are appended on recruitment and never removed mid-run.
#[derive(Component, Debug, Clone)]
pub struct PartyMember {
    pub avatar_id: AvatarId,
    /// Visual scale relative to the leader (leader = 1.0).
    pub scale: f32,
    /// Radians. Desynchronizes formation sway among followers.
    pub phase: f32,
    /// Frame the idle clip restarts from, so same-kind members don't
    /// breathe in lockstep.
    pub idle_start_frame: usize,
}

/// Vertical physics and horizontal intent for the leader.
#[derive(Component, Debug, Clone)]
pub struct LeaderMotion {
    /// Signed world scroll in px/s. Positive = running right.
    pub scroll_speed: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// 1.0 facing right, -1.0 facing left.
    pub facing: f32,
}

impl Default for LeaderMotion {
    fn default() -> Self {
        Self {
            scroll_speed: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            facing: 1.0,
        }
    }
}

impl LeaderMotion {
    pub fn moving_horizontally(&self) -> bool {
        self.scroll_speed.abs() > MOVE_EPSILON
    }
}

/// Frame clock for one member's run/idle clips. Advanced every tick;
/// `running` selects which clip the frame index refers to.
#[derive(Component, Debug, Clone)]
pub struct AnimClock {
    pub frame: usize,
    pub accumulator: f32,
    pub running: bool,
    /// Playback rate multiplier (2.0 under sprint).
    pub rate: f32,
}

impl Default for AnimClock {
    fn default() -> Self {
        Self {
            frame: 0,
            accumulator: 0.0,
            running: false,
            rate: 1.0,
        }
    }
}

/// Ordered party list plus per-avatar recruitment counters.
#[derive(Resource, Debug, Clone, Default)]
pub struct PartyRoster {
    /// members[0] is the leader.
    pub members: Vec<Entity>,
    /// How many members of each avatar kind have been recruited, used for
    /// idle-phase desynchronization.
    pub ordinals: HashMap<AvatarId, usize>,
}

impl PartyRoster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_PARTY_SIZE
    }

    /// Next idle-clip start frame for this avatar kind. 7 is coprime with
    /// the 25-frame idle cycle, so repeated recruits of the same kind walk
    /// through distinct start frames.
    pub fn allocate_idle_start(&mut self, avatar_id: &str) -> usize {
        let ordinal = self.ordinals.entry(avatar_id.to_string()).or_insert(0);
        let frame = (*ordinal * IDLE_DESYNC_STEP) % IDLE_FRAME_COUNT;
        *ordinal += 1;
        frame
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PICKUPS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    Coin,
    KingCoin,
    SuperKingCoin,
    MagnetItem,
    AutoRunItem,
    AllyItem,
}

/// A spawned coin or item scrolling toward the player.
#[derive(Component, Debug, Clone)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Coin value. Zero for non-coin kinds.
    pub value: u32,
    /// X position last frame, for the sweep collection test.
    pub prev_x: f32,
    /// Which avatar an ally item recruits.
    pub ally: Option<AvatarId>,
}

/// Spawn scheduling state for the coin/item director.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpawnDirector {
    pub next_spawn_ms: f64,
    /// Coins still owed by the burst in progress. Zero = no burst.
    pub burst_remaining: u8,
    /// Height level shared by every coin of the current burst.
    pub burst_y: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// BUFFS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuffKind {
    Magnet,
    AutoRun,
}

impl BuffKind {
    pub fn duration_ms(self) -> f64 {
        match self {
            BuffKind::Magnet => MAGNET_DURATION_MS,
            BuffKind::AutoRun => AUTO_RUN_DURATION_MS,
        }
    }
}

/// Timed buff windows plus the manual overrides. A buff is active iff its
/// manual flag is set OR the wall clock has not reached its expiry.
#[derive(Resource, Debug, Clone, Default)]
pub struct BuffWindows {
    pub magnet_until_ms: f64,
    pub auto_run_until_ms: f64,
    pub magnet_manual: bool,
    pub auto_run_manual: bool,
    /// Sprint has no timed window — manual only, hard-gated by health.
    pub sprint_manual: bool,
}

impl BuffWindows {
    /// Refreshes the expiry. Expiries only ever extend forward; a re-pickup
    /// close to an earlier long refresh never shortens the window.
    pub fn activate(&mut self, kind: BuffKind, now_ms: f64) {
        let until = now_ms + kind.duration_ms();
        match kind {
            BuffKind::Magnet => self.magnet_until_ms = self.magnet_until_ms.max(until),
            BuffKind::AutoRun => self.auto_run_until_ms = self.auto_run_until_ms.max(until),
        }
    }

    pub fn is_active(&self, kind: BuffKind, now_ms: f64) -> bool {
        match kind {
            BuffKind::Magnet => self.magnet_manual || now_ms < self.magnet_until_ms,
            BuffKind::AutoRun => self.auto_run_manual || now_ms < self.auto_run_until_ms,
        }
    }

    /// Whole seconds left on the timed window (manual overrides excluded).
    pub fn remaining_secs(&self, kind: BuffKind, now_ms: f64) -> u32 {
        let until = match kind {
            BuffKind::Magnet => self.magnet_until_ms,
            BuffKind::AutoRun => self.auto_run_until_ms,
        };
        ((until - now_ms).max(0.0) / 1000.0).ceil() as u32
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HEALTH METER & WALLET
// ═══════════════════════════════════════════════════════════════════════

/// The single [0, 1] stamina ratio. Drains while running, restored by
/// potions bought with coins.
#[derive(Resource, Debug, Clone)]
pub struct HealthMeter {
    pub ratio: f32,
}

impl Default for HealthMeter {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl HealthMeter {
    /// Continuous drain: `multiplier` 1.0 empties a full meter in
    /// HEALTH_FULL_DURATION_SEC seconds.
    pub fn drain(&mut self, dt_secs: f32, multiplier: f32) {
        if dt_secs <= 0.0 || multiplier <= 0.0 {
            return;
        }
        self.ratio = (self.ratio - (dt_secs / HEALTH_FULL_DURATION_SEC) * multiplier).clamp(0.0, 1.0);
    }

    /// Spends HEALTH_RECHARGE_COST coins for a HEALTH_RECHARGE_RATIO step.
    /// Returns false (and changes nothing) when already full or broke.
    pub fn try_recharge(&mut self, wallet: &mut Wallet) -> bool {
        if self.ratio >= 1.0 || wallet.coins < HEALTH_RECHARGE_COST {
            return false;
        }
        wallet.coins -= HEALTH_RECHARGE_COST;
        self.ratio = (self.ratio + HEALTH_RECHARGE_RATIO).min(1.0);
        true
    }

    pub fn percent(&self) -> u32 {
        (self.ratio * 100.0).round().clamp(0.0, 100.0) as u32
    }

    pub fn can_sprint(&self) -> bool {
        self.ratio > 0.0
    }
}

/// Coin currency. `lifetime` only ever grows and drives the milestone
/// ledger; `coins` is the spendable balance shown on the HUD.
#[derive(Resource, Debug, Clone, Default)]
pub struct Wallet {
    pub coins: u32,
    pub lifetime: u32,
}

impl Wallet {
    pub fn earn(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        self.lifetime = self.lifetime.saturating_add(amount);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MILESTONES
// ═══════════════════════════════════════════════════════════════════════

/// Detected-but-not-yet-celebrated score milestones. Detection can enqueue
/// several at once; presentation drains them strictly one at a time.
#[derive(Resource, Debug, Clone)]
pub struct MilestoneLedger {
    pub next_threshold: u32,
    pub queue: VecDeque<u32>,
    pub in_flight: bool,
}

impl Default for MilestoneLedger {
    fn default() -> Self {
        Self {
            next_threshold: COIN_MILESTONE_STEP,
            queue: VecDeque::new(),
            in_flight: false,
        }
    }
}

impl MilestoneLedger {
    /// Enqueues every threshold the lifetime score has crossed. A single
    /// big collection can cross more than one; none may be skipped.
    pub fn record(&mut self, lifetime_score: u32) {
        while lifetime_score >= self.next_threshold {
            self.queue.push_back(self.next_threshold);
            self.next_threshold += COIN_MILESTONE_STEP;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPEECH
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    /// Ambient self-talk, scheduler-driven, capped.
    Thought,
    /// Player-forced shout. Evicts any bubble already on the target.
    Shout,
}

/// Scheduling state for ambient speech.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpeechDirector {
    pub next_speech_ms: f64,
}

/// Side-table from member entity to its live bubble entity. Replaces the
/// member↔bubble pointer pair with a non-owning relation.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveBubbles {
    pub by_member: HashMap<Entity, Entity>,
    pub thought_count: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// RAIN
// ═══════════════════════════════════════════════════════════════════════

/// The two-state rain machine. While `manual` is set the auto scheduler is
/// suspended; clearing it re-arms the randomized dwell loop.
#[derive(Resource, Debug, Clone)]
pub struct RainCycle {
    pub raining: bool,
    pub manual: bool,
    pub next_toggle_ms: f64,
}

impl Default for RainCycle {
    fn default() -> Self {
        Self {
            raining: true,
            manual: false,
            next_toggle_ms: 0.0,
        }
    }
}

impl RainCycle {
    /// Manual-on pins rain On. Manual-off drops to dry and re-arms the
    /// auto loop with a fresh Off-state dwell.
    pub fn set_manual(&mut self, enabled: bool, now_ms: f64, rng: &mut impl Rng) {
        self.manual = enabled;
        if enabled {
            self.raining = true;
        } else {
            self.raining = false;
            self.next_toggle_ms = now_ms + rng.gen_range(RAIN_MIN_OFF_MS..RAIN_MAX_OFF_MS);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FOOTSTEPS
// ═══════════════════════════════════════════════════════════════════════

/// Debounce clock for footstep cues. Animation-system frame callbacks can
/// report the same frame twice in quick succession.
#[derive(Resource, Debug, Clone, Default)]
pub struct FootstepClock {
    pub last_step_ms: f64,
}

// ═══════════════════════════════════════════════════════════════════════
// EXTERNAL UI SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════

/// Immutable player-facing state snapshot for the embedding shell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub coin_score: u32,
    pub party_count: u32,
    pub health_percent: u32,
    pub magnet_manual: bool,
    pub magnet_seconds: u32,
    pub auto_manual: bool,
    pub auto_seconds: u32,
    pub sprint_manual: bool,
    pub rain_manual: bool,
    pub rain_active: bool,
}

/// Publication gate for UI snapshots: at most one push per
/// SNAPSHOT_MIN_GAP_MS unless a command forces an immediate one.
#[derive(Resource, Debug, Clone, Default)]
pub struct SnapshotChannel {
    pub last_push_ms: f64,
    pub force_push: bool,
    pub published: UiSnapshot,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfxId {
    Coin,
    KingCoin,
    SuperKingCoin,
    Magnet,
    Powerup,
    AllyJoin,
    Milestone,
    Footstep,
    Potion,
    MenuMove,
    MenuSelect,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub id: SfxId,
    /// Playback speed ratio (footstep pitch scales with run rate).
    pub rate: f32,
}

impl PlaySfxEvent {
    pub fn new(id: SfxId) -> Self {
        Self { id, rate: 1.0 }
    }
}

/// Floating feedback label ("+10!", "MAGNET 30s", …) rising from a world
/// position.
#[derive(Event, Debug, Clone)]
pub struct FloatingTextEvent {
    pub text: String,
    pub at: Vec2,
    pub color: Color,
    pub font_size: f32,
}

/// Collected ally item — the party domain decides whether the recruit
/// actually happens (cap, registry) and owns all success feedback.
#[derive(Event, Debug, Clone)]
pub struct RecruitEvent {
    pub avatar_id: AvatarId,
}

/// Party-wide forced speech.
#[derive(Event, Debug, Clone)]
pub struct ShoutEvent {
    pub line: String,
}

/// Potion request, from the R key or the external command surface.
#[derive(Event, Debug, Clone)]
pub struct DrinkPotionEvent;

/// The leader's run clip advanced to `frame`. Source of footstep cues.
#[derive(Event, Debug, Clone)]
pub struct RunFrameEvent {
    pub frame: usize,
    pub rate: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

pub const DEFAULT_AVATAR: &str = "batcop";

// ─── Leader motion ───
pub const MOVE_SPEED: f32 = 350.0;
pub const SPRINT_MULTIPLIER: f32 = 2.0;
pub const MOVE_EPSILON: f32 = 5.0;
pub const JUMP_VELOCITY: f32 = 720.0;
pub const GRAVITY: f32 = 1700.0;
pub const GROUND_Y: f32 = -170.0;
pub const BG_SCROLL_FACTOR: f32 = 0.35;

// ─── Animation ───
pub const RUN_FRAME_COUNT: usize = 23;
pub const IDLE_FRAME_COUNT: usize = 25;
pub const ANIM_FPS: f32 = 12.0;
pub const IDLE_DESYNC_STEP: usize = 7;
pub const LEADER_FRAME_HEIGHT: f32 = 34.0;

// ─── Buffs ───
pub const MAGNET_DURATION_MS: f64 = 30_000.0;
pub const AUTO_RUN_DURATION_MS: f64 = 60_000.0;

// ─── Health ───
pub const HEALTH_FULL_DURATION_SEC: f32 = 180.0;
pub const HEALTH_RECHARGE_COST: u32 = 10;
pub const HEALTH_RECHARGE_RATIO: f32 = 0.1;

// ─── Pickups ───
pub const COIN_SPAWN_MIN_MS: f64 = 550.0;
pub const COIN_SPAWN_MAX_MS: f64 = 1200.0;
pub const COIN_BURST_CHANCE_PERCENT: u32 = 24;
pub const COIN_BURST_MIN_COUNT: u8 = 4;
pub const COIN_BURST_MAX_COUNT: u8 = 7;
pub const COIN_BURST_MIN_GAP_MS: f64 = 85.0;
pub const COIN_BURST_MAX_GAP_MS: f64 = 140.0;
pub const COIN_RUN_HEIGHT_OFFSET: f32 = 72.0;
pub const COIN_JUMP_HEIGHT_OFFSET: f32 = 182.0;
pub const KING_COIN_CHANCE_PERCENT: u32 = 12;
pub const KING_COIN_VALUE: u32 = 10;
pub const SUPER_KING_COIN_CHANCE_PERCENT: u32 = 2;
pub const SUPER_KING_COIN_VALUE: u32 = 30;
pub const ALLY_ITEM_CHANCE_PERCENT: u32 = 18;
pub const AUTO_ITEM_CHANCE_PERCENT: u32 = 5;
pub const MAGNET_ITEM_CHANCE_PERCENT: u32 = 7;
pub const MAGNET_ATTRACT_RADIUS: f32 = 220.0;
pub const MAGNET_COLLECT_RADIUS: f32 = 44.0;
pub const MAGNET_PULL_SPEED: f32 = 760.0;
pub const MAGNET_PULL_FLOOR: f32 = 180.0;
pub const PICKUP_DESPAWN_MARGIN: f32 = 80.0;
pub const PICKUP_SPAWN_LEAD: f32 = 40.0;
pub const SWEEP_X_TOLERANCE: f32 = 14.0;
pub const SWEEP_Y_MAX: f32 = 72.0;

// ─── Party formation ───
pub const MAX_PARTY_SIZE: usize = 20;
pub const PARTY_BASE_SPACING_X: f32 = 30.0;
pub const PARTY_SWAY_X: f32 = 70.0;
/// Tunable; shipped at zero so the cosine term is dormant but live.
pub const PARTY_SWAY_Y: f32 = 0.0;
pub const PARTY_SWAY_BASE_SPEED: f32 = 0.56;
pub const PARTY_FOLLOW_LERP_BASE: f32 = 0.05;
pub const PARTY_FOLLOW_LERP_DT: f32 = 0.18;
pub const JUMP_TILT_DEG: f32 = 8.0;
pub const TILT_EASE: f32 = 0.22;
pub const FOLLOWER_MIN_SCALE_RATIO: f32 = 0.8;
pub const FOLLOWER_MAX_SCALE_RATIO: f32 = 1.1;
pub const FOLLOWER_NORMALIZE_MIN: f32 = 0.75;
pub const FOLLOWER_NORMALIZE_MAX: f32 = 1.25;

// ─── Speech ───
pub const SPEECH_MIN_INTERVAL_MS: f64 = 3200.0;
pub const SPEECH_MAX_INTERVAL_MS: f64 = 7800.0;
pub const SPEECH_DURATION_MS: f64 = 1900.0;
pub const SHOUT_DURATION_MS: f64 = 1200.0;
pub const SPEECH_MAX_ACTIVE: usize = 2;

// ─── Milestones ───
pub const COIN_MILESTONE_STEP: u32 = 100;
pub const MILESTONE_CARD_MS: f64 = 1000.0;

// ─── Rain ───
pub const RAIN_MIN_ON_MS: f64 = 4500.0;
pub const RAIN_MAX_ON_MS: f64 = 10_500.0;
pub const RAIN_MIN_OFF_MS: f64 = 6000.0;
pub const RAIN_MAX_OFF_MS: f64 = 15_000.0;
pub const RAIN_DROP_COUNT: usize = 140;

// ─── Footsteps ───
pub const FOOTSTEP_FRAME_START: usize = 3;
pub const FOOTSTEP_FRAME_STEP: usize = 4;
pub const FOOTSTEP_FRAME_END: usize = 23;
pub const FOOTSTEP_HIGH_SPEED_THRESHOLD: f32 = 1.4;
pub const FOOTSTEP_MIN_INTERVAL_MS: f64 = 45.0;

// ─── UI ───
pub const SNAPSHOT_MIN_GAP_MS: f64 = 140.0;
pub const FPS_UPDATE_INTERVAL_MS: f64 = 150.0;

// ─── Z layers ───
pub const Z_BACKGROUND: f32 = 0.0;
pub const Z_PICKUP: f32 = 5.0;
pub const Z_PARTY_BASE: f32 = 10.0;
pub const Z_FX: f32 = 20.0;
pub const Z_RAIN: f32 = 30.0;

/// Milliseconds on the (virtual, pause-aware) session clock.
pub fn now_ms(time: &Time) -> f64 {
    time.elapsed_secs_f64() * 1000.0
}
