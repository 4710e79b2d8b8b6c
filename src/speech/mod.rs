//! Speech bubbles: ambient self-talk on a randomized interval, and
//! player-forced shouts that land on every member at once.
//!
//! Bubbles are free entities tied to their member through the
//! `ActiveBubbles` side-table — no member↔bubble pointer pair, and a
//! bubble never outlives its target.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::shared::*;

pub struct SpeechPlugin;

impl Plugin for SpeechPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpeechDirector>();
        app.init_resource::<ActiveBubbles>();
        app.add_systems(
            Update,
            (schedule_ambient_speech, handle_shouts, update_bubbles)
                .chain()
                .in_set(TickSet::Chatter),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// One live bubble following a party member.
#[derive(Component, Debug)]
pub struct SpeechBubble {
    pub member: Entity,
    pub expire_ms: f64,
    pub style: BubbleStyle,
}

/// Fade window at the end of a bubble's life, in ms.
const BUBBLE_FADE_MS: f64 = 300.0;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn spawn_bubble(
    commands: &mut Commands,
    bubbles: &mut ActiveBubbles,
    member: Entity,
    member_tf: &Transform,
    line: &str,
    style: BubbleStyle,
    expire_ms: f64,
) {
    let (bg, ink) = match style {
        BubbleStyle::Thought => (Color::srgba(1.0, 1.0, 1.0, 0.92), Color::srgb(0.15, 0.15, 0.2)),
        BubbleStyle::Shout => (Color::srgba(1.0, 0.93, 0.6, 0.95), Color::srgb(0.3, 0.15, 0.05)),
    };

    // Rough glyph-count sizing; real text metrics live in the renderer.
    let width = (line.chars().count() as f32 * 11.0 + 48.0).max(108.0);

    let entity = commands
        .spawn((
            SpeechBubble {
                member,
                expire_ms,
                style,
            },
            Sprite {
                color: bg,
                custom_size: Some(Vec2::new(width, 56.0)),
                ..default()
            },
            Transform::from_translation(bubble_anchor(member_tf)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(line.to_string()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(ink),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ));
        })
        .id();

    if style == BubbleStyle::Thought {
        bubbles.thought_count += 1;
    }
    bubbles.by_member.insert(member, entity);
}

/// Evicts whatever bubble the member currently shows, keeping the ambient
/// cap count honest when the victim was a thought bubble.
fn evict_bubble(
    commands: &mut Commands,
    bubbles: &mut ActiveBubbles,
    styles: &Query<&SpeechBubble>,
    member: Entity,
) {
    if let Some(bubble) = bubbles.by_member.remove(&member) {
        if let Ok(existing) = styles.get(bubble) {
            if existing.style == BubbleStyle::Thought {
                bubbles.thought_count = bubbles.thought_count.saturating_sub(1);
            }
        }
        if let Some(ec) = commands.get_entity(bubble) {
            ec.despawn_recursive();
        }
    }
}

fn bubble_anchor(member_tf: &Transform) -> Vec3 {
    Vec3::new(
        member_tf.translation.x,
        member_tf.translation.y + LEADER_FRAME_HEIGHT * member_tf.scale.y * 0.5 + 44.0,
        Z_FX,
    )
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Ambient speech: every 3.2–7.8 s pick a random member that isn't already
/// talking and float a random line over it. Skips silently when everyone
/// is talking or the ambient cap is reached.
fn schedule_ambient_speech(
    mut commands: Commands,
    time: Res<Time>,
    mut director: ResMut<SpeechDirector>,
    mut bubbles: ResMut<ActiveBubbles>,
    lines: Res<SpeechLines>,
    roster: Res<PartyRoster>,
    members: Query<&Transform, With<PartyMember>>,
) {
    let now = now_ms(&time);
    if now < director.next_speech_ms {
        return;
    }

    let mut rng = rand::thread_rng();
    director.next_speech_ms = now + rng.gen_range(SPEECH_MIN_INTERVAL_MS..SPEECH_MAX_INTERVAL_MS);

    if bubbles.thought_count >= SPEECH_MAX_ACTIVE || lines.lines.is_empty() {
        return;
    }

    let candidates: Vec<Entity> = roster
        .members
        .iter()
        .copied()
        .filter(|m| !bubbles.by_member.contains_key(m))
        .collect();
    let Some(&member) = candidates.choose(&mut rng) else {
        return;
    };
    let Ok(member_tf) = members.get(member) else {
        return;
    };
    let Some(line) = lines.lines.choose(&mut rng) else {
        return;
    };

    spawn_bubble(
        &mut commands,
        &mut bubbles,
        member,
        member_tf,
        line,
        BubbleStyle::Thought,
        now + SPEECH_DURATION_MS,
    );
}

/// Forced shouts hit every member at once, each evicting whatever its
/// target was already saying.
fn handle_shouts(
    mut commands: Commands,
    time: Res<Time>,
    mut events: EventReader<ShoutEvent>,
    mut bubbles: ResMut<ActiveBubbles>,
    roster: Res<PartyRoster>,
    members: Query<&Transform, With<PartyMember>>,
    styles: Query<&SpeechBubble>,
) {
    for event in events.read() {
        let now = now_ms(&time);
        for &member in &roster.members {
            let Ok(member_tf) = members.get(member) else {
                continue;
            };
            evict_bubble(&mut commands, &mut bubbles, &styles, member);
            spawn_bubble(
                &mut commands,
                &mut bubbles,
                member,
                member_tf,
                &event.line,
                BubbleStyle::Shout,
                now + SHOUT_DURATION_MS,
            );
        }
        info!("Party shout: {}", event.line);
    }
}

/// Bubbles ride their member, fade near expiry, and despawn when done or
/// when the member itself is gone.
fn update_bubbles(
    mut commands: Commands,
    time: Res<Time>,
    mut bubbles: ResMut<ActiveBubbles>,
    members: Query<&Transform, (With<PartyMember>, Without<SpeechBubble>)>,
    mut live: Query<(Entity, &SpeechBubble, &mut Transform, &mut Sprite, &Children)>,
    mut texts: Query<&mut TextColor>,
) {
    let now = now_ms(&time);

    for (entity, bubble, mut transform, mut sprite, children) in &mut live {
        let target = members.get(bubble.member);
        let expired = now >= bubble.expire_ms;

        if expired || target.is_err() {
            if bubble.style == BubbleStyle::Thought {
                bubbles.thought_count = bubbles.thought_count.saturating_sub(1);
            }
            // Only drop the side-table entry if it still points at us; a
            // forced shout may already have replaced it.
            if bubbles.by_member.get(&bubble.member) == Some(&entity) {
                bubbles.by_member.remove(&bubble.member);
            }
            commands.entity(entity).despawn_recursive();
            continue;
        }

        if let Ok(member_tf) = target {
            transform.translation = bubble_anchor(member_tf);
        }

        let remaining = bubble.expire_ms - now;
        if remaining < BUBBLE_FADE_MS {
            let alpha = (remaining / BUBBLE_FADE_MS).clamp(0.0, 1.0) as f32;
            sprite.color = sprite.color.with_alpha(0.92 * alpha);
            for &child in children.iter() {
                if let Ok(mut color) = texts.get_mut(child) {
                    color.0 = color.0.with_alpha(alpha);
                }
            }
        }
    }
}
