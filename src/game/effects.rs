//! Power-Up Effect Engine
//!
//! Applies, decrements, and expires the effects a power-up leaves on a
//! match. Two semantics exist:
//!
//! - **Self-boost** (double points): a flag on the participant,
//!   consumed by the next correct answer, doubling that one position
//!   increment.
//! - **Rival-disruption** (shuffle options): an effect bound to the
//!   target participant with a questions-remaining counter; while
//!   active, served questions carry the effect's precomputed option
//!   order instead of their own.
//!
//! Effects never block or retry; they are applied synchronously inside
//! the operation that triggers them. Spent effects stay in the match's
//! effect list with `active = false` and every lookup filters on that
//! flag.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::error::GameError;
use crate::game::state::{ActiveEffect, EffectPayload, Match, PowerUpKind};
use crate::generator::Question;

/// How many of the rival's future questions a shuffle disrupts.
pub const SHUFFLE_QUESTION_SPAN: u32 = 2;

/// Clock-based lifetime of an effect, as a fallback to the counter.
pub const EFFECT_TTL_SECONDS: i64 = 60;

/// Activate a granted power-up for a participant.
///
/// Validates that power-ups are enabled, the player holds the grant
/// and has not exceeded the per-player cap, then consumes the grant
/// and attaches the effect.
pub fn activate_power_up(
    game: &mut Match,
    player_id: Uuid,
    kind: PowerUpKind,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    if !game.rules.power_ups_enabled {
        return Err(GameError::PowerUpsDisabled);
    }
    if game.is_finished() {
        return Err(GameError::NotJoinable);
    }

    let cap = game.rules.power_up_cap as usize;
    let used = game.effects.iter().filter(|e| e.source == player_id).count();
    if used >= cap {
        return Err(GameError::PowerUpCapReached);
    }

    let player = game
        .player(player_id)
        .ok_or(GameError::PlayerNotFound(player_id))?;
    let grant_index = player
        .power_ups
        .iter()
        .position(|p| *p == kind)
        .ok_or(GameError::PowerUpNotOwned)?;

    let effect = match kind {
        PowerUpKind::DoublePoints => ActiveEffect {
            id: Uuid::new_v4(),
            source: player_id,
            target: None,
            payload: EffectPayload::DoublePoints,
            created_at: now,
            expires_at: Some(now + Duration::seconds(EFFECT_TTL_SECONDS)),
            questions_remaining: 0,
            active: true,
        },
        PowerUpKind::ShuffleRival => {
            let rival = game
                .rival_of(player_id)
                .ok_or_else(|| GameError::Validation("no rival to disrupt".into()))?;
            let next = rival
                .next_question
                .min(game.questions.len().saturating_sub(1));
            let mut options = game
                .questions
                .get(next)
                .map(|q| q.options.clone())
                .ok_or_else(|| GameError::Validation("match has no questions".into()))?;
            options.shuffle(&mut rand::thread_rng());

            ActiveEffect {
                id: Uuid::new_v4(),
                source: player_id,
                target: Some(rival.id),
                payload: EffectPayload::ShuffleRival { options },
                created_at: now,
                expires_at: Some(now + Duration::seconds(EFFECT_TTL_SECONDS)),
                questions_remaining: SHUFFLE_QUESTION_SPAN,
                active: true,
            }
        }
    };

    let player = game
        .player_mut(player_id)
        .ok_or(GameError::PlayerNotFound(player_id))?;
    player.power_ups.remove(grant_index);
    if kind == PowerUpKind::DoublePoints {
        player.double_points_armed = true;
    }

    game.effects.push(effect);
    Ok(())
}

/// Position increment for one correct answer, consuming an armed
/// double-points boost exactly once.
pub fn position_increment(game: &mut Match, player_id: Uuid) -> u32 {
    let Some(player) = game.player_mut(player_id) else {
        return 1;
    };
    if !player.double_points_armed {
        return 1;
    }
    player.double_points_armed = false;

    // Retire the matching effect record.
    if let Some(effect) = game.effects.iter_mut().find(|e| {
        e.active && e.source == player_id && matches!(e.payload, EffectPayload::DoublePoints)
    }) {
        effect.active = false;
    }
    2
}

/// Apply an active rival-shuffle effect to a question about to be
/// served to `player_id`, decrementing its counter. Returns whether
/// the question was disrupted.
pub fn apply_shuffle(game: &mut Match, player_id: Uuid, question: &mut Question) -> bool {
    let Some(effect) = game.effects.iter_mut().find(|e| {
        e.active
            && e.target == Some(player_id)
            && matches!(e.payload, EffectPayload::ShuffleRival { .. })
    }) else {
        return false;
    };

    if let EffectPayload::ShuffleRival { options } = &effect.payload {
        question.options = options.clone();
    }
    effect.questions_remaining = effect.questions_remaining.saturating_sub(1);
    if effect.questions_remaining == 0 {
        effect.active = false;
    }
    true
}

/// Deactivate effects whose clock expiry has passed. Spent effects are
/// kept in the list; they are inert and ignored by lookups. An expired
/// double-points effect also disarms its holder's boost flag so the
/// record and the flag never disagree.
pub fn expire_effects(game: &mut Match, now: DateTime<Utc>) {
    let mut disarm = Vec::new();
    for effect in &mut game.effects {
        if effect.active && effect.expires_at.is_some_and(|at| at <= now) {
            effect.active = false;
            if matches!(effect.payload, EffectPayload::DoublePoints) {
                disarm.push(effect.source);
            }
        }
    }
    for source in disarm {
        if let Some(player) = game.player_mut(source) {
            player.double_points_armed = false;
        }
    }
}
