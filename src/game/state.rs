//! Match State Definitions
//!
//! In-memory representation of one contest: participants, question
//! sequence, active effects, status. The canonical instance is owned
//! by the match store; every component fetches, mutates, and writes
//! back — nothing holds a live reference across calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameError;
use crate::generator::{Comparison, Question};

/// Head-to-head matches hold at most two participants.
pub const MATCH_CAPACITY: usize = 2;

// =============================================================================
// POWER-UPS & ACTIVE EFFECTS
// =============================================================================

/// Power-up types a player can hold and activate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Self-boost: the next correct answer advances position twice.
    DoublePoints,
    /// Rival-disruption: the rival's next questions get shuffled options.
    ShuffleRival,
}

/// Per-kind effect data, matched by pattern instead of a string-keyed
/// property bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectPayload {
    /// Double-points boost armed on the source player.
    DoublePoints,
    /// Precomputed shuffled option list served to the target instead of
    /// the question's own order.
    ShuffleRival {
        /// Replacement option order.
        options: Vec<i64>,
    },
}

impl EffectPayload {
    /// The power-up kind this payload belongs to.
    pub fn kind(&self) -> PowerUpKind {
        match self {
            EffectPayload::DoublePoints => PowerUpKind::DoublePoints,
            EffectPayload::ShuffleRival { .. } => PowerUpKind::ShuffleRival,
        }
    }
}

/// A live power-up consequence attached to a match.
///
/// Effects expire either by clock (`expires_at`) or by counting down
/// future questions (`questions_remaining`). Expired effects are
/// deactivated but stay in the list; lookups must filter on `active`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Effect id.
    pub id: Uuid,
    /// Player who triggered the power-up.
    pub source: Uuid,
    /// Affected player; `None` means the effect targets the source.
    pub target: Option<Uuid>,
    /// Kind-specific data.
    pub payload: EffectPayload,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Clock-based expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Count-based expiry: remaining questions this effect applies to.
    pub questions_remaining: u32,
    /// Inert once false.
    pub active: bool,
}

// =============================================================================
// MATCH PLAYER
// =============================================================================

/// A contestant's per-match state (not the persistent profile).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayer {
    /// Player id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Per-match transport handle, refreshed on reconnect.
    pub connection: String,
    /// Correct answers so far.
    pub correct_count: u32,
    /// Index of the next unanswered question. Never decreases.
    pub next_question: usize,
    /// Track position.
    pub position: u32,
    /// Ready to race. Set by the transport layer's ready signal; the
    /// core state machine starts the race on capacity, not readiness.
    pub ready: bool,
    /// Submissions are ignored until this passes (wrong-answer cooldown).
    pub penalty_until: Option<DateTime<Utc>>,
    /// When the player exhausted the question list, if they have.
    pub finished_at: Option<DateTime<Utc>>,
    /// Granted, not-yet-activated power-ups.
    pub power_ups: Vec<PowerUpKind>,
    /// Double-points boost armed, consumed by the next correct answer.
    pub double_points_armed: bool,
}

impl MatchPlayer {
    /// Create a fresh participant.
    pub fn new(id: Uuid, name: impl Into<String>, connection: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connection: connection.into(),
            correct_count: 0,
            next_question: 0,
            position: 0,
            ready: false,
            penalty_until: None,
            finished_at: None,
            power_ups: Vec::new(),
            double_points_armed: false,
        }
    }

    /// Whether a wrong-answer penalty is still running at `now`.
    pub fn is_penalized(&self, now: DateTime<Utc>) -> bool {
        self.penalty_until.is_some_and(|until| until > now)
    }
}

// =============================================================================
// MATCH STATUS
// =============================================================================

/// Lifecycle of a match. `Finished` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// One participant, open slot.
    #[default]
    WaitingForPlayers,
    /// Both slots filled, racing.
    InProgress,
    /// Win condition fired; no further mutation accepted.
    Finished,
}

// =============================================================================
// MATCH RULES
// =============================================================================

/// Per-match gameplay settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRules {
    /// Questions pre-generated at creation.
    pub max_questions: usize,
    /// Correct answers needed to win outright.
    pub win_threshold: u32,
    /// Comparison outcome shared by every question of the match.
    pub expected: Comparison,
    /// Whether power-ups may be activated.
    pub power_ups_enabled: bool,
    /// Per-player power-up activation cap.
    pub power_up_cap: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            max_questions: 20,
            win_threshold: 10,
            expected: Comparison::Greater,
            power_ups_enabled: true,
            power_up_cap: 3,
        }
    }
}

// =============================================================================
// MATCH
// =============================================================================

/// Complete state of one contest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Match {
    /// Match id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Private matches require the password to join.
    pub private: bool,
    /// Password for private matches.
    pub password: Option<String>,
    /// Participants, at most [`MATCH_CAPACITY`].
    pub players: Vec<MatchPlayer>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Pre-generated question sequence, shared by both players.
    pub questions: Vec<Question>,
    /// Gameplay settings.
    pub rules: MatchRules,
    /// Winner id, set when the match finishes.
    pub winner: Option<Uuid>,
    /// Live and spent power-up effects.
    pub effects: Vec<ActiveEffect>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Player who initiated creation, if known.
    pub created_by: Option<Uuid>,
}

impl Match {
    /// Create a match in `WaitingForPlayers` with no participants yet.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        questions: Vec<Question>,
        rules: MatchRules,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            private: false,
            password: None,
            players: Vec::with_capacity(MATCH_CAPACITY),
            status: MatchStatus::WaitingForPlayers,
            questions,
            rules,
            winner: None,
            effects: Vec::new(),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    /// Add a participant. Transitions to `InProgress` the instant the
    /// second participant joins.
    pub fn add_player(&mut self, player: MatchPlayer) -> Result<(), GameError> {
        if self.status == MatchStatus::Finished {
            return Err(GameError::NotJoinable);
        }
        if self.players.len() >= MATCH_CAPACITY {
            return Err(GameError::MatchFull);
        }
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(GameError::AlreadyInMatch);
        }

        self.players.push(player);
        if self.players.len() == MATCH_CAPACITY {
            self.status = MatchStatus::InProgress;
        }
        Ok(())
    }

    /// Look up a participant.
    pub fn player(&self, id: Uuid) -> Option<&MatchPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Look up a participant mutably.
    pub fn player_mut(&mut self, id: Uuid) -> Option<&mut MatchPlayer> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The rival of `id`, if both slots are filled.
    pub fn rival_of(&self, id: Uuid) -> Option<&MatchPlayer> {
        self.players.iter().find(|p| p.id != id)
    }

    /// Whether there is still an open slot.
    pub fn has_capacity(&self) -> bool {
        self.players.len() < MATCH_CAPACITY
    }

    /// Whether the match reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Mark the match finished with a winner. Idempotent.
    pub fn finish(&mut self, winner: Uuid) {
        if self.status != MatchStatus::Finished {
            self.status = MatchStatus::Finished;
            self.winner = Some(winner);
        }
    }
}
