//! Error Taxonomy
//!
//! Three families of failures cross the component boundaries:
//! missing entities, business rule violations, and input validation.
//! No-op conditions (finished match, penalized player, exhausted
//! question list) are *not* errors — those paths return the match
//! unchanged so late or duplicate client requests stay idempotent.

use uuid::Uuid;

/// Crate-wide result alias.
pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced by matchmaking, answer processing and power-ups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    /// No match with the given id.
    #[error("match {0} not found")]
    MatchNotFound(Uuid),

    /// Player is not a participant of the match.
    #[error("player {0} not found in match")]
    PlayerNotFound(Uuid),

    /// No player profile for the given uid.
    #[error("profile {0} not found")]
    ProfileNotFound(String),

    /// Match already has its full complement of players.
    #[error("match is full")]
    MatchFull,

    /// Match is not in a joinable state.
    #[error("match is not joinable")]
    NotJoinable,

    /// Private match password did not match.
    #[error("password mismatch")]
    PasswordMismatch,

    /// Player already occupies another active match.
    #[error("player already in an active match")]
    AlreadyInMatch,

    /// Power-ups are disabled for this match.
    #[error("power-ups are disabled")]
    PowerUpsDisabled,

    /// Player does not hold the requested power-up.
    #[error("power-up not owned")]
    PowerUpNotOwned,

    /// Player reached the per-match power-up cap.
    #[error("power-up cap reached")]
    PowerUpCapReached,

    /// Malformed or missing request field.
    #[error("validation: {0}")]
    Validation(String),
}
