//! Match Engine Module
//!
//! The in-match half of the system: state, scoring, power-ups.
//!
//! ## Module Structure
//!
//! - `state`: Match entity, participants, status machine, effects
//! - `answer`: Answer validation, progress, win detection
//! - `effects`: Power-up effect application and expiry

pub mod answer;
pub mod effects;
pub mod state;

// Re-export key types
pub use answer::{AnswerProcessor, RANKING_POINTS_DELTA};
pub use state::{
    ActiveEffect, EffectPayload, Match, MatchPlayer, MatchRules, MatchStatus, PowerUpKind,
    MATCH_CAPACITY,
};
