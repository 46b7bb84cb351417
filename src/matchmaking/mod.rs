//! Matchmaking
//!
//! Rank-based pairing of waiting players under tolerance rules, with a
//! process-wide mutual-exclusion lock guaranteeing at most one mutating
//! matchmaking operation at a time.

pub mod coordinator;

// Re-export key types
pub use coordinator::{tolerance_for, MatchmakingCoordinator};
