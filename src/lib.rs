//! # MathRace Match Server
//!
//! Real-time competitive match engine for an equation racing game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MATHRACE SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  generator/      - Procedural question generation            │
//! │  ├── params.rs   - Constraints + clamping normalization      │
//! │  ├── expression.rs - Term model, rendering, evaluation       │
//! │  └── question.rs - Solvable multiple-choice questions        │
//! │                                                              │
//! │  game/           - In-match engine                           │
//! │  ├── state.rs    - Match, players, status, effects           │
//! │  ├── answer.rs   - Answer scoring and win detection          │
//! │  └── effects.rs  - Power-up effect engine                    │
//! │                                                              │
//! │  matchmaking/    - Rank-based pairing                        │
//! │  └── coordinator.rs - Find-or-create under a global lock     │
//! │                                                              │
//! │  store/          - External collaborator contracts           │
//! │  └── memory.rs   - In-memory stores (demo + tests)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Matchmaking holds one process-wide lock for the full duration of a
//! find-or-create call, so at most one mutating matchmaking operation
//! is in flight at a time. Answer processing relies on
//! fetch-mutate-persist against the match store, which must serialize
//! writes per match id. Questions are pre-generated at match creation;
//! nothing else is CPU-bound.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod game;
pub mod generator;
pub mod matchmaking;
pub mod store;

// Re-export commonly used types
pub use error::{GameError, GameResult};
pub use game::{AnswerProcessor, Match, MatchPlayer, MatchRules, MatchStatus, PowerUpKind};
pub use generator::{generate, Comparison, EquationParams, Question};
pub use matchmaking::MatchmakingCoordinator;
pub use store::{MatchStore, PlayerProfile, ProfileStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
