//! External Collaborator Contracts
//!
//! Persistence of matches and player profiles is outside this core.
//! These traits are the narrow seams the engine consumes; the bundled
//! in-memory implementations back the demo binary and the tests.
//!
//! ## Module Structure
//!
//! - `memory`: `tokio`-locked in-memory stores

pub mod memory;

// Re-export the default implementations
pub use memory::{InMemoryMatchStore, InMemoryProfileStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameResult;
use crate::game::state::Match;

/// Persistent player profile (the ranking identity behind a
/// match participant).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Profile id; equals the participant id inside matches.
    pub id: Uuid,
    /// External account uid presented by the client.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Ranking points, never negative.
    pub points: i64,
}

impl PlayerProfile {
    /// Create a profile.
    pub fn new(uid: impl Into<String>, name: impl Into<String>, points: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: uid.into(),
            name: name.into(),
            points,
        }
    }
}

/// Canonical store of matches.
///
/// Implementations must serialize writes per match id; the engine
/// follows a fetch → mutate → persist protocol and assumes no other
/// write lands between its fetch and its update for the same id.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Persist a new match, returning the stored instance.
    async fn add(&self, game: Match) -> GameResult<Match>;

    /// Fetch a match by id.
    async fn get_by_id(&self, id: Uuid) -> GameResult<Option<Match>>;

    /// Fetch every match.
    async fn get_all(&self) -> GameResult<Vec<Match>>;

    /// Fetch matches waiting for players with exactly one participant.
    async fn get_waiting_with_one_player(&self) -> GameResult<Vec<Match>>;

    /// Write back a mutated match.
    async fn update(&self, game: Match) -> GameResult<()>;
}

/// Store of persistent player profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up by external account uid.
    async fn get_by_uid(&self, uid: &str) -> GameResult<Option<PlayerProfile>>;

    /// Look up by profile id.
    async fn get_by_id(&self, id: Uuid) -> GameResult<Option<PlayerProfile>>;

    /// Write back a mutated profile.
    async fn update(&self, profile: PlayerProfile) -> GameResult<()>;
}
