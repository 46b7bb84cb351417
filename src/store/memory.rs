//! In-Memory Stores
//!
//! `RwLock<BTreeMap>` implementations of the store contracts. A single
//! write lock serializes updates per store, which satisfies the
//! per-id write serialization the engine's fetch-mutate-persist
//! protocol relies on.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::GameResult;
use crate::game::state::{Match, MatchStatus};
use crate::store::{MatchStore, PlayerProfile, ProfileStore};

/// In-memory match store.
#[derive(Default)]
pub struct InMemoryMatchStore {
    matches: RwLock<BTreeMap<Uuid, Match>>,
}

impl InMemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches.
    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    /// Whether the store holds no matches.
    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn add(&self, game: Match) -> GameResult<Match> {
        let mut matches = self.matches.write().await;
        matches.insert(game.id, game.clone());
        Ok(game)
    }

    async fn get_by_id(&self, id: Uuid) -> GameResult<Option<Match>> {
        let matches = self.matches.read().await;
        Ok(matches.get(&id).cloned())
    }

    async fn get_all(&self) -> GameResult<Vec<Match>> {
        let matches = self.matches.read().await;
        Ok(matches.values().cloned().collect())
    }

    async fn get_waiting_with_one_player(&self) -> GameResult<Vec<Match>> {
        let matches = self.matches.read().await;
        Ok(matches
            .values()
            .filter(|m| m.status == MatchStatus::WaitingForPlayers && m.players.len() == 1)
            .cloned()
            .collect())
    }

    async fn update(&self, game: Match) -> GameResult<()> {
        let mut matches = self.matches.write().await;
        matches.insert(game.id, game);
        Ok(())
    }
}

/// In-memory profile store.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<Uuid, PlayerProfile>>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile, returning its id.
    pub async fn insert(&self, profile: PlayerProfile) -> Uuid {
        let id = profile.id;
        let mut profiles = self.profiles.write().await;
        profiles.insert(id, profile);
        id
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_by_uid(&self, uid: &str) -> GameResult<Option<PlayerProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().find(|p| p.uid == uid).cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> GameResult<Option<PlayerProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&id).cloned())
    }

    async fn update(&self, profile: PlayerProfile) -> GameResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id, profile);
        Ok(())
    }
}
