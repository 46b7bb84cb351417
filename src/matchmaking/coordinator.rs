//! Matchmaking Coordinator
//!
//! `find_or_create_match` runs the whole find-or-create decision under
//! one process-wide `tokio::sync::Mutex`. Two concurrent callers
//! scanning the same waiting snapshot could otherwise both join the
//! same single-slot match, or both create redundant matches; holding
//! the lock for the full call (profile lookup, scan, join-or-create,
//! persist) removes both races at the cost of matchmaking throughput.
//! In a distributed deployment this must become a distributed lock or
//! a single-writer matchmaking actor.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GameError, GameResult};
use crate::game::state::{Match, MatchPlayer, MatchRules, PowerUpKind};
use crate::generator::{generate, EquationParams};
use crate::store::{MatchStore, PlayerProfile, ProfileStore};

/// Ranking-points tolerance window for a player with `points`.
pub fn tolerance_for(points: i64) -> i64 {
    match points {
        p if p <= 50 => 25,
        p if p <= 150 => 30,
        p if p <= 250 => 40,
        _ => 50,
    }
}

/// Pairs waiting players or creates fresh matches.
pub struct MatchmakingCoordinator<M, P> {
    matches: Arc<M>,
    profiles: Arc<P>,
    rules: MatchRules,
    params: EquationParams,
    // One matchmaking mutation in flight at a time, across all callers.
    lock: Mutex<()>,
}

impl<M: MatchStore, P: ProfileStore> MatchmakingCoordinator<M, P> {
    /// Create a coordinator with default match rules and equation
    /// parameters.
    pub fn new(matches: Arc<M>, profiles: Arc<P>) -> Self {
        Self::with_rules(matches, profiles, MatchRules::default(), EquationParams::default())
    }

    /// Create a coordinator with explicit rules and parameters.
    pub fn with_rules(
        matches: Arc<M>,
        profiles: Arc<P>,
        rules: MatchRules,
        params: EquationParams,
    ) -> Self {
        Self {
            matches,
            profiles,
            rules,
            params,
            lock: Mutex::new(()),
        }
    }

    /// Find a compatible waiting match for the caller or create one.
    ///
    /// Holds the matchmaking lock for the entire call. Returns the
    /// joined or freshly created match; a caller already waiting in a
    /// match gets that match back with its connection handle refreshed.
    pub async fn find_or_create_match(
        &self,
        connection: &str,
        player_uid: &str,
    ) -> GameResult<Match> {
        let _guard = self.lock.lock().await;

        let profile = self
            .profiles
            .get_by_uid(player_uid)
            .await?
            .ok_or_else(|| GameError::ProfileNotFound(player_uid.to_string()))?;

        let waiting = self.matches.get_waiting_with_one_player().await?;

        // Reconnect case: the caller is already the sole occupant of a
        // waiting match. Refresh the transport handle, no new pairing.
        for game in &waiting {
            if game.player(profile.id).is_some() {
                let mut game = game.clone();
                if let Some(player) = game.player_mut(profile.id) {
                    player.connection = connection.to_string();
                }
                self.matches.update(game.clone()).await?;
                debug!(match_id = %game.id, player = %profile.id, "refreshed waiting connection");
                return Ok(game);
            }
        }

        let tolerance = tolerance_for(profile.points);

        // First-fit scan in store order. Private matches are joined by
        // password through a different path, never by rank.
        let mut selected = None;
        for game in &waiting {
            if game.private {
                continue;
            }
            let Some(occupant) = game.players.first() else {
                continue;
            };
            let Some(their) = self.profiles.get_by_id(occupant.id).await? else {
                continue;
            };
            if (their.points - profile.points).abs() <= tolerance {
                selected = Some(game.id);
                break;
            }
        }

        if let Some(match_id) = selected {
            // Re-fetch fresh: the scan snapshot may be stale, and the
            // slot may have been taken between scan and join.
            if let Some(mut game) = self.matches.get_by_id(match_id).await? {
                if game.has_capacity() && !game.is_finished() {
                    game.add_player(self.new_participant(&profile, connection))?;
                    self.matches.update(game.clone()).await?;
                    info!(
                        match_id = %game.id,
                        player = %profile.id,
                        status = ?game.status,
                        "paired into waiting match"
                    );
                    return Ok(game);
                }
            }
            // Slot gone: fall through to match creation.
        }

        self.create_match(&profile, connection).await
    }

    /// Join a private match by id, checking its password.
    ///
    /// A caller already in the match gets it back with a refreshed
    /// connection handle, so retried joins are harmless.
    pub async fn join_private_match(
        &self,
        match_id: Uuid,
        password: Option<&str>,
        connection: &str,
        player_uid: &str,
    ) -> GameResult<Match> {
        let _guard = self.lock.lock().await;

        let profile = self
            .profiles
            .get_by_uid(player_uid)
            .await?
            .ok_or_else(|| GameError::ProfileNotFound(player_uid.to_string()))?;

        let mut game = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or(GameError::MatchNotFound(match_id))?;

        if game.private && game.password.as_deref() != password {
            return Err(GameError::PasswordMismatch);
        }

        if let Some(player) = game.player_mut(profile.id) {
            player.connection = connection.to_string();
        } else {
            game.add_player(self.new_participant(&profile, connection))?;
        }

        self.matches.update(game.clone()).await?;
        info!(match_id = %game.id, player = %profile.id, "joined private match");
        Ok(game)
    }

    /// Create a fresh single-occupant match with its full question
    /// list pre-generated.
    async fn create_match(&self, profile: &PlayerProfile, connection: &str) -> GameResult<Match> {
        let questions = generate(&self.params, self.rules.max_questions);
        let mut game = Match::new(
            Uuid::new_v4(),
            format!("{}'s race", profile.name),
            questions,
            self.rules.clone(),
        );
        game.created_by = Some(profile.id);
        game.add_player(self.new_participant(profile, connection))?;

        let game = self.matches.add(game).await?;
        info!(match_id = %game.id, player = %profile.id, "created match");
        Ok(game)
    }

    /// Build a participant with the starter power-up grants.
    fn new_participant(&self, profile: &PlayerProfile, connection: &str) -> MatchPlayer {
        let mut player = MatchPlayer::new(profile.id, profile.name.clone(), connection);
        if self.rules.power_ups_enabled {
            player.power_ups = vec![PowerUpKind::DoublePoints, PowerUpKind::ShuffleRival];
        }
        player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::MatchStatus;
    use crate::store::{InMemoryMatchStore, InMemoryProfileStore};

    async fn setup() -> (
        Arc<InMemoryMatchStore>,
        Arc<InMemoryProfileStore>,
        MatchmakingCoordinator<InMemoryMatchStore, InMemoryProfileStore>,
    ) {
        let matches = Arc::new(InMemoryMatchStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let coordinator = MatchmakingCoordinator::new(matches.clone(), profiles.clone());
        (matches, profiles, coordinator)
    }

    #[test]
    fn test_tolerance_windows() {
        assert_eq!(tolerance_for(0), 25);
        assert_eq!(tolerance_for(50), 25);
        assert_eq!(tolerance_for(51), 30);
        assert_eq!(tolerance_for(150), 30);
        assert_eq!(tolerance_for(151), 40);
        assert_eq!(tolerance_for(250), 40);
        assert_eq!(tolerance_for(251), 50);
        assert_eq!(tolerance_for(1000), 50);
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let (_, _, coordinator) = setup().await;
        let result = coordinator.find_or_create_match("conn", "ghost").await;
        assert!(matches!(result, Err(GameError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_first_player_creates_waiting_match() {
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;

        let game = coordinator.find_or_create_match("conn-1", "u1").await.unwrap();
        assert_eq!(game.status, MatchStatus::WaitingForPlayers);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.questions.len(), MatchRules::default().max_questions);
        assert_eq!(matches.len().await, 1);
    }

    #[tokio::test]
    async fn test_close_ranks_are_paired() {
        // 40 points gives a ±25 window; 55 is 15 away, so they pair.
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 55)).await;

        let first = coordinator.find_or_create_match("conn-1", "u1").await.unwrap();
        let second = coordinator.find_or_create_match("conn-2", "u2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, MatchStatus::InProgress);
        assert_eq!(second.players.len(), 2);
        assert_eq!(matches.len().await, 1);
    }

    #[tokio::test]
    async fn test_distant_ranks_are_not_paired() {
        // 40 vs 80 exceeds the ±25 window on both sides.
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 80)).await;

        let first = coordinator.find_or_create_match("conn-1", "u1").await.unwrap();
        let second = coordinator.find_or_create_match("conn-2", "u2").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(matches.len().await, 2);
    }

    #[tokio::test]
    async fn test_reconnect_refreshes_connection() {
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;

        let first = coordinator.find_or_create_match("conn-old", "u1").await.unwrap();
        let second = coordinator.find_or_create_match("conn-new", "u1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.players.len(), 1);
        assert_eq!(second.players[0].connection, "conn-new");
        assert_eq!(matches.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_match_is_not_joined_again() {
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 41)).await;
        profiles.insert(PlayerProfile::new("u3", "Cleo", 42)).await;

        coordinator.find_or_create_match("c1", "u1").await.unwrap();
        coordinator.find_or_create_match("c2", "u2").await.unwrap();
        let third = coordinator.find_or_create_match("c3", "u3").await.unwrap();

        assert_eq!(third.players.len(), 1);
        assert_eq!(third.status, MatchStatus::WaitingForPlayers);
        assert_eq!(matches.len().await, 2);
    }

    #[tokio::test]
    async fn test_private_match_needs_password() {
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 41)).await;

        let mut game = coordinator.find_or_create_match("c1", "u1").await.unwrap();
        game.private = true;
        game.password = Some("sekrit".into());
        matches.update(game.clone()).await.unwrap();

        let wrong = coordinator
            .join_private_match(game.id, Some("nope"), "c2", "u2")
            .await;
        assert!(matches!(wrong, Err(GameError::PasswordMismatch)));

        let joined = coordinator
            .join_private_match(game.id, Some("sekrit"), "c2", "u2")
            .await
            .unwrap();
        assert_eq!(joined.players.len(), 2);
        assert_eq!(joined.status, MatchStatus::InProgress);
    }

    #[tokio::test]
    async fn test_private_match_skipped_by_rank_scan() {
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 41)).await;

        let mut game = coordinator.find_or_create_match("c1", "u1").await.unwrap();
        game.private = true;
        game.password = Some("sekrit".into());
        matches.update(game).await.unwrap();

        let second = coordinator.find_or_create_match("c2", "u2").await.unwrap();
        assert_eq!(second.players.len(), 1);
        assert_eq!(matches.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_pair_exactly_once() {
        // Two pairable players racing through matchmaking must end up
        // in one shared match, never two half-empty ones.
        let (matches, profiles, coordinator) = setup().await;
        profiles.insert(PlayerProfile::new("u1", "Ada", 40)).await;
        profiles.insert(PlayerProfile::new("u2", "Brin", 55)).await;
        let coordinator = Arc::new(coordinator);

        let a = {
            let c = coordinator.clone();
            tokio::spawn(async move { c.find_or_create_match("c1", "u1").await })
        };
        let b = {
            let c = coordinator.clone();
            tokio::spawn(async move { c.find_or_create_match("c2", "u2").await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(matches.len().await, 1);
        let stored = matches.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.players.len(), 2);
        assert_eq!(stored.status, MatchStatus::InProgress);
    }

    #[tokio::test]
    async fn test_many_concurrent_unpairable_callers() {
        // Every caller is outside every other's tolerance window, so
        // each gets their own match.
        let (matches, profiles, coordinator) = setup().await;
        for (i, points) in [0i64, 300, 600, 900].into_iter().enumerate() {
            profiles
                .insert(PlayerProfile::new(format!("u{}", i), format!("P{}", i), points))
                .await;
        }
        let coordinator = Arc::new(coordinator);

        let mut handles = Vec::new();
        for i in 0..4 {
            let c = coordinator.clone();
            handles.push(tokio::spawn(async move {
                c.find_or_create_match("conn", &format!("u{}", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(matches.len().await, 4);
    }
}
