//! Answer Processing
//!
//! Validates and scores one submitted answer against the current match
//! state, applies pending power-up effects, advances progress, and
//! detects win conditions. Late or duplicate submissions are expected
//! from clients, so the no-op conditions (finished match, penalized
//! player, exhausted question list) return the match unchanged instead
//! of erroring.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GameError, GameResult};
use crate::game::effects;
use crate::game::state::{Match, MatchPlayer, PowerUpKind};
use crate::generator::Question;
use crate::store::{MatchStore, ProfileStore};

/// Ranking points awarded to the winner and deducted (floored at zero)
/// from every other participant when a match finishes.
pub const RANKING_POINTS_DELTA: i64 = 25;

/// Scores submissions and serves questions for running matches.
pub struct AnswerProcessor<M, P> {
    matches: Arc<M>,
    profiles: Arc<P>,
}

impl<M: MatchStore, P: ProfileStore> AnswerProcessor<M, P> {
    /// Create a processor over the given stores.
    pub fn new(matches: Arc<M>, profiles: Arc<P>) -> Self {
        Self { matches, profiles }
    }

    /// Submit one answer for the player's next unanswered question.
    ///
    /// Returns the updated match. A finished match, a running penalty,
    /// or an exhausted question list all return the match unchanged.
    pub async fn submit_answer(
        &self,
        match_id: Uuid,
        player_id: Uuid,
        answer: i64,
    ) -> GameResult<Match> {
        let mut game = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or(GameError::MatchNotFound(match_id))?;

        if game.is_finished() {
            return Ok(game);
        }

        let now = Utc::now();
        effects::expire_effects(&mut game, now);

        let player = game
            .player(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        if player.is_penalized(now) {
            debug!(match_id = %game.id, player = %player_id, "submission ignored: penalty running");
            return Ok(game);
        }

        let index = player.next_question;
        let Some(question) = game.questions.get(index) else {
            return Ok(game);
        };
        let correct = question.correct == answer;

        if correct {
            let increment = effects::position_increment(&mut game, player_id);
            if let Some(player) = game.player_mut(player_id) {
                player.correct_count += 1;
                player.position += increment;
            }
        }

        // The question is spent either way.
        let total = game.questions.len();
        if let Some(player) = game.player_mut(player_id) {
            player.next_question += 1;
            if player.next_question >= total && player.finished_at.is_none() {
                player.finished_at = Some(now);
            }
        }

        debug!(
            match_id = %game.id,
            player = %player_id,
            question = index,
            correct,
            "answer processed"
        );

        if let Some(winner) = evaluate_win(&game) {
            game.finish(winner);
            info!(match_id = %game.id, winner = %winner, "match finished");
            self.apply_ranking(&game, winner).await?;
        }

        self.matches.update(game.clone()).await?;
        Ok(game)
    }

    /// The player's next question, with any active rival-shuffle
    /// effect applied before it is served. `None` once the player has
    /// exhausted the list.
    pub async fn get_next_question(
        &self,
        match_id: Uuid,
        player_id: Uuid,
    ) -> GameResult<Option<Question>> {
        let mut game = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or(GameError::MatchNotFound(match_id))?;

        let player = game
            .player(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        let Some(mut question) = game.questions.get(player.next_question).cloned() else {
            return Ok(None);
        };

        effects::expire_effects(&mut game, Utc::now());
        if effects::apply_shuffle(&mut game, player_id, &mut question) {
            // The decrement must stick even if the client never answers.
            self.matches.update(game).await?;
        }

        Ok(Some(question))
    }

    /// Activate one of the player's granted power-ups.
    pub async fn activate_power_up(
        &self,
        match_id: Uuid,
        player_id: Uuid,
        kind: PowerUpKind,
    ) -> GameResult<Match> {
        let mut game = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or(GameError::MatchNotFound(match_id))?;

        effects::activate_power_up(&mut game, player_id, kind, Utc::now())?;
        self.matches.update(game.clone()).await?;
        info!(match_id = %game.id, player = %player_id, ?kind, "power-up activated");
        Ok(game)
    }

    /// Apply the fixed ranking delta: winner up, everyone else down,
    /// floored at zero. Missing profiles are skipped.
    async fn apply_ranking(&self, game: &Match, winner: Uuid) -> GameResult<()> {
        for player in &game.players {
            let Some(mut profile) = self.profiles.get_by_id(player.id).await? else {
                debug!(player = %player.id, "no profile to rank");
                continue;
            };
            if player.id == winner {
                profile.points += RANKING_POINTS_DELTA;
            } else {
                profile.points = (profile.points - RANKING_POINTS_DELTA).max(0);
            }
            self.profiles.update(profile).await?;
        }
        Ok(())
    }
}

/// Win conditions: a participant reaching the win threshold of correct
/// answers, or exhausting the question list while strictly ahead. When
/// every participant has exhausted the list, the leader (first in join
/// order on ties) wins.
fn evaluate_win(game: &Match) -> Option<Uuid> {
    let threshold = game.rules.win_threshold;

    for player in &game.players {
        if player.correct_count >= threshold {
            return Some(player.id);
        }
    }

    let total = game.questions.len();
    let exhausted = |p: &MatchPlayer| p.next_question >= total;

    for player in &game.players {
        if exhausted(player)
            && game
                .players
                .iter()
                .filter(|other| other.id != player.id)
                .all(|other| other.correct_count < player.correct_count)
        {
            return Some(player.id);
        }
    }

    if !game.players.is_empty() && game.players.iter().all(|p| exhausted(p)) {
        // First in join order wins a tie, so only a strictly higher
        // score displaces the current leader.
        let mut leader: Option<&MatchPlayer> = None;
        for player in &game.players {
            if leader.map_or(true, |l| player.correct_count > l.correct_count) {
                leader = Some(player);
            }
        }
        return leader.map(|p| p.id);
    }

    None
}
