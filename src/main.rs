//! MathRace Match Server
//!
//! Demo binary: runs one full head-to-head race against the in-memory
//! stores, exercising matchmaking, power-ups, answer processing and
//! win detection end to end.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mathrace::{
    game::effects::SHUFFLE_QUESTION_SPAN,
    store::{InMemoryMatchStore, InMemoryProfileStore, ProfileStore},
    AnswerProcessor, MatchStatus, MatchmakingCoordinator, PlayerProfile, PowerUpKind, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("MathRace Server v{}", VERSION);

    demo_match().await
}

/// Demo function to run one match end to end.
async fn demo_match() -> Result<()> {
    info!("=== Starting Demo Match ===");

    let matches = Arc::new(InMemoryMatchStore::new());
    let profiles = Arc::new(InMemoryProfileStore::new());

    let ada = profiles.insert(PlayerProfile::new("uid-ada", "Ada", 40)).await;
    let brin = profiles.insert(PlayerProfile::new("uid-brin", "Brin", 55)).await;

    // Matchmaking: 40 vs 55 points is inside the ±25 window.
    let coordinator = MatchmakingCoordinator::new(matches.clone(), profiles.clone());
    coordinator.find_or_create_match("conn-ada", "uid-ada").await?;
    let game = coordinator.find_or_create_match("conn-brin", "uid-brin").await?;
    info!(
        match_id = %game.id,
        status = ?game.status,
        questions = game.questions.len(),
        "matchmaking complete"
    );

    let sample = serde_json::to_string_pretty(&game.questions[0])?;
    info!("first question:\n{}", sample);

    let processor = AnswerProcessor::new(matches.clone(), profiles.clone());

    // Ada plays her starter power-ups.
    processor
        .activate_power_up(game.id, ada, PowerUpKind::DoublePoints)
        .await?;
    processor
        .activate_power_up(game.id, ada, PowerUpKind::ShuffleRival)
        .await?;
    info!(
        "Ada armed double points and shuffled Brin's next {} questions",
        SHUFFLE_QUESTION_SPAN
    );

    // Race until someone wins: Ada always answers right, Brin always
    // picks the first option served to him.
    let mut round = 0usize;
    let finished = loop {
        round += 1;

        if let Some(question) = processor.get_next_question(game.id, ada).await? {
            processor.submit_answer(game.id, ada, question.correct).await?;
        }
        let state = match processor.get_next_question(game.id, brin).await? {
            Some(question) => {
                processor
                    .submit_answer(game.id, brin, question.options[0])
                    .await?
            }
            None => processor.submit_answer(game.id, brin, 0).await?,
        };

        if state.status == MatchStatus::Finished || round > state.questions.len() {
            break state;
        }
    };

    info!("=== Match Results ===");
    for player in &finished.players {
        info!(
            "{}: {} correct, position {}",
            player.name, player.correct_count, player.position
        );
    }
    let winner = finished.winner.and_then(|id| {
        finished
            .players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
    });
    info!(winner = winner.as_deref().unwrap_or("none"), rounds = round, "finished");

    for id in [ada, brin] {
        if let Some(profile) = profiles.get_by_id(id).await? {
            info!("{} now has {} ranking points", profile.name, profile.points);
        }
    }

    Ok(())
}
