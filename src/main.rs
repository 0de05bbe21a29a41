use std::time::Duration;

use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oddout::engine::GameEngine;
use oddout::identity::{GuestIdentity, IdentityProvider, ProfileStore, StoredProfile};
use oddout::question::{GeneratorConfig, QuestionSource};
use oddout::store::ResultStore;
use oddout::themes;
use oddout::types::{GameConfig, SessionStatus};

/// Headless demo session: authenticates a player, plays a handful of random
/// answers on the requested theme and prints the resulting leaderboard.
#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oddout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let generator_config = GeneratorConfig::from_env();
    let generators = generator_config.build_generators();
    if generators.is_empty() {
        tracing::info!("no question generators configured, playing from the curated bank");
    } else {
        tracing::info!("{} question generator(s) configured", generators.len());
    }

    let profile_store = ProfileStore::from_env();
    let user = match profile_store.load() {
        Some(profile) => {
            tracing::info!("welcome back, {}", profile.user.display_name);
            profile.user
        }
        None => {
            let provider = GuestIdentity;
            match provider.authenticate().await {
                Ok(user) => {
                    profile_store.save(&StoredProfile {
                        user: user.clone(),
                        provider: provider.kind(),
                    });
                    tracing::info!("signed in as guest {}", user.display_name);
                    user
                }
                Err(e) => {
                    tracing::error!("unable to resolve a player identity: {}", e);
                    return;
                }
            }
        }
    };

    let theme_id = std::env::args().nth(1).unwrap_or_else(|| "football".to_string());
    let engine = GameEngine::with_parts(
        QuestionSource::new(generators),
        themes::all_themes(),
        GameConfig::default(),
    );

    if let Err(e) = engine.start(&theme_id).await {
        tracing::error!("could not start a session on '{}': {}", theme_id, e);
        return;
    }

    // Answer a few questions at random, the way a distracted player would
    for _ in 0..5 {
        let Some(question) = engine.current_question().await else {
            break;
        };
        if engine.status().await != SessionStatus::Running {
            break;
        }

        let choice = {
            let mut rng = rand::rng();
            question.options[rng.random_range(0..question.options.len())]
                .id
                .clone()
        };
        if let Some(outcome) = engine.answer(&choice).await {
            tracing::info!("answered '{}': {:?}", question.prompt, outcome);
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    engine.finish().await;

    let store = ResultStore::from_env();
    if let Some(record) = engine.record_for(&user.id, &user.display_name).await {
        let outcome = store.save(&record);
        tracing::info!(
            "saved session {}: score {} (personal best: {}, theme best: {})",
            record.session_id,
            record.score,
            outcome.personal_best,
            outcome.theme_best
        );
    }

    for (rank, row) in store.top_n(Some(theme_id.as_str()), 10).iter().enumerate() {
        println!("{:>2}. {:<24} {:>3}  {}", rank + 1, row.player_name, row.score, row.finished_at);
    }
}
