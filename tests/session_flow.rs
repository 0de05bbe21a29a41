use oddout::engine::GameEngine;
use oddout::identity::{GuestIdentity, IdentityProvider};
use oddout::store::ResultStore;
use oddout::types::{Outcome, PowerCardType, SessionStatus};

/// End-to-end integration test for a complete play-through: start on the
/// football theme, answer right and wrong, burn power cards, tick the clock
/// down, and persist the result.
#[tokio::test]
async fn test_full_session_flow() {
    let engine = GameEngine::new();

    // 1. Start a session
    engine.start("football").await.expect("session should start");
    let snapshot = engine.snapshot().await.expect("session should exist");
    assert_eq!(snapshot.status, SessionStatus::Running);
    assert_eq!(snapshot.remaining_time, 60);
    assert_eq!(snapshot.score, 0);

    // 2. Answer the first question correctly
    let question = engine.current_question().await.expect("question on screen");
    let outcome = engine.answer(&question.odd_option_id).await;
    assert_eq!(outcome, Some(Outcome::Correct));

    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.remaining_time, 60, "correct answers cost no time");

    // 3. Answer the second question incorrectly, no modifiers
    let question = engine.current_question().await.unwrap();
    let wrong = question
        .options
        .iter()
        .find(|o| !o.is_odd_one_out)
        .expect("wrong option available");
    let outcome = engine.answer(&wrong.id).await;
    assert_eq!(outcome, Some(Outcome::Incorrect));

    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.remaining_time, 57, "incorrect answers cost 3 seconds");

    // 4. Double score on the third question
    assert!(engine.use_power_card(PowerCardType::DoubleScore).await);
    let question = engine.current_question().await.unwrap();
    engine.answer(&question.odd_option_id).await;
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.score, 3, "double-score correct answer is worth 2");

    // 5. Skip the fourth question
    let outcome = engine.skip().await;
    assert_eq!(outcome, Some(Outcome::Skipped));
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.score, 3, "skipping never changes the score");
    assert_eq!(snapshot.remaining_time, 56, "skipping costs 1 second");

    let played = engine.played_questions().await;
    assert_eq!(played.len(), 4);
    assert_eq!(played[3].outcome, Outcome::Skipped);
    assert_eq!(played[3].chosen_option_id, None);

    // 6. No question is ever repeated within the session
    let mut ids: Vec<_> = played.iter().map(|p| p.question.id.clone()).collect();
    ids.push(engine.current_question().await.unwrap().id);
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());

    // 7. Tick the clock down to zero; the session finishes exactly once
    for _ in 0..56 {
        engine.tick().await;
    }
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.remaining_time, 0);
    assert_eq!(snapshot.status, SessionStatus::Finished);
    let finished_at = snapshot.finished_at.clone();
    assert!(finished_at.is_some());

    engine.tick().await;
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.finished_at, finished_at, "zero-ticks stay idempotent");

    // 8. Persist the finished session and read it back
    let user = GuestIdentity.authenticate().await.expect("guest sign-in");
    let record = engine
        .record_for(&user.id, &user.display_name)
        .await
        .expect("record for finished session");

    let dir = tempfile::tempdir().expect("temp dir");
    let store = ResultStore::new(dir.path().join("game-records.json"));
    let outcome = store.save(&record);
    assert!(outcome.personal_best);
    assert!(outcome.theme_best);

    let listed = store.list_for_player(&user.id);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].session_id, record.session_id);
    assert_eq!(listed[0].score, 3);

    // Re-saving the same session replaces rather than duplicates
    store.save(&record);
    assert_eq!(store.list_for_player(&user.id).len(), 1);

    let rows = store.top_n(Some("football"), 10);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 3);
    assert_eq!(rows[0].player_name, user.display_name);
}

/// Exhausting a theme's pool turns the next fetch into a fatal error
#[tokio::test]
async fn test_theme_exhaustion_ends_in_error() {
    let engine = GameEngine::new();
    engine.start("science").await.unwrap();

    // The science pool holds six questions; skip through all of them
    for _ in 0..6 {
        assert_eq!(engine.status().await, SessionStatus::Running);
        engine.skip().await;
    }

    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(snapshot.last_error.is_some());
    assert_eq!(snapshot.total_questions, 6);

    // A terminal session ignores further intents but a reset starts over
    assert_eq!(engine.skip().await, None);
    engine.reset().await;
    assert_eq!(engine.status().await, SessionStatus::Idle);

    engine.start("science").await.unwrap();
    assert_eq!(engine.status().await, SessionStatus::Running);
}

/// Power cards are strictly single-use across a whole session
#[tokio::test]
async fn test_power_cards_never_replenish() {
    let engine = GameEngine::new();
    engine.start("anime").await.unwrap();

    for kind in PowerCardType::ALL {
        assert!(engine.use_power_card(kind).await, "{kind:?} first use");
    }
    for kind in PowerCardType::ALL {
        assert!(!engine.use_power_card(kind).await, "{kind:?} second use");
    }

    let cards = engine.power_cards().await;
    assert!(cards.iter().all(|c| c.remaining == 0));
}
