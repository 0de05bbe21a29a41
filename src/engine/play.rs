//! Answering and skipping the current question.

use super::GameEngine;
use crate::types::{Outcome, PlayedQuestion, SessionStatus};

impl GameEngine {
    /// Resolve the current question with a chosen option. Correct answers
    /// score 1 (2 under double-score); incorrect answers cost 3 seconds
    /// unless keep-time is active. No-op unless the session is running with a
    /// question on screen and no fetch in flight; returns the outcome
    /// otherwise.
    pub async fn answer(&self, option_id: &str) -> Option<Outcome> {
        let (outcome, next_fetch) = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut()?;
            if session.status != SessionStatus::Running || session.fetching {
                return None;
            }
            let question = session.current_question.clone()?;

            let outcome = if option_id == question.odd_option_id {
                session.score += if session.modifiers.double_score { 2 } else { 1 };
                Outcome::Correct
            } else {
                if !session.modifiers.keep_time {
                    session.remaining_time = session
                        .remaining_time
                        .saturating_sub(self.config.incorrect_penalty_seconds);
                }
                Outcome::Incorrect
            };

            session.played.push(PlayedQuestion {
                question,
                chosen_option_id: Some(option_id.to_string()),
                outcome,
                answered_at: chrono::Utc::now().to_rfc3339(),
                time_remaining_after: session.remaining_time,
                power_cards_used: session.cards_used_sorted(),
            });
            session.clear_question_modifiers();

            if session.remaining_time == 0 {
                session.finish_now();
                tracing::info!("session {} finished: penalty drained the clock", session.id);
                (outcome, None)
            } else {
                (outcome, Some(session.id.clone()))
            }
        };

        match next_fetch {
            Some(session_id) => {
                let _ = self.fetch_next_question(&session_id).await;
            }
            None => self.stop_timer().await,
        }
        Some(outcome)
    }

    /// Pass on the current question for a 1-second penalty. Same guards and
    /// follow-up behavior as `answer`, without any correctness evaluation.
    pub async fn skip(&self) -> Option<Outcome> {
        let next_fetch = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut()?;
            if session.status != SessionStatus::Running || session.fetching {
                return None;
            }
            let question = session.current_question.clone()?;

            session.remaining_time = session
                .remaining_time
                .saturating_sub(self.config.skip_penalty_seconds);

            session.played.push(PlayedQuestion {
                question,
                chosen_option_id: None,
                outcome: Outcome::Skipped,
                answered_at: chrono::Utc::now().to_rfc3339(),
                time_remaining_after: session.remaining_time,
                power_cards_used: session.cards_used_sorted(),
            });
            session.clear_question_modifiers();

            if session.remaining_time == 0 {
                session.finish_now();
                tracing::info!("session {} finished: penalty drained the clock", session.id);
                None
            } else {
                Some(session.id.clone())
            }
        };

        match next_fetch {
            Some(session_id) => {
                let _ = self.fetch_next_question(&session_id).await;
            }
            None => self.stop_timer().await,
        }
        Some(Outcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::types::{PowerCardType, SessionStatus};

    fn engine() -> Arc<GameEngine> {
        GameEngine::new()
    }

    async fn odd_option_id(engine: &GameEngine) -> String {
        engine
            .current_question()
            .await
            .expect("question on screen")
            .odd_option_id
    }

    async fn wrong_option_id(engine: &GameEngine) -> String {
        engine
            .current_question()
            .await
            .expect("question on screen")
            .options
            .iter()
            .find(|o| !o.is_odd_one_out)
            .expect("at least one wrong option")
            .id
            .clone()
    }

    #[tokio::test]
    async fn test_correct_answer_scores_and_advances() {
        let engine = engine();
        engine.start("football").await.unwrap();
        let first_question = engine.current_question().await.unwrap();

        let outcome = engine.answer(&odd_option_id(&engine).await).await;
        assert_eq!(outcome, Some(Outcome::Correct));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.remaining_time, 60);
        assert_eq!(snapshot.total_questions, 1);

        let next_question = engine.current_question().await.unwrap();
        assert_ne!(next_question.id, first_question.id);

        let played = engine.played_questions().await;
        assert_eq!(played[0].outcome, Outcome::Correct);
        assert_eq!(played[0].time_remaining_after, 60);
        assert!(played[0].chosen_option_id.is_some());
    }

    #[tokio::test]
    async fn test_incorrect_answer_costs_three_seconds() {
        let engine = engine();
        engine.start("football").await.unwrap();

        let outcome = engine.answer(&wrong_option_id(&engine).await).await;
        assert_eq!(outcome, Some(Outcome::Incorrect));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.remaining_time, 57);
    }

    #[tokio::test]
    async fn test_skip_costs_one_second_with_no_choice() {
        let engine = engine();
        engine.start("anime").await.unwrap();

        let outcome = engine.skip().await;
        assert_eq!(outcome, Some(Outcome::Skipped));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.remaining_time, 59);

        let played = engine.played_questions().await;
        assert_eq!(played[0].outcome, Outcome::Skipped);
        assert_eq!(played[0].chosen_option_id, None);
    }

    #[tokio::test]
    async fn test_answer_is_noop_when_idle() {
        let engine = engine();
        assert_eq!(engine.answer("anything").await, None);
        assert_eq!(engine.skip().await, None);
    }

    #[tokio::test]
    async fn test_answer_is_noop_while_fetch_in_flight() {
        let engine = engine();
        engine.start("science").await.unwrap();

        {
            let mut guard = engine.session.write().await;
            guard.as_mut().unwrap().fetching = true;
        }
        assert_eq!(engine.answer("anything").await, None);
        assert_eq!(engine.skip().await, None);

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.total_questions, 0);
    }

    #[tokio::test]
    async fn test_penalty_draining_clock_finishes_session() {
        let engine = engine();
        engine.start("football").await.unwrap();
        {
            let mut guard = engine.session.write().await;
            guard.as_mut().unwrap().remaining_time = 2;
        }

        let outcome = engine.answer(&wrong_option_id(&engine).await).await;
        assert_eq!(outcome, Some(Outcome::Incorrect));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.remaining_time, 0);
        assert_eq!(snapshot.status, SessionStatus::Finished);
        assert!(snapshot.finished_at.is_some());

        let played = engine.played_questions().await;
        assert_eq!(played[0].time_remaining_after, 0);
    }

    #[tokio::test]
    async fn test_double_score_applies_to_one_question_only() {
        let engine = engine();
        engine.start("football").await.unwrap();

        assert!(engine.use_power_card(PowerCardType::DoubleScore).await);
        engine.answer(&odd_option_id(&engine).await).await;
        assert_eq!(engine.snapshot().await.unwrap().score, 2);

        // The modifier must not leak into the next question
        engine.answer(&odd_option_id(&engine).await).await;
        assert_eq!(engine.snapshot().await.unwrap().score, 3);

        let played = engine.played_questions().await;
        assert_eq!(
            played[0].power_cards_used,
            vec![PowerCardType::DoubleScore]
        );
        assert!(played[1].power_cards_used.is_empty());
    }

    #[tokio::test]
    async fn test_keep_time_blocks_incorrect_penalty() {
        let engine = engine();
        engine.start("science").await.unwrap();

        assert!(engine.use_power_card(PowerCardType::KeepTime).await);
        engine.answer(&wrong_option_id(&engine).await).await;

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.remaining_time, 60);
    }

    #[tokio::test]
    async fn test_session_never_repeats_a_question() {
        let engine = engine();
        engine.start("football").await.unwrap();

        // The football pool holds six questions; the fetch after the sixth
        // answer finds the theme exhausted and the session ends in Error.
        let mut seen = HashSet::new();
        for _ in 0..6 {
            let question = engine.current_question().await.unwrap();
            assert!(seen.insert(question.id.clone()), "question repeated");
            engine.answer(&question.odd_option_id).await;
        }

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot.last_error.is_some());
        assert_eq!(snapshot.score, 6);
    }

    #[tokio::test]
    async fn test_score_matches_correct_answer_algebra() {
        let engine = engine();
        engine.start("anime").await.unwrap();

        engine.answer(&odd_option_id(&engine).await).await; // +1
        engine.answer(&wrong_option_id(&engine).await).await; // +0
        engine.use_power_card(PowerCardType::DoubleScore).await;
        engine.answer(&odd_option_id(&engine).await).await; // +2
        engine.skip().await; // +0

        let played = engine.played_questions().await;
        let plain_correct = played
            .iter()
            .filter(|p| {
                p.outcome == Outcome::Correct
                    && !p.power_cards_used.contains(&PowerCardType::DoubleScore)
            })
            .count() as u32;
        let doubled_correct = played
            .iter()
            .filter(|p| {
                p.outcome == Outcome::Correct
                    && p.power_cards_used.contains(&PowerCardType::DoubleScore)
            })
            .count() as u32;

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.score, plain_correct + 2 * doubled_correct);
        assert_eq!(snapshot.score, 3);
    }
}
