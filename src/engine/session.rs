//! Session lifecycle: start, question fetching, the countdown, finish.

use std::time::Duration;

use super::{GameEngine, Session};
use crate::error::{GameError, GameResult};
use crate::question::QuestionRequest;
use crate::types::{SessionId, SessionStatus};

impl GameEngine {
    /// Begin a fresh session on a theme. Resets all state, fetches the first
    /// question and starts the countdown. On a fetch failure the session ends
    /// in `Error` and the countdown never starts.
    pub async fn start(&self, theme_id: &str) -> GameResult<()> {
        let theme = self
            .themes
            .iter()
            .find(|t| t.id == theme_id && !t.coming_soon)
            .ok_or_else(|| GameError::UnknownTheme(theme_id.to_string()))?;

        self.stop_timer().await;

        let session = Session::fresh(theme, &self.config);
        let session_id = session.id.clone();
        tracing::info!("session {} starting on theme {}", session_id, theme.id);
        *self.session.write().await = Some(session);

        self.fetch_next_question(&session_id).await?;

        {
            let mut guard = self.session.write().await;
            if let Some(session) = guard.as_mut().filter(|s| s.id == session_id) {
                session.status = SessionStatus::Running;
            }
        }
        self.spawn_countdown(session_id).await;
        Ok(())
    }

    /// Fetch a question into the current slot. Fetches are tagged with the
    /// session id: a result arriving after the session was reset or replaced
    /// is discarded. A second fetch while one is outstanding is a silent
    /// no-op (the fetch-in-progress guard).
    pub(crate) async fn fetch_next_question(&self, session_id: &SessionId) -> GameResult<()> {
        let request = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut().filter(|s| s.id == *session_id) else {
                return Ok(());
            };
            if session.fetching
                || matches!(
                    session.status,
                    SessionStatus::Finished | SessionStatus::Error
                )
            {
                return Ok(());
            }
            session.fetching = true;

            QuestionRequest {
                theme_id: session.theme_id.clone(),
                theme_label: session.theme_label.clone(),
                difficulty: session.next_difficulty(),
                excluded_question_ids: session.seen_question_ids.clone(),
                excluded_option_texts: session.seen_option_texts.clone(),
            }
        };

        let result = self.source.fetch(&request).await;

        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut().filter(|s| s.id == *session_id) else {
            // The session this fetch belonged to is gone; drop the result.
            return Ok(());
        };
        session.fetching = false;

        match result {
            Ok(question) => {
                session.note_seen(&question);
                session.clear_question_modifiers();
                session.current_question = Some(question);
                Ok(())
            }
            Err(err) => {
                session.last_error = Some(err.to_string());
                session.status = SessionStatus::Error;
                session.current_question = None;
                let id = session.id.clone();
                drop(guard);
                self.stop_timer().await;
                tracing::error!("session {} failed to fetch question: {}", id, err);
                Err(err)
            }
        }
    }

    /// Spawn the 1 Hz countdown task for a session, cancelling any prior one
    async fn spawn_countdown(&self, session_id: SessionId) {
        let Some(engine) = self.self_ref.upgrade() else {
            return;
        };
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if !engine.tick_for(&session_id).await {
                    break;
                }
            }
        });

        let mut timer = self.timer.lock().await;
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }

    pub(crate) async fn stop_timer(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
    }

    /// Advance the countdown by one second. Driven by the countdown task at a
    /// fixed cadence; exposed for callers driving time themselves. No-op
    /// unless the session is running.
    pub async fn tick(&self) {
        let session_id = match self.session.read().await.as_ref() {
            Some(session) => session.id.clone(),
            None => return,
        };
        self.tick_for(&session_id).await;
    }

    /// Returns false once the countdown task should stop
    async fn tick_for(&self, session_id: &SessionId) -> bool {
        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut().filter(|s| s.id == *session_id) else {
            return false;
        };
        if session.status != SessionStatus::Running {
            return false;
        }

        session.remaining_time = session.remaining_time.saturating_sub(1);
        if session.remaining_time == 0 {
            if session.finish_now() {
                tracing::info!("session {} finished: time elapsed", session.id);
            }
            return false;
        }
        true
    }

    /// Force the session to finish. Idempotent; stops the countdown.
    pub async fn finish(&self) {
        let finished = {
            let mut guard = self.session.write().await;
            guard
                .as_mut()
                .map(|session| {
                    let changed = session.finish_now();
                    (changed, session.id.clone())
                })
                .filter(|(changed, _)| *changed)
        };

        if let Some((_, session_id)) = finished {
            self.stop_timer().await;
            tracing::info!("session {} finished", session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::question::QuestionSource;
    use crate::types::{Difficulty, GameConfig, Theme};

    fn engine() -> Arc<GameEngine> {
        GameEngine::new()
    }

    fn empty_theme() -> Theme {
        Theme {
            id: "ghost-towns".to_string(),
            label: "Ghost Towns".to_string(),
            description: "A theme with no questions anywhere.".to_string(),
            icon: "ghost".to_string(),
            accent_color: "#808080".to_string(),
            difficulty_ramp: vec![Difficulty::Easy],
            coming_soon: false,
        }
    }

    #[tokio::test]
    async fn test_start_unknown_theme() {
        let engine = engine();
        let result = engine.start("underwater-basket-weaving").await;
        assert!(matches!(result, Err(GameError::UnknownTheme(_))));
        assert_eq!(engine.status().await, SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_start_refuses_coming_soon_theme() {
        let engine = engine();
        let result = engine.start("space-explorers").await;
        assert!(matches!(result, Err(GameError::UnknownTheme(_))));
    }

    #[tokio::test]
    async fn test_start_enters_running_with_question() {
        let engine = engine();
        engine.start("football").await.unwrap();

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Running);
        assert_eq!(snapshot.remaining_time, 60);
        assert_eq!(snapshot.score, 0);
        assert!(snapshot.finished_at.is_none());

        let question = engine.current_question().await.unwrap();
        assert_eq!(question.theme_id, "football");
        assert_eq!(question.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn test_start_with_exhausted_source_errors() {
        let engine = GameEngine::with_parts(
            QuestionSource::bank_only(),
            vec![empty_theme()],
            GameConfig::default(),
        );

        let result = engine.start("ghost-towns").await;
        assert!(matches!(result, Err(GameError::FetchExhausted)));

        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_restart_replaces_session() {
        let engine = engine();
        engine.start("football").await.unwrap();
        let first = engine.snapshot().await.unwrap();

        engine.start("science").await.unwrap();
        let second = engine.snapshot().await.unwrap();

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(second.theme_id, "science");
        assert_eq!(second.remaining_time, 60);
        assert_eq!(second.total_questions, 0);
    }

    #[tokio::test]
    async fn test_tick_counts_down_and_finishes_once() {
        let engine = engine();
        engine.start("football").await.unwrap();

        for _ in 0..59 {
            engine.tick().await;
        }
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.remaining_time, 1);
        assert_eq!(snapshot.status, SessionStatus::Running);

        engine.tick().await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.remaining_time, 0);
        assert_eq!(snapshot.status, SessionStatus::Finished);
        assert!(snapshot.finished_at.is_some());

        // Repeated zero-ticks must not disturb the finished session
        let finished_at = snapshot.finished_at.clone();
        engine.tick().await;
        engine.tick().await;
        let snapshot = engine.snapshot().await.unwrap();
        assert_eq!(snapshot.remaining_time, 0);
        assert_eq!(snapshot.finished_at, finished_at);
    }

    #[tokio::test]
    async fn test_tick_is_noop_when_idle() {
        let engine = engine();
        engine.tick().await;
        assert_eq!(engine.status().await, SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_finish_is_idempotent() {
        let engine = engine();
        engine.start("anime").await.unwrap();

        engine.finish().await;
        let first = engine.snapshot().await.unwrap();
        assert_eq!(first.status, SessionStatus::Finished);

        engine.finish().await;
        let second = engine.snapshot().await.unwrap();
        assert_eq!(second.finished_at, first.finished_at);
    }

    #[tokio::test]
    async fn test_remaining_time_monotone_under_ticks() {
        let engine = engine();
        engine.start("science").await.unwrap();

        let mut previous = engine.snapshot().await.unwrap().remaining_time;
        for _ in 0..70 {
            engine.tick().await;
            let current = engine.snapshot().await.unwrap().remaining_time;
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }
}
