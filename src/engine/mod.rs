//! Session engine: owns all mutable state for one play-through.
//!
//! A session moves `Idle -> Loading -> Running -> {Finished | Error}`.
//! `Finished` and `Error` are terminal; only a full reset (or a new start)
//! leaves them. Intents arriving in the wrong state are silent no-ops.

mod cards;
mod play;
mod session;

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::question::{normalize_text, QuestionSource};
use crate::themes;
use crate::types::*;

/// The session engine. Constructed behind an `Arc` so the countdown task can
/// share it.
pub struct GameEngine {
    session: RwLock<Option<Session>>,
    /// At most one live countdown task; replaced (and the old one aborted)
    /// whenever a new session starts.
    timer: Mutex<Option<JoinHandle<()>>>,
    source: QuestionSource,
    themes: Vec<Theme>,
    config: GameConfig,
    /// Handle back to the owning Arc, for spawning the countdown task
    pub(crate) self_ref: Weak<GameEngine>,
}

impl GameEngine {
    /// Engine over the static theme catalog and the curated bank only
    pub fn new() -> Arc<Self> {
        Self::with_parts(
            QuestionSource::bank_only(),
            themes::all_themes(),
            GameConfig::default(),
        )
    }

    pub fn with_parts(
        source: QuestionSource,
        themes: Vec<Theme>,
        config: GameConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            session: RwLock::new(None),
            timer: Mutex::new(None),
            source,
            themes,
            config,
            self_ref: self_ref.clone(),
        })
    }

    pub async fn status(&self) -> SessionStatus {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Idle)
    }

    /// Read-only view of the current session
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.read().await.as_ref().map(Session::snapshot)
    }

    pub async fn current_question(&self) -> Option<Question> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.current_question.clone())
    }

    pub async fn played_questions(&self) -> Vec<PlayedQuestion> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.played.clone())
            .unwrap_or_default()
    }

    pub async fn power_cards(&self) -> Vec<PowerCard> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.power_cards.clone())
            .unwrap_or_default()
    }

    /// Bind the current session to a player for persistence
    pub async fn record_for(&self, player_id: &str, player_name: &str) -> Option<GameRecord> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.record(player_id, player_name))
    }

    /// Discard the session and return to Idle, releasing the countdown
    pub async fn reset(&self) {
        self.stop_timer().await;
        if let Some(session) = self.session.write().await.take() {
            tracing::info!("session {} reset", session.id);
        }
    }
}

/// All mutable state of one play-through. Owned exclusively by the engine and
/// never shared across sessions.
pub(crate) struct Session {
    pub(crate) id: SessionId,
    pub(crate) theme_id: ThemeId,
    pub(crate) theme_label: String,
    pub(crate) difficulty_ramp: Vec<Difficulty>,
    pub(crate) status: SessionStatus,
    pub(crate) remaining_time: u32,
    pub(crate) score: u32,
    pub(crate) current_question: Option<Question>,
    pub(crate) played: Vec<PlayedQuestion>,
    pub(crate) started_at: String,
    pub(crate) finished_at: Option<String>,
    pub(crate) power_cards: Vec<PowerCard>,
    pub(crate) modifiers: ActiveModifiers,
    pub(crate) seen_question_ids: HashSet<QuestionId>,
    pub(crate) seen_option_texts: HashSet<String>,
    pub(crate) cards_used: HashSet<PowerCardType>,
    /// Guards against overlapping question fetches
    pub(crate) fetching: bool,
    pub(crate) last_error: Option<String>,
}

impl Session {
    pub(crate) fn fresh(theme: &Theme, config: &GameConfig) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            theme_id: theme.id.clone(),
            theme_label: theme.label.clone(),
            difficulty_ramp: theme.difficulty_ramp.clone(),
            status: SessionStatus::Loading,
            remaining_time: config.session_seconds,
            score: 0,
            current_question: None,
            played: Vec::new(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            power_cards: PowerCard::fresh_set(),
            modifiers: ActiveModifiers::default(),
            seen_question_ids: HashSet::new(),
            seen_option_texts: HashSet::new(),
            cards_used: HashSet::new(),
            fetching: false,
            last_error: None,
        }
    }

    pub(crate) fn card(&self, kind: PowerCardType) -> Option<&PowerCard> {
        self.power_cards.iter().find(|c| c.kind == kind)
    }

    pub(crate) fn card_mut(&mut self, kind: PowerCardType) -> Option<&mut PowerCard> {
        self.power_cards.iter_mut().find(|c| c.kind == kind)
    }

    /// Difficulty for the next fetch: the theme ramp indexed by how many
    /// questions were fully answered or skipped (swaps do not count), clamped
    /// to the ramp's last entry.
    pub(crate) fn next_difficulty(&self) -> Difficulty {
        let count = self.played.len();
        self.difficulty_ramp
            .get(count)
            .or_else(|| self.difficulty_ramp.last())
            .copied()
            .unwrap_or_else(|| Difficulty::for_answered_count(count))
    }

    pub(crate) fn note_seen(&mut self, question: &Question) {
        self.seen_question_ids.insert(question.id.clone());
        for option in &question.options {
            self.seen_option_texts.insert(normalize_text(&option.text));
        }
    }

    /// Clear the per-question flags when a question is resolved or replaced
    pub(crate) fn clear_question_modifiers(&mut self) {
        self.modifiers = ActiveModifiers::default();
        for card in &mut self.power_cards {
            card.is_active = false;
        }
        self.cards_used.clear();
    }

    pub(crate) fn cards_used_sorted(&self) -> Vec<PowerCardType> {
        let mut used: Vec<PowerCardType> = self.cards_used.iter().copied().collect();
        used.sort_unstable();
        used
    }

    /// Stamp the session finished. Returns false when the session is already
    /// terminal, making repeated finishes idempotent.
    pub(crate) fn finish_now(&mut self) -> bool {
        if matches!(self.status, SessionStatus::Finished | SessionStatus::Error) {
            return false;
        }
        self.status = SessionStatus::Finished;
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
        true
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            theme_id: self.theme_id.clone(),
            theme_label: self.theme_label.clone(),
            status: self.status,
            remaining_time: self.remaining_time,
            score: self.score,
            total_questions: self.played.len(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            power_cards: self.power_cards.clone(),
            modifiers: self.modifiers,
            last_error: self.last_error.clone(),
        }
    }

    pub(crate) fn record(&self, player_id: &str, player_name: &str) -> GameRecord {
        GameRecord {
            session_id: self.id.clone(),
            theme_id: self.theme_id.clone(),
            theme_label: self.theme_label.clone(),
            status: self.status,
            remaining_time: self.remaining_time,
            score: self.score,
            questions: self.played.clone(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
        }
    }
}
