use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type SessionId = String;
pub type ThemeId = String;
pub type QuestionId = String;
pub type OptionId = String;
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Default ramp when a theme does not provide one: difficulty is a pure
    /// function of how many questions were already answered or skipped.
    pub fn for_answered_count(count: usize) -> Self {
        if count >= 12 {
            Difficulty::Expert
        } else if count >= 7 {
            Difficulty::Hard
        } else if count >= 3 {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Idle,
    Loading,
    Running,
    Finished,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PowerCardType {
    SwapQuestion,
    RemoveWrongOption,
    DoubleScore,
    KeepTime,
}

impl PowerCardType {
    pub const ALL: [PowerCardType; 4] = [
        PowerCardType::SwapQuestion,
        PowerCardType::RemoveWrongOption,
        PowerCardType::DoubleScore,
        PowerCardType::KeepTime,
    ];
}

/// A single-use-per-session ability modifying the current question or rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerCard {
    pub kind: PowerCardType,
    pub remaining: u32,
    pub is_active: bool,
}

impl PowerCard {
    /// One card of each kind, one use each
    pub fn fresh_set() -> Vec<PowerCard> {
        PowerCardType::ALL
            .iter()
            .map(|kind| PowerCard {
                kind: *kind,
                remaining: 1,
                is_active: false,
            })
            .collect()
    }
}

/// Per-question flags, cleared whenever a new question comes up
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ActiveModifiers {
    pub double_score: bool,
    pub keep_time: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub id: ThemeId,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub accent_color: String,
    /// Difficulty per answered-question count, clamped to the last entry
    pub difficulty_ramp: Vec<Difficulty>,
    /// Listed but not yet playable
    #[serde(default)]
    pub coming_soon: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
    pub is_odd_one_out: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionProvenance {
    Generated,
    Fallback,
}

/// One odd-one-out question with 2+ options, exactly one flagged odd
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    /// Opaque uniqueness token threaded into generator exclusion lists
    pub seed: String,
    pub prompt: String,
    pub theme_id: ThemeId,
    pub difficulty: Difficulty,
    pub options: Vec<QuestionOption>,
    pub odd_option_id: OptionId,
    pub provenance: QuestionProvenance,
    pub created_at: String,
}

impl Question {
    pub fn odd_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_odd_one_out)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Skipped,
}

/// Immutable record of one answered or skipped question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayedQuestion {
    pub question: Question,
    /// None when the question was skipped
    pub chosen_option_id: Option<OptionId>,
    pub outcome: Outcome,
    pub answered_at: String,
    pub time_remaining_after: u32,
    pub power_cards_used: Vec<PowerCardType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub session_seconds: u32,
    pub incorrect_penalty_seconds: u32,
    pub skip_penalty_seconds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_seconds: 60,
            incorrect_penalty_seconds: 3,
            skip_penalty_seconds: 1,
        }
    }
}

/// Read-only view of a session, safe to hand to callers and the result store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub theme_id: ThemeId,
    pub theme_label: String,
    pub status: SessionStatus,
    pub remaining_time: u32,
    pub score: u32,
    pub total_questions: usize,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub power_cards: Vec<PowerCard>,
    pub modifiers: ActiveModifiers,
    pub last_error: Option<String>,
}

/// A finished session snapshot bound to a player, persisted by the result store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub session_id: SessionId,
    pub theme_id: ThemeId,
    pub theme_label: String,
    pub status: SessionStatus,
    pub remaining_time: u32,
    pub score: u32,
    pub questions: Vec<PlayedQuestion>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub player_id: PlayerId,
    pub player_name: String,
}

/// Leaderboard row projection of a GameRecord
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighScoreEntry {
    pub id: String,
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: u32,
    /// Theme the row was ranked under, or "all"
    pub theme_id: String,
    pub finished_at: String,
}
