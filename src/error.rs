use crate::types::ThemeId;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced by the session engine and result store
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("unknown theme: {0}")]
    UnknownTheme(ThemeId),

    /// No question available from any source for the theme. Fatal to the
    /// session: status moves to Error and the countdown stops.
    #[error("exhausted questions for the selected theme")]
    FetchExhausted,

    /// Sanitization left no option flagged as the odd one out. Treated as a
    /// source failure by the fetch chain, never surfaced to callers directly.
    #[error("question has no odd option after sanitization")]
    MalformedQuestion,

    /// Storage read/write failed. Recovered locally by treating the store as
    /// empty; logged, never propagated into the game flow.
    #[error("persistence unavailable: {0}")]
    Persistence(String),
}
