//! Result store: finished sessions persisted as a single keyed JSON blob.
//!
//! Storage failures are recovered locally: reads fall back to an empty
//! collection and writes are logged and dropped. The game flow never sees a
//! persistence error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::types::{GameRecord, HighScoreEntry, PlayerId};

const RECORDS_FILE: &str = "game-records.json";

/// Outcome of saving a record: whether it now leads the relevant rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Best score for this player on this theme
    pub personal_best: bool,
    /// Best score for this theme across all players
    pub theme_best: bool,
}

pub struct ResultStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorePayload {
    records: Vec<GameRecord>,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in `ODDOUT_DATA_DIR`, defaulting to `./data`
    pub fn from_env() -> Self {
        let dir = std::env::var("ODDOUT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(Path::new(&dir).join(RECORDS_FILE))
    }

    /// Upsert a record by session id and report whether it now tops the
    /// player's own ranking and the theme-wide ranking.
    pub fn save(&self, record: &GameRecord) -> SaveOutcome {
        let mut payload = self.read_payload();
        payload
            .records
            .retain(|existing| existing.session_id != record.session_id);
        payload.records.push(record.clone());
        self.write_payload(&payload);

        let mut personal: Vec<&GameRecord> = payload
            .records
            .iter()
            .filter(|r| r.theme_id == record.theme_id && r.player_id == record.player_id)
            .collect();
        let mut theme_wide: Vec<&GameRecord> = payload
            .records
            .iter()
            .filter(|r| r.theme_id == record.theme_id)
            .collect();
        rank(&mut personal);
        rank(&mut theme_wide);

        SaveOutcome {
            personal_best: personal
                .first()
                .is_some_and(|best| best.session_id == record.session_id),
            theme_best: theme_wide
                .first()
                .is_some_and(|best| best.session_id == record.session_id),
        }
    }

    /// All of a player's records, best first
    pub fn list_for_player(&self, player_id: &PlayerId) -> Vec<GameRecord> {
        let payload = self.read_payload();
        let mut records: Vec<&GameRecord> = payload
            .records
            .iter()
            .filter(|r| r.player_id == *player_id)
            .collect();
        rank(&mut records);
        records.into_iter().cloned().collect()
    }

    /// Top records for a theme (or all themes), projected to leaderboard rows
    pub fn top_n(&self, theme_id: Option<&str>, limit: usize) -> Vec<HighScoreEntry> {
        let payload = self.read_payload();
        let mut candidates: Vec<&GameRecord> = payload
            .records
            .iter()
            .filter(|r| theme_id.is_none_or(|theme| r.theme_id == theme))
            .collect();
        rank(&mut candidates);

        candidates
            .into_iter()
            .take(limit)
            .map(|record| HighScoreEntry {
                id: format!("{}-{}", record.session_id, record.player_id),
                session_id: record.session_id.clone(),
                player_id: record.player_id.clone(),
                player_name: record.player_name.clone(),
                score: record.score,
                theme_id: theme_id.unwrap_or("all").to_string(),
                finished_at: record
                    .finished_at
                    .clone()
                    .unwrap_or_else(|| record.started_at.clone()),
            })
            .collect()
    }

    /// Wipe all persisted records
    pub fn clear(&self) {
        self.write_payload(&StorePayload::default());
    }

    fn read_payload(&self) -> StorePayload {
        match self.try_read() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("unable to read game records, treating as empty: {}", err);
                StorePayload::default()
            }
        }
    }

    fn try_read(&self) -> Result<StorePayload, GameError> {
        if !self.path.exists() {
            return Ok(StorePayload::default());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| GameError::Persistence(e.to_string()))
    }

    fn write_payload(&self, payload: &StorePayload) {
        if let Err(err) = self.try_write(payload) {
            tracing::warn!("unable to write game records: {}", err);
        }
    }

    fn try_write(&self, payload: &StorePayload) -> Result<(), GameError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| GameError::Persistence(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(payload)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| GameError::Persistence(e.to_string()))
    }
}

/// Ranking order: score descending, ties broken by most recent finish
fn rank(records: &mut [&GameRecord]) {
    records.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| finished_millis(b).cmp(&finished_millis(a)))
    });
}

fn finished_millis(record: &GameRecord) -> i64 {
    let stamp = record
        .finished_at
        .as_deref()
        .unwrap_or(record.started_at.as_str());
    chrono::DateTime::parse_from_rfc3339(stamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
