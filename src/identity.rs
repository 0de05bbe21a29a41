//! Player identity: an external authentication capability plus a persisted
//! profile blob. The engine itself only ever sees a stable player id and a
//! display name.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

const PROFILE_FILE: &str = "player-profile.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Google,
    Guest,
}

/// Errors from an identity provider. Callers typically fall back to a guest
/// identity rather than blocking the game.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider is not configured")]
    NotConfigured,

    #[error("sign-in prompt dismissed: {0}")]
    Dismissed(String),

    #[error("sign-in failed: {0}")]
    Failed(String),
}

/// External capability: resolve who is playing
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self) -> Result<AuthUser, IdentityError>;

    async fn sign_out(&self);

    fn is_configured(&self) -> bool;

    /// Tag recorded on persisted profiles from this provider
    fn kind(&self) -> IdentityKind;
}

/// Always-available local identity with a generated friendly name
pub struct GuestIdentity;

#[async_trait]
impl IdentityProvider for GuestIdentity {
    async fn authenticate(&self) -> Result<AuthUser, IdentityError> {
        let display_name = petname::petname(2, " ")
            .unwrap_or_else(|| "anonymous guest".to_string());

        Ok(AuthUser {
            id: format!("guest-{}", ulid::Ulid::new()),
            email: "guest@oddout.local".to_string(),
            display_name,
            avatar_url: None,
        })
    }

    async fn sign_out(&self) {}

    fn is_configured(&self) -> bool {
        true
    }

    fn kind(&self) -> IdentityKind {
        IdentityKind::Guest
    }
}

/// One persisted identity, kept in its own keyed blob beside the game records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredProfile {
    pub user: AuthUser,
    pub provider: IdentityKind,
}

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in `ODDOUT_DATA_DIR`, defaulting to `./data`
    pub fn from_env() -> Self {
        let dir = std::env::var("ODDOUT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(Path::new(&dir).join(PROFILE_FILE))
    }

    /// The persisted profile, or None when absent or unreadable
    pub fn load(&self) -> Option<StoredProfile> {
        if !self.path.exists() {
            return None;
        }
        match self.try_load() {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!("unable to read stored profile: {}", err);
                None
            }
        }
    }

    fn try_load(&self) -> Result<StoredProfile, GameError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| GameError::Persistence(e.to_string()))
    }

    pub fn save(&self, profile: &StoredProfile) {
        if let Err(err) = self.try_save(profile) {
            tracing::warn!("unable to persist profile: {}", err);
        }
    }

    fn try_save(&self, profile: &StoredProfile) -> Result<(), GameError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| GameError::Persistence(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(profile)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| GameError::Persistence(e.to_string()))
    }

    /// Forget the persisted identity (sign-out)
    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                tracing::warn!("unable to clear stored profile: {}", err);
            }
        }
    }
}
