//! Persistence Module
//!
//! Local storage for user accounts, sessions, activity logs, and per-user
//! project state. The core depends only on the [`PersistenceSink`]
//! collaborator; the SQLite implementation lives in `store.rs`.

mod store;

use serde::{Deserialize, Serialize};

pub use store::SqliteStore;

use crate::core::subtitles::Cue;
use crate::core::{CoreResult, SessionId, UserId};

// =============================================================================
// Persistence Collaborator
// =============================================================================

/// What the editing core needs from storage. Every call is
/// fire-and-forget from the core's perspective: callers log failures and
/// keep editing.
pub trait PersistenceSink: Send + Sync {
    /// Persists the user's current cue sequence and project name
    fn save_project_state(
        &self,
        user_id: &str,
        cues: &[Cue],
        project_name: &str,
    ) -> CoreResult<()>;

    /// Loads the user's last saved cue sequence and project name
    fn load_project_state(&self, user_id: &str) -> CoreResult<Option<(Vec<Cue>, String)>>;

    /// Appends one activity log entry
    fn log_activity(&self, user_id: &str, kind: &str, details: &str) -> CoreResult<()>;
}

// =============================================================================
// Account Entities
// =============================================================================

/// Account role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Editor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::Editor,
        }
    }
}

/// One stored user account (never carries password material)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
}

/// One login session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub started_at: String,
    pub ended_at: Option<String>,
}

/// One activity log entry
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: UserId,
    pub kind: String,
    pub details: String,
    pub created_at: String,
}
