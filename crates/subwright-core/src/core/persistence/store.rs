//! SQLite Store
//!
//! Single-file SQLite database implementing the persistence collaborator
//! plus local account management. Passwords are hashed with Argon2id and
//! a per-user random salt; plaintext never touches disk - including the
//! bootstrap admin account, which arrives from configuration and is
//! hashed on first open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::persistence::{
    ActivityEntry, PersistenceSink, SessionRecord, UserRecord, UserRole,
};
use crate::core::subtitles::Cue;
use crate::core::{CoreError, CoreResult};

// =============================================================================
// SQLite Store
// =============================================================================

/// Local persistence store. The connection is mutex-guarded: the engine
/// is single-writer, the lock just makes the type shareable.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::PersistenceFailed(format!("open database: {}", e)))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates an in-memory database (for testing)
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::PersistenceFailed(format!("open in-memory: {}", e)))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> CoreResult<()> {
        self.conn()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    salt TEXT NOT NULL,
                    role TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    ended_at TEXT
                );

                CREATE TABLE IF NOT EXISTS activity_log (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    details TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS project_state (
                    user_id TEXT PRIMARY KEY,
                    project_name TEXT NOT NULL,
                    cues_json TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
                CREATE INDEX IF NOT EXISTS idx_activity_user ON activity_log(user_id, created_at);
                "#,
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("init schema: {}", e)))
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-query; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Registers a new user. Fails if the email is already taken.
    pub fn register_user(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> CoreResult<UserRecord> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CoreError::ValidationError(
                "email and password are required".to_string(),
            ));
        }

        let salt = generate_salt();
        let hash = hash_password(password, &salt)?;
        let record = UserRecord {
            id: ulid::Ulid::new().to_string(),
            email: email.trim().to_lowercase(),
            role,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let inserted = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO users (id, email, password_hash, salt, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.email,
                    hash,
                    salt,
                    role.as_str(),
                    record.created_at
                ],
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("register user: {}", e)))?;

        if inserted == 0 {
            return Err(CoreError::ValidationError(format!(
                "email already registered: {}",
                record.email
            )));
        }
        Ok(record)
    }

    /// Ensures the configured bootstrap admin account exists. Idempotent;
    /// an existing account (any role) with that email is left untouched.
    pub fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> CoreResult<()> {
        match self.register_user(email, password, UserRole::Admin) {
            Ok(_) => Ok(()),
            Err(CoreError::ValidationError(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Verifies credentials. Returns [`CoreError::LoginRejected`] for an
    /// unknown email or a wrong password - indistinguishably, on purpose.
    pub fn verify_login(&self, email: &str, password: &str) -> CoreResult<UserRecord> {
        let email = email.trim().to_lowercase();
        let row: Option<(String, String, String, String, String)> = self
            .conn()
            .query_row(
                "SELECT id, password_hash, salt, role, created_at FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| CoreError::PersistenceFailed(format!("lookup user: {}", e)))?;

        let Some((id, stored_hash, salt, role, created_at)) = row else {
            return Err(CoreError::LoginRejected);
        };

        if hash_password(password, &salt)? != stored_hash {
            return Err(CoreError::LoginRejected);
        }

        Ok(UserRecord {
            id,
            email,
            role: UserRole::from_str(&role),
            created_at,
        })
    }

    /// Looks up a user by email
    pub fn find_user(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        let email = email.trim().to_lowercase();
        self.conn()
            .query_row(
                "SELECT id, email, role, created_at FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        role: UserRole::from_str(&row.get::<_, String>(2)?),
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| CoreError::PersistenceFailed(format!("find user: {}", e)))
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Opens a new session for the user and returns its record
    pub fn start_session(&self, user_id: &str) -> CoreResult<SessionRecord> {
        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            ended_at: None,
        };

        self.conn()
            .execute(
                "INSERT INTO sessions (id, user_id, started_at, ended_at) VALUES (?1, ?2, ?3, NULL)",
                params![record.id, record.user_id, record.started_at],
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("start session: {}", e)))?;

        Ok(record)
    }

    /// Closes a session; unknown ids are a no-op
    pub fn end_session(&self, session_id: &str) -> CoreResult<()> {
        self.conn()
            .execute(
                "UPDATE sessions SET ended_at = ?1 WHERE id = ?2 AND ended_at IS NULL",
                params![chrono::Utc::now().to_rfc3339(), session_id],
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("end session: {}", e)))?;
        Ok(())
    }

    // =========================================================================
    // Activity
    // =========================================================================

    /// Returns the newest activity entries for a user, most recent first
    pub fn recent_activity(&self, user_id: &str, limit: usize) -> CoreResult<Vec<ActivityEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, kind, details, created_at FROM activity_log
                 WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("activity query: {}", e)))?;

        let entries = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    kind: row.get(2)?,
                    details: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| CoreError::PersistenceFailed(format!("activity query: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::PersistenceFailed(format!("activity rows: {}", e)))?;

        Ok(entries)
    }
}

// =============================================================================
// PersistenceSink Implementation
// =============================================================================

impl PersistenceSink for SqliteStore {
    fn save_project_state(
        &self,
        user_id: &str,
        cues: &[Cue],
        project_name: &str,
    ) -> CoreResult<()> {
        let cues_json = serde_json::to_string(cues)?;
        self.conn()
            .execute(
                "INSERT INTO project_state (user_id, project_name, cues_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     project_name = excluded.project_name,
                     cues_json = excluded.cues_json,
                     updated_at = excluded.updated_at",
                params![
                    user_id,
                    project_name,
                    cues_json,
                    chrono::Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("save project state: {}", e)))?;
        Ok(())
    }

    fn load_project_state(&self, user_id: &str) -> CoreResult<Option<(Vec<Cue>, String)>> {
        let row: Option<(String, String)> = self
            .conn()
            .query_row(
                "SELECT cues_json, project_name FROM project_state WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| CoreError::PersistenceFailed(format!("load project state: {}", e)))?;

        match row {
            Some((cues_json, project_name)) => {
                let cues: Vec<Cue> = serde_json::from_str(&cues_json)?;
                Ok(Some((cues, project_name)))
            }
            None => Ok(None),
        }
    }

    fn log_activity(&self, user_id: &str, kind: &str, details: &str) -> CoreResult<()> {
        self.conn()
            .execute(
                "INSERT INTO activity_log (id, user_id, kind, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    ulid::Ulid::new().to_string(),
                    user_id,
                    kind,
                    details,
                    chrono::Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| CoreError::PersistenceFailed(format!("log activity: {}", e)))?;
        Ok(())
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Generates a random 16-byte salt, hex-encoded
fn generate_salt() -> String {
    use rand::rngs::OsRng;
    let mut salt = [0u8; 16];
    rand::Rng::fill(&mut OsRng, &mut salt[..]);
    to_hex(&salt)
}

/// Argon2id password hash, hex-encoded
fn hash_password(password: &str, salt_hex: &str) -> CoreResult<String> {
    use argon2::{Algorithm, Argon2, Params, Version};

    // Moderate parameters: this guards a local single-user database, not
    // an internet-facing service.
    let params = Params::new(8 * 1024, 3, 1, Some(32))
        .map_err(|e| CoreError::Internal(format!("argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt_hex.as_bytes(), &mut key)
        .map_err(|e| CoreError::Internal(format!("password hashing: {}", e)))?;

    Ok(to_hex(&key))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// =============================================================================
// Tests
// =============================================================================
