//! Local session persistence with expiry checking.
//!
//! A successful login may be remembered across restarts by writing a single
//! JSON record to a fixed path. The stored record carries the user, the
//! bearer token for authenticated calls, and an expiry timestamp 30 days
//! out. Malformed or expired data is treated as "no session" - logged and
//! cleared, never fatal.

use crate::errors::{Error, Result};
use crate::models::User;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// How long a remembered session stays valid.
const SESSION_TTL_DAYS: i64 = 30;

/// The session record persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// The authenticated user
    pub user: User,
    /// Bearer token for authenticated gateway calls
    pub token: String,
    /// Moment after which the session is no longer valid
    pub expires_at: DateTime<Utc>,
    /// When the session was established
    pub created_at: DateTime<Utc>,
}

/// Reads and writes the persisted session record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<StoredSession> {
        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| Error::Session {
            message: format!("malformed session file: {e}"),
        })
    }

    /// Returns the persisted session if one exists and has not expired.
    ///
    /// A missing file is simply "no session". Malformed data and expired
    /// sessions are cleared so the next check starts clean.
    #[must_use]
    pub fn check(&self) -> Option<StoredSession> {
        let session = match self.read() {
            Ok(session) => session,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to load session, clearing: {e}");
                self.clear();
                return None;
            }
        };

        if session.expires_at <= Utc::now() {
            debug!("Session expired at {}, clearing", session.expires_at);
            self.clear();
            return None;
        }

        Some(session)
    }

    /// Establishes a session for a freshly authenticated user.
    ///
    /// When `remember` is set the session is persisted with an expiry
    /// `SESSION_TTL_DAYS` out; otherwise any previously persisted session is
    /// removed. The in-memory session is returned either way.
    pub fn establish(&self, user: User, token: String, remember: bool) -> StoredSession {
        let now = Utc::now();
        let session = StoredSession {
            user,
            token,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        };

        if remember {
            match serde_json::to_string_pretty(&session) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&self.path, json) {
                        warn!("Failed to persist session: {e}");
                    } else {
                        debug!("Session persisted to {}", self.path.display());
                    }
                }
                Err(e) => warn!("Failed to serialize session: {e}"),
            }
        } else {
            self.clear();
        }

        session
    }

    /// Removes any persisted session. A missing file is not an error.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Session file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file: {e}"),
        }
    }
}
