//! Conversation manager — in-memory session store with age-based eviction.
//!
//! Sessions live in a process-local map keyed by session id. Nothing is
//! persisted; a restart forgets every conversation.
//!
//! ```text
//! ConversationManager
//! └── Mutex<HashMap<session_id, ConversationSession>>
//!         └── messages: Vec<Message>   (append-only until cleared)
//! ```
//!
//! Callers that need to mutate a session go through [`ConversationManager::with_session`],
//! which runs a closure against the live session while the store lock is held.
//! Read-side accessors return snapshot clones.

pub mod session;
pub mod sweeper;

pub use session::{ConversationSession, HistoryEntry, Message, Role};
pub use sweeper::spawn_sweeper;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{max_age_from_hours, Config};
use crate::error::AppError;

type SessionMap = HashMap<String, ConversationSession>;

pub struct ConversationManager {
    sessions: Mutex<SessionMap>,
}

impl ConversationManager {
    pub fn new(_config: &Config) -> Self {
        info!("conversation manager initialised");
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionMap>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Session("session store lock poisoned".into()))
    }

    /// Create a session, replacing any existing one with the same id.
    ///
    /// A missing or empty `session_id` gets a fresh UUID v4.
    pub fn create_session(
        &self,
        session_id: Option<&str>,
        context: Option<Map<String, Value>>,
    ) -> Result<ConversationSession, AppError> {
        let mut sessions = self.lock()?;
        let key = insert_new(&mut sessions, session_id, context);
        Ok(sessions[&key].clone())
    }

    /// Snapshot of a session, if it exists.
    pub fn get_session(&self, session_id: &str) -> Result<Option<ConversationSession>, AppError> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    /// Snapshot of the existing session, or of a newly created one.
    /// `context` only applies when a session is created.
    pub fn get_or_create_session(
        &self,
        session_id: Option<&str>,
        context: Option<Map<String, Value>>,
    ) -> Result<ConversationSession, AppError> {
        self.with_session(session_id, context, |s| s.clone())
    }

    /// Get or create the session, then run `f` against it under the store lock.
    pub fn with_session<R>(
        &self,
        session_id: Option<&str>,
        context: Option<Map<String, Value>>,
        f: impl FnOnce(&mut ConversationSession) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.lock()?;
        let key = match session_id.filter(|id| !id.is_empty()) {
            Some(id) if sessions.contains_key(id) => id.to_string(),
            other => insert_new(&mut sessions, other, context),
        };
        let session = sessions
            .get_mut(&key)
            .ok_or_else(|| AppError::Session(format!("session vanished: {key}")))?;
        Ok(f(session))
    }

    /// Empty a session's history. Returns `false` if the id is unknown.
    pub fn clear_session(&self, session_id: &str) -> Result<bool, AppError> {
        match self.lock()?.get_mut(session_id) {
            Some(session) => {
                session.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a session entirely. Returns `false` if the id is unknown.
    pub fn delete_session(&self, session_id: &str) -> Result<bool, AppError> {
        let removed = self.lock()?.remove(session_id).is_some();
        if removed {
            info!(%session_id, "session deleted");
        }
        Ok(removed)
    }

    /// Remove sessions not updated within `max_age_hours`. Returns the count removed.
    ///
    /// Ages beyond what `chrono::Duration` can hold saturate, so they never
    /// evict anything.
    pub fn cleanup_old_sessions(&self, max_age_hours: u64) -> Result<usize, AppError> {
        let max_age = max_age_from_hours(max_age_hours).unwrap_or(Duration::MAX);
        self.cleanup_idle_since(Utc::now(), max_age)
    }

    /// Remove every session whose `now - updated_at` is strictly greater than `max_age`.
    pub fn cleanup_idle_since(&self, now: DateTime<Utc>, max_age: Duration) -> Result<usize, AppError> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, s| now.signed_duration_since(s.updated_at) <= max_age);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "cleaned up old sessions");
        }
        Ok(removed)
    }

    pub fn session_ids(&self) -> Result<Vec<String>, AppError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.lock()?.is_empty())
    }
}

impl std::fmt::Debug for ConversationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.sessions.lock().map(|s| s.len()).ok();
        f.debug_struct("ConversationManager")
            .field("sessions", &count)
            .finish()
    }
}

/// Insert a fresh session and return its key.
fn insert_new(
    sessions: &mut SessionMap,
    session_id: Option<&str>,
    context: Option<Map<String, Value>>,
) -> String {
    let key = session_id
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let session = ConversationSession::new(key.clone(), context.unwrap_or_default());
    if sessions.insert(key.clone(), session).is_some() {
        warn!(session_id = %key, "existing session replaced");
    }
    debug!(session_id = %key, "session created");
    key
}
