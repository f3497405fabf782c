//! In-process session store.
//!
//! Sessions live in a mutex-guarded map. Suitable for single-instance
//! deployments and for tests; multi-instance deployments need the Redis
//! store so sessions survive restarts and are shared across processes.

use crate::error::{ApiError, Result};
use crate::providers::SessionStore;
use crate::state::{Session, SessionId, UserId};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    /// Create a new in-memory session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("Session store lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: &Session, _ttl: Duration) -> Result<()> {
        let mut sessions = self.lock()?;

        if sessions.contains_key(&session.session_id) {
            return Err(ApiError::Internal("Session ID already exists".to_string()));
        }

        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let session = self
            .lock()?
            .get(&session_id)
            .cloned()
            .ok_or(ApiError::SessionNotFound)?;

        if session.expires_at < chrono::Utc::now() {
            return Err(ApiError::SessionExpired);
        }

        Ok(session)
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.lock()?;

        match sessions.get(&session.session_id) {
            None => Err(ApiError::SessionNotFound),
            Some(existing) if existing.user_id != session.user_id => Err(ApiError::Internal(
                "Cannot change session user_id (immutable)".to_string(),
            )),
            Some(_) => {
                sessions.insert(session.session_id, session.clone());
                Ok(())
            }
        }
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        self.lock()?.remove(&session_id);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: UserId) -> Result<usize> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok(before - sessions.len())
    }
}
