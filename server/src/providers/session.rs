//! Session store trait.

use crate::error::Result;
use crate::state::{Session, SessionId, UserId};
use chrono::Duration;
use std::future::Future;

/// Session storage.
///
/// Sessions are ephemeral: created at login/signup with a TTL, refreshed
/// on each authenticated request (sliding expiration), deleted at logout
/// and when their user is deleted.
pub trait SessionStore: Send + Sync {
    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the session ID already
    /// exists (session fixation guard).
    fn create_session(
        &self,
        session: &Session,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Get a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionNotFound` for unknown IDs,
    /// `ApiError::SessionExpired` for stale sessions, or a backend error.
    fn get_session(&self, session_id: SessionId) -> impl Future<Output = Result<Session>> + Send;

    /// Update a session in place (refreshes `last_active`/`expires_at`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionNotFound` for unknown IDs, or a backend
    /// error.
    fn update_session(&self, session: &Session) -> impl Future<Output = Result<()>> + Send;

    /// Delete a session. Deleting an unknown session is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_session(&self, session_id: SessionId) -> impl Future<Output = Result<()>> + Send;

    /// Delete every session belonging to a user.
    ///
    /// # Returns
    ///
    /// Number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_user_sessions(&self, user_id: UserId) -> impl Future<Output = Result<usize>> + Send;
}
