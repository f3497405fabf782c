//! Identifiers, session state, and shared application state.

use crate::config::AppConfig;
use crate::error::{ApiError, Result};
use crate::providers::{EmailProvider, EventStore, SessionStore, User, UserStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Identifier Newtypes
// ═══════════════════════════════════════════════════════════════════════

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype! {
    /// Unique identifier for a user.
    UserId
}

id_newtype! {
    /// Unique identifier for an event.
    EventId
}

id_newtype! {
    /// Unique identifier for an attendance (RSVP).
    AttendanceId
}

id_newtype! {
    /// Unique identifier for a session.
    ///
    /// UUID v4, 122 bits of randomness, generated server-side only.
    SessionId
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// An authenticated session.
///
/// Stored server-side (Redis or in-process); the client only ever holds
/// the opaque `session_id` in an `HttpOnly` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// Authenticated user.
    pub user_id: UserId,

    /// User's email (cached for logging).
    pub email_address: String,

    /// Session creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp (updated on each authenticated request).
    pub last_active: DateTime<Utc>,

    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for a user with the given time to live.
    #[must_use]
    pub fn issue(user: &User, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: SessionId::new(),
            user_id: user.id,
            email_address: user.email_address.clone(),
            created_at: now,
            last_active: now,
            expires_at: now + ttl,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Application State
// ═══════════════════════════════════════════════════════════════════════

/// Shared application state handed to every handler.
///
/// Generic over the persistence backend `D` (user + event store), the
/// session store `S`, and the email provider `M` so tests can run against
/// the in-memory implementations.
#[derive(Clone)]
pub struct AppState<D, S, M> {
    /// Persistence backend (users, events, attendances, profiles).
    pub store: D,

    /// Session store.
    pub sessions: S,

    /// Email provider for signup confirmations.
    pub mailer: M,

    /// Application configuration.
    pub config: AppConfig,
}

impl<D, S, M> AppState<D, S, M>
where
    D: UserStore + EventStore,
    S: SessionStore,
    M: EmailProvider,
{
    /// Create application state from its parts.
    pub const fn new(store: D, sessions: S, mailer: M, config: AppConfig) -> Self {
        Self {
            store,
            sessions,
            mailer,
            config,
        }
    }

    /// Resolve the authenticated principal for a request, if any.
    ///
    /// A missing cookie, unknown session, or expired session all resolve
    /// to `None`; only store faults surface as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or user store fails.
    pub async fn current_user(&self, session_id: Option<SessionId>) -> Result<Option<User>> {
        let Some(session_id) = session_id else {
            return Ok(None);
        };

        let session = match self.sessions.get_session(session_id).await {
            Ok(session) => session,
            Err(ApiError::SessionNotFound | ApiError::SessionExpired) => return Ok(None),
            Err(other) => return Err(other),
        };

        match self.store.get_user_by_id(session.user_id).await {
            Ok(user) => {
                // Sliding expiration: refresh the session on each use.
                let mut refreshed = session;
                refreshed.last_active = Utc::now();
                refreshed.expires_at = refreshed.last_active + self.config.session_ttl;
                if let Err(err) = self.sessions.update_session(&refreshed).await {
                    tracing::warn!(error = %err, "Failed to refresh session");
                }
                Ok(Some(user))
            }
            // The user was deleted while the session was still live.
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Resolve the authenticated principal or fail with `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for unauthenticated requests, or a
    /// store error.
    pub async fn require_user(&self, session_id: Option<SessionId>) -> Result<User> {
        self.current_user(session_id)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}
