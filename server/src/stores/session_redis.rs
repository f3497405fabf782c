//! Redis session store.
//!
//! Layout:
//! - `session:{session_id}` → bincode-serialized [`Session`], with a TTL
//!   matching the session's expiry (sliding, refreshed on activity).
//! - `user:{user_id}:sessions` → Set of the user's live session IDs, so
//!   account deletion can revoke everything at once.
//!
//! # Example
//!
//! ```no_run
//! use gather_server::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{ApiError, Result};
use crate::providers::SessionStore;
use crate::state::{Session, SessionId, UserId};
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Grace period added to the user-index TTL beyond its longest session.
const USER_INDEX_TTL_BUFFER_SECS: i64 = 86_400;

fn redis_fault(context: &str, err: &redis::RedisError) -> ApiError {
    ApiError::Internal(format!("{context}: {err}"))
}

fn encode(session: &Session) -> Result<Vec<u8>> {
    bincode::serialize(session)
        .map_err(|e| ApiError::Internal(format!("Session serialization failed: {e}")))
}

fn decode(bytes: &[u8]) -> Result<Session> {
    bincode::deserialize(bytes)
        .map_err(|e| ApiError::Internal(format!("Session deserialization failed: {e}")))
}

/// Redis-backed session store for multi-instance deployments.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Pooled connection handle; cloning is cheap.
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to Redis at `redis_url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// # Errors
    ///
    /// Returns error if the connection cannot be established.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| redis_fault("Failed to create Redis client", &e))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| redis_fault("Failed to connect to Redis", &e))?;

        Ok(Self { conn })
    }

    fn session_key(session_id: SessionId) -> String {
        format!("session:{}", session_id.0)
    }

    fn user_sessions_key(user_id: UserId) -> String {
        format!("user:{}:sessions", user_id.0)
    }
}

impl SessionStore for RedisSessionStore {
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let session_key = Self::session_key(session.session_id);
        let user_sessions_key = Self::user_sessions_key(session.user_id);

        // Session IDs are only ever generated server-side; a collision
        // here means a replayed or fixated ID, so refuse it.
        let exists: bool = conn
            .exists(&session_key)
            .await
            .map_err(|e| redis_fault("Failed to check session existence", &e))?;
        if exists {
            return Err(ApiError::Internal("Session ID already exists".into()));
        }

        #[allow(clippy::cast_sign_loss)]
        let ttl_secs = ttl.num_seconds().max(0) as u64;

        // The user index must outlive every session in it.
        #[allow(clippy::cast_possible_wrap)]
        let index_ttl_secs = ttl_secs as i64 + USER_INDEX_TTL_BUFFER_SECS;

        // One atomic pipeline keeps the session and its index entry in step.
        let _: () = redis::pipe()
            .atomic()
            .set_ex(&session_key, encode(session)?, ttl_secs)
            .sadd(&user_sessions_key, session.session_id.0.to_string())
            .ignore()
            .expire(&user_sessions_key, index_ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_fault("Failed to create session", &e))?;

        tracing::debug!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            ttl_secs,
            "Session stored in Redis"
        );

        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let mut conn = self.conn.clone();

        let bytes: Option<Vec<u8>> = conn
            .get(Self::session_key(session_id))
            .await
            .map_err(|e| redis_fault("Failed to read session", &e))?;

        let session = decode(&bytes.ok_or(ApiError::SessionNotFound)?)?;

        // Redis TTLs normally reap stale sessions; this check covers
        // clock skew and manually extended keys.
        if session.expires_at < chrono::Utc::now() {
            return Err(ApiError::SessionExpired);
        }

        Ok(session)
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let mut conn = self.conn.clone();

        // The user binding is immutable for the life of a session.
        let existing = self.get_session(session.session_id).await?;
        if existing.user_id != session.user_id {
            return Err(ApiError::Internal(
                "Cannot change session user_id (immutable)".into(),
            ));
        }

        // Sliding window: re-derive the key TTL from the refreshed expiry.
        let remaining = session
            .expires_at
            .signed_duration_since(chrono::Utc::now());
        #[allow(clippy::cast_sign_loss)]
        let ttl_secs = remaining.num_seconds().max(0) as u64;

        let _: () = conn
            .set_ex(Self::session_key(session.session_id), encode(session)?, ttl_secs)
            .await
            .map_err(|e| redis_fault("Failed to update session", &e))?;

        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let mut conn = self.conn.clone();

        // Resolve the owner first so the index entry goes too; a missing
        // session still deletes cleanly.
        match self.get_session(session_id).await {
            Ok(session) => {
                let _: () = conn
                    .srem(
                        Self::user_sessions_key(session.user_id),
                        session_id.0.to_string(),
                    )
                    .await
                    .map_err(|e| redis_fault("Failed to update user session index", &e))?;
            }
            Err(ApiError::SessionNotFound | ApiError::SessionExpired) => {}
            Err(other) => return Err(other),
        }

        let _: () = conn
            .del(Self::session_key(session_id))
            .await
            .map_err(|e| redis_fault("Failed to delete session", &e))?;

        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: UserId) -> Result<usize> {
        let mut conn = self.conn.clone();

        // Lua script so reading the index and deleting its members is
        // atomic with respect to concurrent logins.
        let script = redis::Script::new(
            r"
            local ids = redis.call('SMEMBERS', KEYS[1])
            local deleted = 0
            for _, id in ipairs(ids) do
                deleted = deleted + redis.call('DEL', 'session:' .. id)
            end
            redis.call('DEL', KEYS[1])
            return deleted
            ",
        );

        let deleted: usize = script
            .key(Self::user_sessions_key(user_id))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| redis_fault("Failed to delete user sessions", &e))?;

        tracing::debug!(user_id = %user_id, deleted, "Revoked user sessions");

        Ok(deleted)
    }
}
