//! Login and logout handlers, plus session cookie construction.

use crate::error::{ApiError, Result};
use crate::extractors::{SESSION_COOKIE, SessionCookie};
use crate::handlers::StatusResponse;
use crate::handlers::users::UserResponse;
use crate::password::verify_password;
use crate::providers::{EmailProvider, EventStore, SessionStore, UserStore};
use crate::state::{AppState, Session, SessionId};
use crate::utils::normalize_email;
use axum::{Json, extract::State, http::header::SET_COOKIE};
use serde::Deserialize;

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email_address: String,

    /// Plaintext password.
    pub password: String,
}

/// Build the `Set-Cookie` value for a fresh session.
///
/// `HttpOnly` keeps the ID away from scripts; `SameSite=Lax` covers the
/// fetch-from-same-origin client.
#[must_use]
pub fn session_cookie(session_id: SessionId, ttl: chrono::Duration) -> String {
    format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session_id,
        ttl.num_seconds().max(0)
    )
}

/// Build the `Set-Cookie` value that expires the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Log a user in.
///
/// # Endpoint
///
/// `POST /api/login`
///
/// Both unknown emails and wrong passwords produce the same generic 401,
/// so the endpoint cannot be used to probe which addresses are
/// registered.
pub async fn login<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    Json(request): Json<LoginRequest>,
) -> Result<([(axum::http::HeaderName, String); 1], Json<UserResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    // Same normalization as signup, so stray whitespace or a different
    // case never locks a user out.
    let user = state
        .store
        .get_user_by_email(&normalize_email(&request.email_address))
        .await
        .map_err(|err| match err {
            ApiError::NotFound(_) => ApiError::InvalidCredentials,
            other => other,
        })?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let session = Session::issue(&user, state.config.session_ttl);
    state
        .sessions
        .create_session(&session, state.config.session_ttl)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        [(
            SET_COOKIE,
            session_cookie(session.session_id, state.config.session_ttl),
        )],
        Json(UserResponse::from(&user)),
    ))
}

/// Log the current user out.
///
/// # Endpoint
///
/// `DELETE /api/logout`
pub async fn logout<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
) -> Result<([(axum::http::HeaderName, String); 1], Json<StatusResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let session_id = session.0.ok_or(ApiError::Unauthorized)?;

    state.sessions.delete_session(session_id).await?;

    Ok((
        [(SET_COOKIE, clear_session_cookie())],
        Json(StatusResponse::message("Logged out successfully")),
    ))
}
