//! Signup, current-user, and account-deletion handlers.

use crate::error::{ApiError, Result};
use crate::extractors::SessionCookie;
use crate::handlers::StatusResponse;
use crate::handlers::session::{clear_session_cookie, session_cookie};
use crate::password::hash_password;
use crate::providers::{EmailProvider, EventStore, NewUser, SessionStore, User, UserStore};
use crate::state::{AppState, Session};
use crate::utils::{is_valid_email, normalize_email, validate_signup};
use axum::{Json, extract::State, http::StatusCode, http::header::SET_COOKIE};
use serde::{Deserialize, Serialize};

/// Signup request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Display name ("first name and last name").
    pub full_name: String,

    /// Email address.
    pub email_address: String,

    /// Plaintext password (8-20 characters).
    pub password: String,

    /// Must match `password`.
    pub password_confirmation: String,
}

/// User representation returned to clients.
///
/// Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: uuid::Uuid,

    /// Display name.
    pub full_name: String,

    /// Email address.
    pub email_address: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            full_name: user.full_name.clone(),
            email_address: user.email_address.clone(),
        }
    }
}

/// Create a user account.
///
/// # Endpoint
///
/// `POST /api/signup`
///
/// Returns 201 with the user and a session cookie, or 422 listing every
/// violated field invariant. The confirmation email is sent from a
/// spawned task and never delays or fails the response.
pub async fn signup<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, [(axum::http::HeaderName, String); 1], Json<UserResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let mut errors = validate_signup(
        &request.full_name,
        &request.email_address,
        &request.password,
        &request.password_confirmation,
    );

    // The uniqueness violation is reported together with the other field
    // violations, not on a retry after they are fixed.
    let email = normalize_email(&request.email_address);
    if is_valid_email(&email) && state.store.email_exists(&email).await? {
        errors.push("Email address has already been taken".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let new_user = NewUser {
        full_name: request.full_name.trim().to_string(),
        email_address: email,
        password_hash: hash_password(&request.password)?,
    };

    // The store re-checks uniqueness at insert time, closing the race
    // between the check above and the write.
    let user = state.store.create_user(&new_user).await?;

    let session = Session::issue(&user, state.config.session_ttl);
    state
        .sessions
        .create_session(&session, state.config.session_ttl)
        .await?;

    // Fire-and-forget confirmation email.
    let mailer = state.mailer.clone();
    let to = user.email_address.clone();
    let full_name = user.full_name.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_signup_confirmation(&to, &full_name).await {
            tracing::warn!(error = %err, to = %to, "Signup confirmation email failed");
        }
    });

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        [(
            SET_COOKIE,
            session_cookie(session.session_id, state.config.session_ttl),
        )],
        Json(UserResponse::from(&user)),
    ))
}

/// Resolve the current user from the session cookie.
///
/// # Endpoint
///
/// `GET /api/me`
///
/// Returns 404 (not 401) with `{"errors":["User Not Found"]}` when
/// unauthenticated: the client probes this endpoint on page load.
pub async fn me<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
) -> Result<Json<UserResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state
        .current_user(session.0)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Delete the current user's account.
///
/// # Endpoint
///
/// `DELETE /api/me`
///
/// Removes the user and, in the same transaction, their attendances,
/// organized events (with those events' attendances), and profile; then
/// invalidates every session the user holds.
pub async fn destroy<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
) -> Result<([(axum::http::HeaderName, String); 1], Json<StatusResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.require_user(session.0).await?;

    state.store.delete_user(user.id).await?;

    let revoked = state.sessions.delete_user_sessions(user.id).await?;
    tracing::info!(user_id = %user.id, revoked, "User account deleted");

    Ok((
        [(SET_COOKIE, clear_session_cookie())],
        Json(StatusResponse::message("Account has been deleted")),
    ))
}
