//! Profile handlers.

use crate::error::{ApiError, Result};
use crate::extractors::SessionCookie;
use crate::providers::{EmailProvider, EventStore, Profile, SessionStore, UserStore};
use crate::state::{AppState, UserId};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

/// Profile representation returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    /// Owning user's ID.
    pub user_id: uuid::Uuid,

    /// User's display name.
    pub full_name: String,

    /// Avatar image URL, if set.
    pub avatar: Option<String>,

    /// Free-form biography, if set.
    pub bio: Option<String>,
}

/// Body accepted by `PUT /api/me/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    /// Avatar image URL.
    pub avatar: Option<String>,

    /// Free-form biography.
    pub bio: Option<String>,
}

/// Show a user's public profile.
///
/// # Endpoint
///
/// `GET /api/profiles/:user_id`
///
/// A user who never saved a profile still has one: the response falls
/// back to empty avatar and bio rather than 404ing.
pub async fn show<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    Path(user_id): Path<uuid::Uuid>,
) -> Result<Json<ProfileResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.store.get_user_by_id(UserId(user_id)).await?;

    let profile = match state.store.get_profile(user.id).await {
        Ok(profile) => Some(profile),
        Err(ApiError::NotFound(_)) => None,
        Err(err) => return Err(err),
    };

    Ok(Json(ProfileResponse {
        user_id: user.id.0,
        full_name: user.full_name,
        avatar: profile.as_ref().and_then(|p| p.avatar.clone()),
        bio: profile.as_ref().and_then(|p| p.bio.clone()),
    }))
}

/// Update the current user's profile.
///
/// # Endpoint
///
/// `PUT /api/me/profile`
pub async fn update<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.require_user(session.0).await?;

    let profile = Profile {
        user_id: user.id,
        avatar: request.avatar,
        bio: request.bio,
    };

    let saved = state.store.upsert_profile(&profile).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(ProfileResponse {
        user_id: saved.user_id.0,
        full_name: user.full_name,
        avatar: saved.avatar,
        bio: saved.bio,
    }))
}
