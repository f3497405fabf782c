//! RSVP handlers.

use crate::error::{ApiError, Result};
use crate::extractors::SessionCookie;
use crate::handlers::{StatusResponse, UserSummary};
use crate::providers::{Attendance, EmailProvider, EventStore, SessionStore, User, UserStore};
use crate::state::{AppState, AttendanceId, EventId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

/// Attendance representation returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceResponse {
    /// Attendance ID.
    pub id: uuid::Uuid,

    /// Attending user's ID.
    pub user_id: uuid::Uuid,

    /// Event ID.
    pub event_id: uuid::Uuid,

    /// Attending user summary.
    pub user: UserSummary,
}

impl AttendanceResponse {
    fn build(attendance: &Attendance, user: &User) -> Self {
        Self {
            id: attendance.id.0,
            user_id: attendance.user_id.0,
            event_id: attendance.event_id.0,
            user: UserSummary::from(user),
        }
    }
}

/// List an event's attendees.
///
/// # Endpoint
///
/// `GET /api/events/:id/attendances`
///
/// Open: the client renders the RSVP list for logged-out visitors too.
pub async fn index<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    Path(event_id): Path<uuid::Uuid>,
) -> Result<Json<Vec<AttendanceResponse>>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let attendees = state.store.list_attendees(EventId(event_id)).await?;

    Ok(Json(
        attendees
            .iter()
            .map(|record| AttendanceResponse::build(&record.attendance, &record.user))
            .collect(),
    ))
}

/// RSVP the current user to an event.
///
/// # Endpoint
///
/// `POST /api/events/:id/attendances`
///
/// The store serializes the capacity check with the insert, so this
/// never overfills an event no matter how many requests race.
pub async fn create<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Path(event_id): Path<uuid::Uuid>,
) -> Result<(StatusCode, Json<AttendanceResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.require_user(session.0).await?;

    let attendance = state
        .store
        .create_attendance(EventId(event_id), user.id)
        .await?;

    tracing::info!(
        attendance_id = %attendance.id,
        event_id = %attendance.event_id,
        user_id = %user.id,
        "RSVP created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AttendanceResponse::build(&attendance, &user)),
    ))
}

/// Cancel the current user's RSVP.
///
/// # Endpoint
///
/// `DELETE /api/events/:id/attendances/:attendance_id`
///
/// Only the RSVP's owner may cancel it.
pub async fn destroy<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Path((event_id, attendance_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<Json<StatusResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.require_user(session.0).await?;

    let attendance = state
        .store
        .get_attendance(AttendanceId(attendance_id))
        .await?;

    // RSVPs are addressed under their event; a mismatched pair is a miss,
    // not a leak about other events' attendances.
    if attendance.event_id != EventId(event_id) {
        return Err(ApiError::not_found("Attendance"));
    }

    if attendance.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You can only cancel your own RSVP".to_string(),
        ));
    }

    state.store.delete_attendance(attendance.id).await?;
    tracing::info!(attendance_id = %attendance.id, user_id = %user.id, "RSVP canceled");

    Ok(Json(StatusResponse::message("RSVP has been canceled")))
}
