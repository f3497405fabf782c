//! Event listing, creation, and cancellation handlers.

use crate::error::{ApiError, Result};
use crate::extractors::SessionCookie;
use crate::handlers::{StatusResponse, UserSummary};
use crate::providers::{EmailProvider, Event, EventStore, NewEvent, SessionStore, User, UserStore};
use crate::state::{AppState, EventId};
use crate::utils::validate_event;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event creation request body.
///
/// The capacity field is named `available_spots` on the wire for client
/// compatibility; it is the event's total capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    /// Event name.
    pub event_name: String,

    /// Event location.
    pub event_location: String,

    /// Event description.
    pub event_description: String,

    /// Capacity.
    #[serde(alias = "max_attendees")]
    pub available_spots: i64,

    /// Start of the event.
    #[serde(default)]
    pub event_start: Option<DateTime<Utc>>,

    /// End of the event.
    #[serde(default)]
    pub event_end: Option<DateTime<Utc>>,
}

/// Event representation returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    /// Event ID.
    pub id: uuid::Uuid,

    /// Event name.
    pub event_name: String,

    /// Event location.
    pub event_location: String,

    /// Event description.
    pub event_description: String,

    /// Start of the event.
    pub event_start: Option<DateTime<Utc>>,

    /// End of the event.
    pub event_end: Option<DateTime<Utc>>,

    /// Capacity.
    pub max_attendees: i32,

    /// Remaining spots (capacity minus current attendances).
    pub available_spots: i64,

    /// Whether the viewing user attends this event.
    pub is_attending: bool,

    /// Organizer summary.
    pub organizer: UserSummary,
}

impl EventResponse {
    fn build(event: &Event, organizer: &User, is_attending: bool) -> Self {
        Self {
            id: event.id.0,
            event_name: event.event_name.clone(),
            event_location: event.event_location.clone(),
            event_description: event.event_description.clone(),
            event_start: event.event_start,
            event_end: event.event_end,
            max_attendees: event.max_attendees,
            available_spots: event.available_spots(),
            is_attending,
            organizer: UserSummary::from(organizer),
        }
    }
}

/// Annotate an event with its organizer and the viewer's RSVP state.
async fn annotate<D>(store: &D, event: &Event, viewer: Option<&User>) -> Result<EventResponse>
where
    D: UserStore + EventStore,
{
    let organizer = store.get_user_by_id(event.organizer_id).await?;
    let is_attending = match viewer {
        Some(user) => store.is_attending(event.id, user.id).await?,
        None => false,
    };
    Ok(EventResponse::build(event, &organizer, is_attending))
}

/// List all events.
///
/// # Endpoint
///
/// `GET /api/events`
///
/// Open to everyone; `is_attending` is annotated for logged-in viewers
/// and `false` otherwise.
pub async fn index<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
) -> Result<Json<Vec<EventResponse>>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let viewer = state.current_user(session.0).await?;
    let events = state.store.list_events().await?;

    let mut responses = Vec::with_capacity(events.len());
    for event in &events {
        responses.push(annotate(&state.store, event, viewer.as_ref()).await?);
    }

    Ok(Json(responses))
}

/// Create an event.
///
/// # Endpoint
///
/// `POST /api/events`
///
/// The organizer is the authenticated principal; client-supplied
/// organizer fields do not exist in the request shape.
pub async fn create<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>)>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let organizer = state.require_user(session.0).await?;

    let errors = validate_event(
        &request.event_name,
        &request.event_location,
        &request.event_description,
        request.available_spots,
        request.event_start,
        request.event_end,
    );
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    #[allow(clippy::cast_possible_truncation)]
    let new_event = NewEvent {
        event_name: request.event_name.trim().to_string(),
        event_location: request.event_location.trim().to_string(),
        event_description: request.event_description.trim().to_string(),
        event_start: request.event_start,
        event_end: request.event_end,
        max_attendees: request.available_spots as i32,
        organizer_id: organizer.id,
    };

    let event = state.store.create_event(&new_event).await?;
    tracing::info!(event_id = %event.id, organizer_id = %organizer.id, "Event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse::build(&event, &organizer, false)),
    ))
}

/// Show a single event.
///
/// # Endpoint
///
/// `GET /api/events/:id`
pub async fn show<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Path(event_id): Path<uuid::Uuid>,
) -> Result<Json<EventResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let viewer = state.current_user(session.0).await?;
    let event = state.store.get_event(EventId(event_id)).await?;

    Ok(Json(annotate(&state.store, &event, viewer.as_ref()).await?))
}

/// Cancel an event.
///
/// # Endpoint
///
/// `DELETE /api/events/:id`
///
/// Organizer only; removes the event and its attendances.
pub async fn destroy<D, S, M>(
    State(state): State<AppState<D, S, M>>,
    session: SessionCookie,
    Path(event_id): Path<uuid::Uuid>,
) -> Result<Json<StatusResponse>>
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    let user = state.require_user(session.0).await?;
    let event = state.store.get_event(EventId(event_id)).await?;

    if event.organizer_id != user.id {
        return Err(ApiError::Forbidden(
            "Only the organizer can cancel this event".to_string(),
        ));
    }

    state.store.delete_event(event.id).await?;
    tracing::info!(event_id = %event.id, organizer_id = %user.id, "Event canceled");

    Ok(Json(StatusResponse::message("Event has been canceled")))
}
