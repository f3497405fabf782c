//! API router composition.
//!
//! Composes all handlers into a single Axum router with the standard
//! middleware stack (correlation IDs, request tracing, CORS).

use crate::handlers::{attendances, events, health, profiles, session, users};
use crate::middleware::correlation_id_layer;
use crate::providers::{EmailProvider, EventStore, SessionStore, UserStore};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the API router with all endpoints.
///
/// # Routes
///
/// ## Accounts
/// - `POST /api/signup` - Create account and open a session
/// - `POST /api/login` - Authenticate and open a session
/// - `DELETE /api/logout` - Close the current session
/// - `GET /api/me` - Current user
/// - `DELETE /api/me` - Delete account and everything it owns
///
/// ## Events
/// - `GET /api/events` - List events
/// - `POST /api/events` - Create event (organizer = current user)
/// - `GET /api/events/:id` - Show event
/// - `DELETE /api/events/:id` - Cancel event (organizer only)
///
/// ## Attendances
/// - `GET /api/events/:id/attendances` - List attendees
/// - `POST /api/events/:id/attendances` - RSVP
/// - `DELETE /api/events/:id/attendances/:attendance_id` - Cancel RSVP
///
/// ## Profiles
/// - `GET /api/profiles/:user_id` - Public profile
/// - `PUT /api/me/profile` - Update own profile
///
/// ## Operations
/// - `GET /health` - Liveness
pub fn api_router<D, S, M>(state: AppState<D, S, M>) -> Router
where
    D: UserStore + EventStore + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: EmailProvider + Clone + Send + Sync + 'static,
{
    Router::new()
        // Account routes
        .route("/api/signup", post(users::signup::<D, S, M>))
        .route("/api/login", post(session::login::<D, S, M>))
        .route("/api/logout", delete(session::logout::<D, S, M>))
        .route(
            "/api/me",
            get(users::me::<D, S, M>).delete(users::destroy::<D, S, M>),
        )
        // Event routes
        .route(
            "/api/events",
            get(events::index::<D, S, M>).post(events::create::<D, S, M>),
        )
        .route(
            "/api/events/:id",
            get(events::show::<D, S, M>).delete(events::destroy::<D, S, M>),
        )
        // Attendance routes
        .route(
            "/api/events/:id/attendances",
            get(attendances::index::<D, S, M>).post(attendances::create::<D, S, M>),
        )
        .route(
            "/api/events/:id/attendances/:attendance_id",
            delete(attendances::destroy::<D, S, M>),
        )
        // Profile routes
        .route("/api/profiles/:user_id", get(profiles::show::<D, S, M>))
        .route("/api/me/profile", put(profiles::update::<D, S, M>))
        // Operational routes
        .route("/health", get(health::health))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
