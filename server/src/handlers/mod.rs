//! HTTP handlers, grouped by resource.
//!
//! Handlers are generic over the provider implementations carried in
//! [`AppState`](crate::state::AppState); the router instantiates them for
//! whichever backends the binary (or a test) wires in. Request and
//! response bodies are explicit structs per operation: only allow-listed
//! fields are ever read from clients, and only the summaries defined here
//! are ever serialized back.

use crate::providers::User;
use serde::Serialize;

pub mod attendances;
pub mod events;
pub mod health;
pub mod profiles;
pub mod session;
pub mod users;

/// User summary nested in event and attendance responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: uuid::Uuid,

    /// Display name.
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            full_name: user.full_name.clone(),
        }
    }
}

/// Status response for destructive operations.
///
/// The web client reads `{"status": ["…"]}` bodies after cancelling
/// events and RSVPs.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Human-readable status messages.
    pub status: Vec<String>,
}

impl StatusResponse {
    /// Build a single-message status body.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: vec![message.into()],
        }
    }
}
