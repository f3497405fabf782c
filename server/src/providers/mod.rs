//! Provider traits and domain models.
//!
//! This module defines traits for every external dependency of the API:
//! persistence (`UserStore`, `EventStore`), sessions (`SessionStore`), and
//! outbound mail (`EmailProvider`). Handlers depend only on these traits;
//! the binary wires in Postgres/Redis/SMTP and the tests wire in the
//! in-memory implementations, so the domain logic is testable at memory
//! speed.

use crate::state::{AttendanceId, EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod console_email;
pub mod email;
pub mod event;
pub mod session;
pub mod smtp_email;
pub mod user;

// Re-export provider traits
pub use console_email::ConsoleEmailProvider;
pub use email::EmailProvider;
pub use event::EventStore;
pub use session::SessionStore;
pub use smtp_email::SmtpEmailProvider;
pub use user::UserStore;

/// User account.
///
/// `password_hash` is intentionally not part of any response type; only
/// the handler-level summaries are ever serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User ID.
    pub id: UserId,

    /// Display name ("first name and last name").
    pub full_name: String,

    /// Email address, stored lowercased.
    pub email_address: String,

    /// Encoded Argon2id password hash.
    pub password_hash: String,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user.
///
/// Built by the signup handler after field validation and password
/// hashing; stores only enforce the uniqueness invariant on top.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub full_name: String,

    /// Lowercased email address.
    pub email_address: String,

    /// Encoded Argon2id password hash.
    pub password_hash: String,
}

/// Event open for RSVPs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event ID.
    pub id: EventId,

    /// Event name.
    pub event_name: String,

    /// Event location.
    pub event_location: String,

    /// Event description.
    pub event_description: String,

    /// Start of the event, when scheduled.
    pub event_start: Option<DateTime<Utc>>,

    /// End of the event, when scheduled. Past-end events reject RSVPs.
    pub event_end: Option<DateTime<Utc>>,

    /// Capacity: maximum number of attendances the event accepts.
    pub max_attendees: i32,

    /// Organizing user.
    pub organizer_id: UserId,

    /// Number of current attendances, derived at read time.
    pub attendee_count: i64,

    /// Event created timestamp.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Remaining spots (`capacity - attendances`), never negative.
    #[must_use]
    pub fn available_spots(&self) -> i64 {
        (i64::from(self.max_attendees) - self.attendee_count).max(0)
    }

    /// Whether the event reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.attendee_count >= i64::from(self.max_attendees)
    }

    /// Whether the event's scheduled end is in the past.
    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.event_end.is_some_and(|end| end < now)
    }
}

/// Validated input for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Event name.
    pub event_name: String,

    /// Event location.
    pub event_location: String,

    /// Event description.
    pub event_description: String,

    /// Start of the event, when scheduled.
    pub event_start: Option<DateTime<Utc>>,

    /// End of the event, when scheduled.
    pub event_end: Option<DateTime<Utc>>,

    /// Capacity.
    pub max_attendees: i32,

    /// Organizer, taken from the authenticated principal.
    pub organizer_id: UserId,
}

/// RSVP: a user's commitment to attend an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attendance {
    /// Attendance ID.
    pub id: AttendanceId,

    /// Attending user.
    pub user_id: UserId,

    /// Attended event.
    pub event_id: EventId,

    /// RSVP timestamp.
    pub created_at: DateTime<Utc>,
}

/// An attendance joined with its user, for attendee listings.
#[derive(Debug, Clone)]
pub struct EventAttendee {
    /// The attendance record.
    pub attendance: Attendance,

    /// The attending user.
    pub user: User,
}

/// One-to-one extension of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user.
    pub user_id: UserId,

    /// Avatar image URL.
    pub avatar: Option<String>,

    /// Short biography.
    pub bio: Option<String>,
}
