//! Event and attendance store trait.

use crate::error::Result;
use crate::state::{AttendanceId, EventId, UserId};
use super::{Attendance, Event, EventAttendee, NewEvent};
use std::future::Future;

/// Event and attendance persistence.
///
/// RSVP creation is the one capacity-sensitive path: implementations must
/// serialize the capacity check with the insert (row lock or single mutex)
/// so concurrent RSVPs can never overfill an event.
pub trait EventStore: Send + Sync {
    /// Create an event.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails.
    fn create_event(&self, new_event: &NewEvent) -> impl Future<Output = Result<Event>> + Send;

    /// Get an event by ID, with its current attendance count.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown events, or a database error.
    fn get_event(&self, event_id: EventId) -> impl Future<Output = Result<Event>> + Send;

    /// List all events with their attendance counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Delete an event and its attendances in one transaction.
    ///
    /// Authorization (organizer-only) is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown events, or a database error.
    fn delete_event(&self, event_id: EventId) -> impl Future<Output = Result<()>> + Send;

    /// RSVP a user to an event.
    ///
    /// Atomically verifies, within the same critical section as the
    /// insert, that the event exists, has not ended, is not at capacity,
    /// and that the user is not already attending.
    ///
    /// # Errors
    ///
    /// Returns a validation error for full/ended/duplicate RSVPs,
    /// `ApiError::NotFound` for unknown events, or a database error.
    fn create_attendance(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Attendance>> + Send;

    /// Get an attendance by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown attendances, or a database
    /// error.
    fn get_attendance(
        &self,
        attendance_id: AttendanceId,
    ) -> impl Future<Output = Result<Attendance>> + Send;

    /// Delete an attendance.
    ///
    /// Ownership is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown attendances, or a database
    /// error.
    fn delete_attendance(
        &self,
        attendance_id: AttendanceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List an event's attendances joined with their users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown events, or a database error.
    fn list_attendees(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<EventAttendee>>> + Send;

    /// Whether a user currently attends an event.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    fn is_attending(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool>> + Send;
}
