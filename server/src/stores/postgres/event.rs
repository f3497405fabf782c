//! `EventStore` implementation for PostgreSQL.

use super::{PostgresStore, is_unique_violation};
use crate::error::{ApiError, Result};
use crate::providers::{Attendance, Event, EventAttendee, EventStore, NewEvent, User};
use crate::state::{AttendanceId, EventId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row shape for events joined with their attendance count.
#[derive(Debug, FromRow)]
struct EventRow {
    id: uuid::Uuid,
    event_name: String,
    event_location: String,
    event_description: String,
    event_start: Option<DateTime<Utc>>,
    event_end: Option<DateTime<Utc>>,
    max_attendees: i32,
    organizer_id: uuid::Uuid,
    attendee_count: i64,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            event_name: row.event_name,
            event_location: row.event_location,
            event_description: row.event_description,
            event_start: row.event_start,
            event_end: row.event_end,
            max_attendees: row.max_attendees,
            organizer_id: UserId(row.organizer_id),
            attendee_count: row.attendee_count,
            created_at: row.created_at,
        }
    }
}

/// Row shape for the `attendances` table.
#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    event_id: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: AttendanceId(row.id),
            user_id: UserId(row.user_id),
            event_id: EventId(row.event_id),
            created_at: row.created_at,
        }
    }
}

/// Row shape for attendances joined with their users.
#[derive(Debug, FromRow)]
struct AttendeeRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    event_id: uuid::Uuid,
    created_at: DateTime<Utc>,
    full_name: String,
    email_address: String,
    password_hash: String,
    user_created_at: DateTime<Utc>,
}

impl From<AttendeeRow> for EventAttendee {
    fn from(row: AttendeeRow) -> Self {
        Self {
            attendance: Attendance {
                id: AttendanceId(row.id),
                user_id: UserId(row.user_id),
                event_id: EventId(row.event_id),
                created_at: row.created_at,
            },
            user: User {
                id: UserId(row.user_id),
                full_name: row.full_name,
                email_address: row.email_address,
                password_hash: row.password_hash,
                created_at: row.user_created_at,
            },
        }
    }
}

/// Shared SELECT for events with their attendance counts.
const EVENT_WITH_COUNT: &str = r"
    SELECT e.id, e.event_name, e.event_location, e.event_description,
           e.event_start, e.event_end, e.max_attendees, e.organizer_id,
           e.created_at,
           COUNT(a.id) AS attendee_count
    FROM events e
    LEFT JOIN attendances a ON a.event_id = e.id
";

impl EventStore for PostgresStore {
    async fn create_event(&self, new_event: &NewEvent) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r"
            INSERT INTO events (id, event_name, event_location, event_description,
                                event_start, event_end, max_attendees, organizer_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING id, event_name, event_location, event_description,
                      event_start, event_end, max_attendees, organizer_id,
                      created_at, 0::bigint AS attendee_count
            ",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(&new_event.event_name)
        .bind(&new_event.event_location)
        .bind(&new_event.event_description)
        .bind(new_event.event_start)
        .bind(new_event.event_end)
        .bind(new_event.max_attendees)
        .bind(new_event.organizer_id.0)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Event> {
        let query = format!("{EVENT_WITH_COUNT} WHERE e.id = $1 GROUP BY e.id");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(event_id.0)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| ApiError::not_found("Event"))?;

        Ok(row.into())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let query = format!("{EVENT_WITH_COUNT} GROUP BY e.id ORDER BY e.created_at DESC");
        let rows = sqlx::query_as::<_, EventRow>(&query)
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn delete_event(&self, event_id: EventId) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM attendances WHERE event_id = $1")
            .bind(event_id.0)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.0)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("Event"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn create_attendance(&self, event_id: EventId, user_id: UserId) -> Result<Attendance> {
        // Serialize the capacity check with the insert: the event row is
        // locked for the duration of the transaction, so two concurrent
        // RSVPs to the last spot cannot both observe it free.
        let mut tx = self.pool().begin().await?;

        let event = sqlx::query_as::<_, LockedEventRow>(
            r"
            SELECT id, max_attendees, event_end
            FROM events
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(event_id.0)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

        if event.event_end.is_some_and(|end| end < Utc::now()) {
            return Err(ApiError::validation("Event has already ended"));
        }

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendances WHERE event_id = $1",
        )
        .bind(event_id.0)
        .fetch_one(&mut *tx)
        .await?;

        if count >= i64::from(event.max_attendees) {
            return Err(ApiError::validation("Event is at capacity"));
        }

        let row = sqlx::query_as::<_, AttendanceRow>(
            r"
            INSERT INTO attendances (id, user_id, event_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, event_id, created_at
            ",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(user_id.0)
        .bind(event_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            // Backstop for the (user_id, event_id) unique index.
            if is_unique_violation(&err) {
                ApiError::validation("You are already attending this event")
            } else {
                err.into()
            }
        })?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn get_attendance(&self, attendance_id: AttendanceId) -> Result<Attendance> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r"
            SELECT id, user_id, event_id, created_at
            FROM attendances
            WHERE id = $1
            ",
        )
        .bind(attendance_id.0)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Attendance"))?;

        Ok(row.into())
    }

    async fn delete_attendance(&self, attendance_id: AttendanceId) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM attendances WHERE id = $1")
            .bind(attendance_id.0)
            .execute(self.pool())
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("Attendance"));
        }
        Ok(())
    }

    async fn list_attendees(&self, event_id: EventId) -> Result<Vec<EventAttendee>> {
        // Missing events 404 instead of returning an empty list.
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
        )
        .bind(event_id.0)
        .fetch_one(self.pool())
        .await?;
        if !exists {
            return Err(ApiError::not_found("Event"));
        }

        let rows = sqlx::query_as::<_, AttendeeRow>(
            r"
            SELECT a.id, a.user_id, a.event_id, a.created_at,
                   u.full_name, u.email_address, u.password_hash,
                   u.created_at AS user_created_at
            FROM attendances a
            JOIN users u ON u.id = a.user_id
            WHERE a.event_id = $1
            ORDER BY a.created_at ASC
            ",
        )
        .bind(event_id.0)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(EventAttendee::from).collect())
    }

    async fn is_attending(&self, event_id: EventId, user_id: UserId) -> Result<bool> {
        let attending = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM attendances WHERE event_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(event_id.0)
        .bind(user_id.0)
        .fetch_one(self.pool())
        .await?;

        Ok(attending)
    }
}

/// Row shape for the locked event read inside the RSVP transaction.
#[derive(Debug, FromRow)]
struct LockedEventRow {
    #[allow(dead_code)]
    id: uuid::Uuid,
    max_attendees: i32,
    event_end: Option<DateTime<Utc>>,
}
