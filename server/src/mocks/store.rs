//! Mock persistence backend for testing.

use crate::error::{ApiError, Result};
use crate::providers::{
    Attendance, Event, EventAttendee, EventStore, NewEvent, NewUser, Profile, User, UserStore,
};
use crate::state::{AttendanceId, EventId, UserId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// All tables under one lock, so multi-entity operations (cascades, the
/// RSVP capacity check) are as atomic as their Postgres counterparts.
#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    attendances: HashMap<AttendanceId, Attendance>,
    profiles: HashMap<UserId, Profile>,
}

impl Inner {
    fn attendance_count(&self, event_id: EventId) -> i64 {
        self.attendances
            .values()
            .filter(|a| a.event_id == event_id)
            .count() as i64
    }

    fn event_with_count(&self, event: &Event) -> Event {
        let mut event = event.clone();
        event.attendee_count = self.attendance_count(event.id);
        event
    }
}

/// Mock store implementing both `UserStore` and `EventStore`.
///
/// Uses in-memory storage for testing.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    /// Create a new mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.users.len())
    }

    /// Number of stored attendances (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn attendance_count(&self) -> Result<usize> {
        Ok(self.lock()?.attendances.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ApiError::Internal("Mock store lock poisoned".to_string()))
    }
}

impl UserStore for MockStore {
    async fn create_user(&self, new_user: &NewUser) -> Result<User> {
        let mut inner = self.lock()?;

        let email = new_user.email_address.to_lowercase();
        if inner
            .users
            .values()
            .any(|user| user.email_address == email)
        {
            return Err(ApiError::validation("Email address has already been taken"));
        }

        let user = User {
            id: UserId::new(),
            full_name: new_user.full_name.clone(),
            email_address: email,
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: UserId) -> Result<User> {
        self.lock()?
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("User"))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let email = email.to_lowercase();
        self.lock()?
            .users
            .values()
            .find(|user| user.email_address == email)
            .cloned()
            .ok_or_else(|| ApiError::not_found("User"))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .users
            .values()
            .any(|user| user.email_address == email))
    }

    async fn delete_user(&self, user_id: UserId) -> Result<()> {
        let mut inner = self.lock()?;

        if !inner.users.contains_key(&user_id) {
            return Err(ApiError::not_found("User"));
        }

        // Same cascade order as the Postgres store.
        inner.attendances.retain(|_, a| a.user_id != user_id);
        let organized: Vec<EventId> = inner
            .events
            .values()
            .filter(|e| e.organizer_id == user_id)
            .map(|e| e.id)
            .collect();
        inner
            .attendances
            .retain(|_, a| !organized.contains(&a.event_id));
        inner.events.retain(|_, e| e.organizer_id != user_id);
        inner.profiles.remove(&user_id);
        inner.users.remove(&user_id);
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Profile> {
        self.lock()?
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Profile"))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile> {
        let mut inner = self.lock()?;

        if !inner.users.contains_key(&profile.user_id) {
            return Err(ApiError::not_found("User"));
        }

        inner.profiles.insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }
}

impl EventStore for MockStore {
    async fn create_event(&self, new_event: &NewEvent) -> Result<Event> {
        let mut inner = self.lock()?;

        let event = Event {
            id: EventId::new(),
            event_name: new_event.event_name.clone(),
            event_location: new_event.event_location.clone(),
            event_description: new_event.event_description.clone(),
            event_start: new_event.event_start,
            event_end: new_event.event_end,
            max_attendees: new_event.max_attendees,
            organizer_id: new_event.organizer_id,
            attendee_count: 0,
            created_at: Utc::now(),
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Event> {
        let inner = self.lock()?;
        inner
            .events
            .get(&event_id)
            .map(|event| inner.event_with_count(event))
            .ok_or_else(|| ApiError::not_found("Event"))
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let inner = self.lock()?;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .map(|event| inner.event_with_count(event))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn delete_event(&self, event_id: EventId) -> Result<()> {
        let mut inner = self.lock()?;

        if inner.events.remove(&event_id).is_none() {
            return Err(ApiError::not_found("Event"));
        }
        inner.attendances.retain(|_, a| a.event_id != event_id);
        Ok(())
    }

    async fn create_attendance(&self, event_id: EventId, user_id: UserId) -> Result<Attendance> {
        // One lock around check-and-insert: concurrent RSVPs serialize here.
        let mut inner = self.lock()?;

        let event = inner
            .events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Event"))?;

        if event.event_end.is_some_and(|end| end < Utc::now()) {
            return Err(ApiError::validation("Event has already ended"));
        }

        if inner
            .attendances
            .values()
            .any(|a| a.event_id == event_id && a.user_id == user_id)
        {
            return Err(ApiError::validation("You are already attending this event"));
        }

        if inner.attendance_count(event_id) >= i64::from(event.max_attendees) {
            return Err(ApiError::validation("Event is at capacity"));
        }

        let attendance = Attendance {
            id: AttendanceId::new(),
            user_id,
            event_id,
            created_at: Utc::now(),
        };
        inner.attendances.insert(attendance.id, attendance);
        Ok(attendance)
    }

    async fn get_attendance(&self, attendance_id: AttendanceId) -> Result<Attendance> {
        self.lock()?
            .attendances
            .get(&attendance_id)
            .copied()
            .ok_or_else(|| ApiError::not_found("Attendance"))
    }

    async fn delete_attendance(&self, attendance_id: AttendanceId) -> Result<()> {
        if self.lock()?.attendances.remove(&attendance_id).is_none() {
            return Err(ApiError::not_found("Attendance"));
        }
        Ok(())
    }

    async fn list_attendees(&self, event_id: EventId) -> Result<Vec<EventAttendee>> {
        let inner = self.lock()?;

        if !inner.events.contains_key(&event_id) {
            return Err(ApiError::not_found("Event"));
        }

        let mut attendees: Vec<EventAttendee> = inner
            .attendances
            .values()
            .filter(|a| a.event_id == event_id)
            .filter_map(|a| {
                inner.users.get(&a.user_id).map(|user| EventAttendee {
                    attendance: *a,
                    user: user.clone(),
                })
            })
            .collect();
        attendees.sort_by(|a, b| a.attendance.created_at.cmp(&b.attendance.created_at));
        Ok(attendees)
    }

    async fn is_attending(&self, event_id: EventId, user_id: UserId) -> Result<bool> {
        Ok(self
            .lock()?
            .attendances
            .values()
            .any(|a| a.event_id == event_id && a.user_id == user_id))
    }
}
