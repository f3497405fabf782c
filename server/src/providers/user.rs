//! User store trait.

use crate::error::Result;
use crate::state::UserId;
use super::{NewUser, Profile, User};
use std::future::Future;

/// User persistence.
///
/// Emails are stored lowercased; lookups are case-insensitive by
/// construction. Implementations must enforce email uniqueness at insert
/// time, not just at validation time.
pub trait UserStore: Send + Sync {
    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns a validation error with "Email address has already been
    /// taken" when the email is in use, or a database error.
    fn create_user(&self, new_user: &NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Get user by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown users, or a database error.
    fn get_user_by_id(&self, user_id: UserId) -> impl Future<Output = Result<User>> + Send;

    /// Get user by email address (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown emails, or a database error.
    fn get_user_by_email(&self, email: &str) -> impl Future<Output = Result<User>> + Send;

    /// Check if an email address is already registered (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn email_exists(&self, email: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Delete a user and everything they own.
    ///
    /// The cascade is a single transaction removing, in order: the user's
    /// attendances, attendances of their organized events, their organized
    /// events, their profile, and finally the user row.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown users, or a database error.
    fn delete_user(&self, user_id: UserId) -> impl Future<Output = Result<()>> + Send;

    /// Get a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when no profile exists, or a database
    /// error.
    fn get_profile(&self, user_id: UserId) -> impl Future<Output = Result<Profile>> + Send;

    /// Create or replace a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown users, or a database error.
    fn upsert_profile(&self, profile: &Profile) -> impl Future<Output = Result<Profile>> + Send;
}
