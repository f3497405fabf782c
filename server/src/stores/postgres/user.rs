//! `UserStore` implementation for PostgreSQL.

use super::{PostgresStore, is_unique_violation};
use crate::error::{ApiError, Result};
use crate::providers::{NewUser, Profile, User, UserStore};
use crate::state::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row shape for the `users` table.
#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    full_name: String,
    email_address: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            full_name: row.full_name,
            email_address: row.email_address,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Row shape for the `profiles` table.
#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: uuid::Uuid,
    avatar: Option<String>,
    bio: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            avatar: row.avatar,
            bio: row.bio,
        }
    }
}

impl UserStore for PostgresStore {
    async fn create_user(&self, new_user: &NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, full_name, email_address, password_hash, created_at)
            VALUES ($1, $2, LOWER($3), $4, NOW())
            RETURNING id, full_name, email_address, password_hash, created_at
            ",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(&new_user.full_name)
        .bind(&new_user.email_address)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::validation("Email address has already been taken")
            } else {
                err.into()
            }
        })?;

        Ok(row.into())
    }

    async fn get_user_by_id(&self, user_id: UserId) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, full_name, email_address, password_hash, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.0)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

        Ok(row.into())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, full_name, email_address, password_hash, created_at
            FROM users
            WHERE email_address = LOWER($1)
            ",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

        Ok(row.into())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE email_address = LOWER($1))
            ",
        )
        .bind(email)
        .fetch_one(self.pool())
        .await?;

        Ok(exists)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<()> {
        // Explicit cascade: the deletion order matters and is visible here
        // rather than hidden in FK definitions.
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM attendances WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            DELETE FROM attendances
            WHERE event_id IN (SELECT id FROM events WHERE organizer_id = $1)
            ",
        )
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM events WHERE organizer_id = $1")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Dropping the transaction rolls the cascade back.
            return Err(ApiError::not_found("User"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT user_id, avatar, bio
            FROM profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id.0)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Profile"))?;

        Ok(row.into())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profiles (user_id, avatar, bio)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET avatar = EXCLUDED.avatar, bio = EXCLUDED.bio
            RETURNING user_id, avatar, bio
            ",
        )
        .bind(profile.user_id.0)
        .bind(&profile.avatar)
        .bind(&profile.bio)
        .fetch_one(self.pool())
        .await
        .map_err(|err| match &err {
            // FK violation: the user does not exist.
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::not_found("User")
            }
            _ => err.into(),
        })?;

        Ok(row.into())
    }
}
