use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::auth::{hash_password, verify_password};
use crate::error::AppError;

/// Purpose tag under which session tokens are stored in the token list.
pub const AUTH_PURPOSE: &str = "auth";

/// A user row. The digest and the token list rows never leave the server;
/// wire responses use [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Wire-facing view of a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// A user draft still holding the plaintext password.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

/// A storage-ready user record; the plaintext is gone.
#[derive(Debug)]
pub struct StorableUser {
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Hashes the plaintext exactly once and yields a record fit for
    /// persistence. A hashing failure aborts the save and propagates.
    pub fn finalize_for_storage(self) -> Result<StorableUser, AppError> {
        let password_hash = hash_password(&self.password)?;
        Ok(StorableUser {
            email: self.email,
            password_hash,
        })
    }
}

impl User {
    /// Inserts a finalized user record. A duplicate email surfaces as
    /// `AppError::DuplicateKey` via the unique constraint on `users.email`.
    pub async fn create(pool: &PgPool, record: StorableUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, created_at",
        )
        .bind(&record.email)
        .bind(&record.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Looks a user up by email and checks the password against the stored
    /// digest. Both an unknown email and a wrong password fail with the same
    /// outward error, so callers cannot probe which emails exist.
    pub async fn find_by_credentials(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid credentials".into()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::NotFound("Invalid credentials".into()));
        }

        Ok(user)
    }

    /// Resolves a user only if the given token is present in their stored
    /// token list under the session purpose tag. `None` means the token was
    /// never issued to this user or has been revoked by logout.
    pub async fn find_by_token(
        pool: &PgPool,
        user_id: i32,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.created_at \
             FROM users u \
             JOIN user_tokens t ON t.user_id = u.id \
             WHERE u.id = $1 AND t.purpose = $2 AND t.token = $3",
        )
        .bind(user_id)
        .bind(AUTH_PURPOSE)
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Appends a session token to the user's token list. Each login adds an
    /// entry; existing sessions are untouched (multi-device).
    pub async fn add_token(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_tokens (user_id, purpose, token) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(AUTH_PURPOSE)
            .bind(token)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Removes all entries matching the given token value for this user.
    /// Removing an absent token is not an error; logout must be idempotent.
    pub async fn remove_token(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    #[test]
    fn test_finalize_for_storage_hashes_once() {
        let draft = NewUser {
            email: "draft@example.com".to_string(),
            password: "plaintext-secret".to_string(),
        };

        let record = draft.finalize_for_storage().unwrap();

        assert_eq!(record.email, "draft@example.com");
        assert_ne!(record.password_hash, "plaintext-secret");
        assert!(verify_password("plaintext-secret", &record.password_hash).unwrap());
    }

    #[test]
    fn test_public_user_hides_the_digest() {
        let user = User {
            id: 9,
            email: "visible@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();

        assert_eq!(json["id"], 9);
        assert_eq!(json["email"], "visible@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("created_at").is_none());
    }
}
