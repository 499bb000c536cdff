use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// A todo entity as stored and as returned by the API.
///
/// `completed_at` holds epoch milliseconds and is present iff `completed`
/// is true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub completed_at: Option<i64>,
    /// The owning user's id. Every read and write is scoped to it.
    pub creator: i32,
    pub created_at: DateTime<Utc>,
}

/// Body accepted when creating a todo.
#[derive(Debug, Deserialize, Validate)]
pub struct TodoInput {
    #[validate(length(min = 1))]
    pub text: String,
}

/// The allow-listed update fields.
///
/// Anything else in the request body is dropped at deserialization; in
/// particular a client-supplied `completedAt` never reaches the database.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TodoUpdate {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TodoUpdate {
    /// Resolves the completion pair for this update: `completed: true`
    /// stamps the current time, `false` or absent clears both.
    pub fn completion(&self) -> (bool, Option<i64>) {
        match self.completed {
            Some(true) => (true, Some(Utc::now().timestamp_millis())),
            _ => (false, None),
        }
    }
}

impl Todo {
    pub async fn create(pool: &PgPool, input: TodoInput, creator: i32) -> Result<Todo, AppError> {
        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (id, text, creator) VALUES ($1, $2, $3) \
             RETURNING id, text, completed, completed_at, creator, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&input.text)
        .bind(creator)
        .fetch_one(pool)
        .await?;

        Ok(todo)
    }

    /// All todos owned by `creator`, in creation order.
    pub async fn list_for(pool: &PgPool, creator: i32) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, text, completed, completed_at, creator, created_at \
             FROM todos WHERE creator = $1 ORDER BY created_at",
        )
        .bind(creator)
        .fetch_all(pool)
        .await?;

        Ok(todos)
    }

    /// Fetches one todo, scoped to its owner. A todo belonging to someone
    /// else is indistinguishable from a missing one.
    pub async fn find_for(pool: &PgPool, id: Uuid, creator: i32) -> Result<Todo, AppError> {
        sqlx::query_as::<_, Todo>(
            "SELECT id, text, completed, completed_at, creator, created_at \
             FROM todos WHERE id = $1 AND creator = $2",
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    /// Deletes one todo, scoped to its owner, and returns the removed row.
    pub async fn delete_for(pool: &PgPool, id: Uuid, creator: i32) -> Result<Todo, AppError> {
        sqlx::query_as::<_, Todo>(
            "DELETE FROM todos WHERE id = $1 AND creator = $2 \
             RETURNING id, text, completed, completed_at, creator, created_at",
        )
        .bind(id)
        .bind(creator)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    /// Applies an allow-listed update, scoped to the owner. The completion
    /// timestamp is always computed server-side from the `completed` flag.
    pub async fn update_for(
        pool: &PgPool,
        id: Uuid,
        creator: i32,
        update: TodoUpdate,
    ) -> Result<Todo, AppError> {
        let (completed, completed_at) = update.completion();

        sqlx::query_as::<_, Todo>(
            "UPDATE todos \
             SET text = COALESCE($3, text), completed = $4, completed_at = $5 \
             WHERE id = $1 AND creator = $2 \
             RETURNING id, text, completed, completed_at, creator, created_at",
        )
        .bind(id)
        .bind(creator)
        .bind(&update.text)
        .bind(completed)
        .bind(completed_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }
}
