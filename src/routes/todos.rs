use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthSession;
use crate::error::AppError;
use crate::models::{Todo, TodoInput, TodoUpdate};
use crate::AppState;

/// A malformed id is indistinguishable from a missing todo to the caller.
fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Todo not found".into()))
}

/// Creates a todo owned by the authenticated user.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    session: AuthSession,
    body: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let todo = Todo::create(&state.pool, body.into_inner(), session.user.id).await?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Lists the authenticated user's todos. Other users' todos never appear.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let todos = Todo::list_for(&state.pool, session.user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "todos": todos })))
}

#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    let todo = Todo::find_for(&state.pool, id, session.user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

/// Applies an allow-listed update (`text`, `completed`) to an owned todo.
///
/// Completing stamps `completedAt` server-side; clearing or omitting
/// `completed` nulls it. Any client-supplied timestamp is ignored.
#[patch("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
    body: web::Json<TodoUpdate>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let id = parse_todo_id(&path)?;
    let todo = Todo::update_for(&state.pool, id, session.user.id, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

/// Deletes an owned todo and returns the removed entity.
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&path)?;
    let todo = Todo::delete_for(&state.pool, id, session.user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}
