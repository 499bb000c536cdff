//! The `todoforge` library crate.
//!
//! Contains the domain models, authentication mechanisms, routing
//! configuration, and error handling for the todo backend. The main binary
//! (`main.rs`) uses it to construct and run the application.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use sqlx::PgPool;

use crate::auth::TokenIssuer;

/// Shared per-process context handed to handlers and the auth guard.
///
/// The database pool and the token signing secret are injected here once at
/// startup; nothing reads them from ambient process state afterwards.
pub struct AppState {
    pub pool: PgPool,
    pub issuer: TokenIssuer,
}
