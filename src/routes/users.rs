use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::{AuthSession, Credentials, X_AUTH};
use crate::error::AppError;
use crate::models::{NewUser, PublicUser, User};
use crate::AppState;

/// Sign up a new user.
///
/// Creates the account, mints a session token, persists it to the user's
/// token list, and echoes it in the `x-auth` response header. A duplicate
/// email fails with 400 and a `duplicate_key` code.
#[post("")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let draft = NewUser {
        email: body.email.clone(),
        password: body.password.clone(),
    };
    let user = User::create(&state.pool, draft.finalize_for_storage()?).await?;

    let token = state.issuer.issue(user.id)?;
    User::add_token(&state.pool, user.id, &token).await?;

    Ok(HttpResponse::Ok()
        .insert_header((X_AUTH, token))
        .json(PublicUser::from(&user)))
}

/// Log in with email and password.
///
/// Each successful login mints an additional token; sessions on other
/// devices stay valid. Invalid credentials fail with an opaque 404.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = User::find_by_credentials(&state.pool, &body.email, &body.password).await?;

    let token = state.issuer.issue(user.id)?;
    User::add_token(&state.pool, user.id, &token).await?;

    Ok(HttpResponse::Ok()
        .insert_header((X_AUTH, token))
        .json(PublicUser::from(&user)))
}

/// The authenticated user's own profile.
#[get("")]
pub async fn me(session: AuthSession) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(PublicUser::from(&session.user)))
}

/// Log out the current session.
///
/// Removes exactly the token this request was authenticated with; other
/// sessions are untouched. Removing an already-absent token still succeeds.
#[delete("/token")]
pub async fn logout(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    User::remove_token(&state.pool, session.user.id, &session.token)
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not discard token: {}", e)))?;

    Ok(HttpResponse::Ok().finish())
}
