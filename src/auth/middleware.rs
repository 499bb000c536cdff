use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{extractors::AuthSession, X_AUTH};
use crate::error::AppError;
use crate::models::User;
use crate::AppState;

/// Validates the `x-auth` header on every request passing through the scopes
/// it wraps, and exposes the resolved user plus the raw token to handlers via
/// request extensions.
///
/// Verification is two-step: the token signature is checked first, then the
/// stored token list is consulted so that logged-out tokens are rejected even
/// though their signature is still valid. The check is read-only.
pub struct AuthGuard;

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGuardService<S> {
    // Rc because the inner service is called after the store lookup awaits.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("Application state not configured".into())
                })?;

            let raw = req
                .headers()
                .get(X_AUTH)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
                .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

            let user = authenticate(&state, &raw).await?;
            req.extensions_mut().insert(AuthSession { user, token: raw });

            service.call(req).await
        })
    }
}

/// Resolves a raw token to its user, or rejects it.
///
/// Every auth-check failure (bad signature, unknown user, token absent from
/// the stored list) collapses into the same `Unauthorized` outcome, so a
/// caller cannot tell a revoked token from a forged one. Database failures
/// are not auth failures and propagate as such.
pub async fn authenticate(state: &AppState, raw: &str) -> Result<User, AppError> {
    let user_id = state
        .issuer
        .verify(raw)
        .map_err(|_| AppError::Unauthorized("Authentication required".into()))?;

    User::find_by_token(&state.pool, user_id, raw)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
}
