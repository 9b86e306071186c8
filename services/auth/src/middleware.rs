//! Middleware for bearer token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{AppState, routes::AuthError};

/// Verify the bearer token and expose the caller as an `AuthUser` extension
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());

    let user = state.token_service.authenticate(token).map_err(|e| {
        warn!("Rejected request to {}: {}", req.uri().path(), e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
