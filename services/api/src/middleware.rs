//! Authentication middleware for bearer token validation

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

use crate::{error::ApiError, state::AppState};

/// Authentication middleware
///
/// Verifies the bearer token before any handler runs and inserts the
/// resolved `AuthUser` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());

    let user = state.token_service.authenticate(token).map_err(|e| {
        warn!("Rejected request to {}: {}", req.uri().path(), e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
