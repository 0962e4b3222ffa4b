//! Session Middleware
//!
//! Resolves the opaque bearer token to an `Identity` once per request
//! and threads it through as a request extension. Protected routes
//! reject callers without a live session.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::shared::error::AppError;
use crate::startup::AppState;

/// Pull the opaque session token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Session middleware for protected routes.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("This route is protected. Please login".into()))?;

    let identity = state
        .sessions
        .resolve(token)
        .ok_or_else(|| AppError::Unauthorized("No active session. Please login".into()))?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
