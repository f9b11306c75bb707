use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a valid admin token and exposes the decoded
/// `AdminClaims` to handlers through the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = bearer_token(req.headers())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        state.auth.tokens().verify(token).map_err(|e| {
            tracing::debug!("Rejected admin token: {}", e);
            AppError::from(e)
        })?
    };

    tracing::debug!(admin = %claims.username, "Authenticated admin request");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Like `auth_middleware`, but lets safe methods (GET, HEAD, ...) through.
pub async fn require_admin_for_writes(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method().is_safe() {
        return Ok(next.run(req).await);
    }
    auth_middleware(state, req, next).await
}
