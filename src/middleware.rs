//! Token verification for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{errors::AppError, state::AppState};

/// Identity of the caller, inserted into request extensions once the token
/// has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub name: String,
}

/// The raw token, with an optional `Bearer ` scheme removed.
pub fn extract_token(header_value: &str) -> &str {
    let value = header_value.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

/// Reject requests without a valid `Authorization` token.
///
/// Missing header → 400, bad or expired token → 401.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(extract_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("authorization token is required"))?;

    let claims = state.tokens.verify(token)?;
    tracing::debug!("Authenticated user {} for {}", claims.uid, request.uri().path());

    request.extensions_mut().insert(AuthenticatedUser {
        id: claims.uid,
        name: claims.sub,
    });

    Ok(next.run(request).await)
}
