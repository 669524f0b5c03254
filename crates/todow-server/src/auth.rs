//! HTTP Basic authentication

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;
use crate::AppState;

/// Reject any request whose Basic credentials do not match the configured
/// pair
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic)
        .is_some_and(|(user, pass)| state.credentials.matches(&user, &pass));

    if !authorized {
        tracing::debug!("rejected unauthenticated {} {}", request.method(), request.uri());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Decode an `Authorization: Basic ...` header value into username and
/// password
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
