//! User identity middleware
//!
//! The gateway in front of this service authenticates users and forwards
//! the resulting identity as an opaque UUID header. This middleware only
//! plumbs that identity into request extensions.

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Header carrying the acting user's identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Acting user stored in request extensions
#[derive(Clone, Copy, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Identity middleware - extracts the user id from the X-User-Id header
pub async fn identity_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

    let user_id = Uuid::parse_str(raw)
        .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
