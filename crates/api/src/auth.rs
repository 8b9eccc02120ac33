//! Acting-user extraction
//!
//! Session handling lives in front of this service; it forwards the resolved
//! user id in `X-User-Id`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

/// Identity of the user making the request
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing {} header", USER_HEADER)))?;

        value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(ActingUser)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {} header", USER_HEADER)))
    }
}
