use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Verified caller identity, populated from the `x-user-id` header.
///
/// Token verification itself lives in front of this service; whatever sits
/// there (gateway, middleware) is expected to strip the header from inbound
/// traffic and set it from the verified token subject.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|uid| !uid.is_empty())
            .map(|uid| Identity(uid.to_string()))
            .ok_or(AppError::Unauthenticated)
    }
}
