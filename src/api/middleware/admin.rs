use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::api::errors::ApiError;

/// Header carrying the room's secret code on admin routes
pub const ADMIN_CODE_HEADER: &str = "x-admin-code";

/// Admin code extractor for organizer-only routes
///
/// Only checks that the header is present; the service matches it against
/// the room.
///
/// Usage:
/// ```rust,ignore
/// async fn admin_handler(
///     AdminCode(code): AdminCode,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Got code of length {}", code.len()))
/// }
/// ```
pub struct AdminCode(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AdminCode
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let code = parts
            .headers
            .get(ADMIN_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing X-Admin-Code header"))?;

        Ok(AdminCode(code.to_string()))
    }
}
