use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::api::errors::ApiError;

/// Optional image identifier taken from the `iid` path segment.
///
/// Routes are registered both with and without the segment, so an absent
/// parameter is `None`. A present segment must be all digits and fit an i64;
/// anything else behaves like an unmatched route and rejects with 404.
pub(crate) struct MaybeImageId(pub(crate) Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeImageId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to read path parameters"))?;

        match params.get("iid") {
            None => Ok(Self(None)),
            Some(raw) => match parse_image_id(raw) {
                Some(iid) => Ok(Self(Some(iid))),
                None => Err(ApiError::NotFound("Not found".to_string())),
            },
        }
    }
}

fn parse_image_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
