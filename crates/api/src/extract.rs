//! Request extractors.
//!
//! Authentication and identity mapping live upstream; the gateway injects
//! the caller's opaque key in the `x-owner-key` header. [`CallerOwner`]
//! resolves that key to an `owners` row, bootstrapping one on first
//! contact.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stride_db::models::owner::Owner;
use stride_db::repositories::OwnerRepo;

use crate::state::AppState;

/// Header carrying the opaque identity key set by the upstream gateway.
pub const OWNER_KEY_HEADER: &str = "x-owner-key";

/// The resolved owner behind the current request.
pub struct CallerOwner(pub Owner);

impl FromRequestParts<AppState> for CallerOwner {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(OWNER_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "MISSING_OWNER_KEY"))?
            .to_string();

        let owner = OwnerRepo::ensure(&state.pool, &key).await.map_err(|e| {
            tracing::error!(error = %e, "Owner bootstrap failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        })?;

        Ok(CallerOwner(owner))
    }
}

fn reject(status: StatusCode, code: &str) -> Response {
    let body = json!({ "error": code, "code": code });
    (status, axum::Json(body)).into_response()
}
