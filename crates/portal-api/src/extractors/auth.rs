//! `CurrentUser` extractor: resolves the caller named by the identity
//! header into a request context.
//!
//! Authentication happens upstream; the portal trusts the header and only
//! checks that the user exists.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use portal_core::error::AppError;
use portal_core::types::UserId;
use portal_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller, available in handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestContext);

impl std::ops::Deref for CurrentUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing x-user-id header"))?;

        let user_id: UserId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::authentication("Invalid x-user-id header"))?;

        // The transaction must be gone before the handler opens its own.
        let user = {
            let mut tx = state.store.begin().await?;
            tx.find_user(user_id).await?
        };
        let user = user.ok_or_else(|| AppError::authentication("Unknown user"))?;

        Ok(CurrentUser(RequestContext::new(user.id, user.username)))
    }
}
