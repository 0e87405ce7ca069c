// Auth stub: the Authorization header is not verified; every caller is the configured user.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::convert::Infallible;

use super::AppState;

/// Id of the user a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthUser(pub(crate) String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let has_token = parts.headers.contains_key(header::AUTHORIZATION);
        tracing::trace!(has_token, "auth stub: using default user");
        Ok(AuthUser(state.config.auth.default_user_id.clone()))
    }
}
