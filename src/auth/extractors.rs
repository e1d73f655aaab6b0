use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::services::is_authenticated;
use crate::{error::AppError, state::AppState};

/// Guard for routes that need a valid session cookie.
pub struct Session;

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if !is_authenticated(&state.config.auth, &jar) {
            warn!(uri = %parts.uri, "rejected unauthenticated request");
            return Err(AppError::Unauthorized("Not authenticated".into()));
        }
        Ok(Session)
    }
}
