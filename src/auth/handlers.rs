use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::AuthenticateRequest,
        services::{is_authenticated, session_cookie, verify_code},
    },
    error::{AppError, Envelope},
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/authenticate", post(authenticate))
        .route("/check-auth", get(check_auth))
}

#[instrument(skip(state, jar, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<AuthenticateRequest>,
) -> Result<(CookieJar, Json<Envelope<()>>), AppError> {
    let code = payload
        .code
        .ok_or_else(|| AppError::Validation("Missing code".into()))?;

    if !verify_code(&state.config.auth, &code) {
        warn!("invalid access code");
        return Err(AppError::Unauthorized("Invalid code".into()));
    }

    info!("session opened");
    Ok((
        jar.add(session_cookie(&state.config.auth)),
        Envelope::done("Authentication successful"),
    ))
}

#[instrument(skip(state, jar))]
pub async fn check_auth(State(state): State<AppState>, jar: CookieJar) -> Json<Envelope<()>> {
    if is_authenticated(&state.config.auth, &jar) {
        Envelope::status(true, "Authenticated")
    } else {
        Envelope::status(false, "Not authenticated")
    }
}
