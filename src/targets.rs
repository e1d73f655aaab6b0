use axum::{extract::State, routing::get, Json, Router};

use crate::{auth::extractors::Session, config::DailyTargets, error::Envelope, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/get-config", get(get_config))
}

/// GET /get-config — the configured daily nutrition targets.
pub async fn get_config(
    State(state): State<AppState>,
    _session: Session,
) -> Json<Envelope<DailyTargets>> {
    Envelope::ok("", state.config.targets.clone())
}
