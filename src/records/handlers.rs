use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateRecordRequest, DateQuery, MonthQuery, RecordPatch, RecordQuery},
    model::{Day, DayTotals, Record},
};
use crate::{
    auth::extractors::Session,
    error::{AppError, Envelope},
    extract::{JsonBody, QueryParams},
    state::AppState,
    validate,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/date", get(get_date))
        .route("/month", get(get_month))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/record-create", post(create_record))
        .route("/record-update", post(update_record))
        .route("/record-delete", post(delete_record))
}

fn required(value: Option<String>, missing: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(missing.into()))
}

/// GET /date?date=YYYY-MM-DD — empty record list when nothing is stored.
#[instrument(skip(state, _session))]
pub async fn get_date(
    State(state): State<AppState>,
    _session: Session,
    QueryParams(q): QueryParams<DateQuery>,
) -> Result<Json<Envelope<Day>>, AppError> {
    let date = validate::date(&required(q.date, "Missing date")?)?;
    let day = state.records.days().load(&date).await?;
    Ok(Envelope::ok("", day))
}

/// GET /month?month=YYYY-MM
#[instrument(skip(state, _session))]
pub async fn get_month(
    State(state): State<AppState>,
    _session: Session,
    QueryParams(q): QueryParams<MonthQuery>,
) -> Result<Json<Envelope<Vec<DayTotals>>>, AppError> {
    let month = validate::month(&required(q.month, "Missing month")?)?;
    let roll_up = state.records.months().load(&month).await?;
    Ok(Envelope::ok("", roll_up.days))
}

#[instrument(skip(state, _session, body))]
pub async fn create_record(
    State(state): State<AppState>,
    _session: Session,
    JsonBody(body): JsonBody<CreateRecordRequest>,
) -> Result<Json<Envelope<Record>>, AppError> {
    let record = state
        .records
        .create(body.input.as_deref(), body.date.as_deref())
        .await?;
    Ok(Envelope::ok("Record created successfully", record))
}

#[instrument(skip(state, _session, patch))]
pub async fn update_record(
    State(state): State<AppState>,
    _session: Session,
    QueryParams(q): QueryParams<RecordQuery>,
    JsonBody(patch): JsonBody<RecordPatch>,
) -> Result<Json<Envelope<Record>>, AppError> {
    let (date, uuid) = date_and_uuid(q)?;
    let record = state.records.update(&date, &uuid, patch).await?;
    Ok(Envelope::ok("Record updated successfully", record))
}

#[instrument(skip(state, _session))]
pub async fn delete_record(
    State(state): State<AppState>,
    _session: Session,
    QueryParams(q): QueryParams<RecordQuery>,
) -> Result<Json<Envelope<()>>, AppError> {
    let (date, uuid) = date_and_uuid(q)?;
    state.records.delete(&date, &uuid).await?;
    Ok(Envelope::done("Record deleted successfully"))
}

fn date_and_uuid(q: RecordQuery) -> Result<(String, String), AppError> {
    match (q.date, q.uuid) {
        (Some(date), Some(uuid)) => Ok((date, uuid)),
        _ => Err(AppError::Validation("Missing date or UUID".into())),
    }
}
