pub mod day_store;
mod dto;
pub mod handlers;
pub mod model;
pub mod month;
pub mod services;

pub use day_store::DayStore;
pub use month::MonthAggregator;
pub use services::RecordService;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
