use std::{collections::HashMap, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    day_store::DayStore,
    dto::RecordPatch,
    model::{Day, Record},
    month::MonthAggregator,
};
use crate::{
    error::AppError,
    estimator::NutritionEstimator,
    validate::{self, month_of, normalize_input},
};

/// One async mutex per month. Day and month files of the same month are only
/// rewritten while holding it.
#[derive(Default)]
pub struct MonthLocks {
    inner: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MonthLocks {
    pub async fn lock(&self, month: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(month.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }
}

/// Create / update / delete of single records, keeping day and month files in step.
pub struct RecordService {
    days: DayStore,
    months: MonthAggregator,
    estimator: Arc<NutritionEstimator>,
    locks: MonthLocks,
}

impl RecordService {
    pub fn new(days: DayStore, months: MonthAggregator, estimator: Arc<NutritionEstimator>) -> Self {
        Self {
            days,
            months,
            estimator,
            locks: MonthLocks::default(),
        }
    }

    pub fn days(&self) -> &DayStore {
        &self.days
    }

    pub fn months(&self) -> &MonthAggregator {
        &self.months
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: Option<&str>, date: Option<&str>) -> Result<Record, AppError> {
        let input = input.ok_or_else(|| AppError::Validation("Missing input".into()))?;
        let date = match date {
            Some(d) => validate::date(d)?,
            None => validate::today(),
        };
        let input = normalize_input(input);
        if input.is_empty() {
            return Err(AppError::Validation("Missing input".into()));
        }

        // estimate outside the lock; it may take a while
        let estimate = self.estimator.estimate(&input).await?;

        let _guard = self.locks.lock(month_of(&date)).await;
        let mut day = self.days.load(&date).await?;
        let mut record = Record::new(Uuid::new_v4(), now(), input, estimate);
        while !day.push(record.clone()) {
            record.uuid = Uuid::new_v4();
        }
        self.persist(&date, &mut day).await?;

        info!(%date, uuid = %record.uuid, calories = record.calories, "record created");
        Ok(record)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, date: &str, uuid: &str, patch: RecordPatch) -> Result<Record, AppError> {
        let date = validate::date(date)?;
        patch.validate()?;
        let uuid = parse_uuid(uuid)?;

        let _guard = self.locks.lock(month_of(&date)).await;
        let mut day = self.find_day(&date).await?;
        let record = day.record_mut(uuid).ok_or_else(record_not_found)?;
        patch.apply(record);
        let updated = record.clone();
        self.persist(&date, &mut day).await?;

        info!(%date, %uuid, "record updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, date: &str, uuid: &str) -> Result<(), AppError> {
        let date = validate::date(date)?;
        let uuid = parse_uuid(uuid)?;

        let _guard = self.locks.lock(month_of(&date)).await;
        let mut day = self.find_day(&date).await?;
        day.remove(uuid).ok_or_else(record_not_found)?;
        self.persist(&date, &mut day).await?;

        info!(%date, %uuid, "record deleted");
        Ok(())
    }

    async fn find_day(&self, date: &str) -> Result<Day, AppError> {
        self.days.find(date).await?.ok_or_else(|| {
            warn!(%date, "no data for date");
            AppError::NotFound("No data found for this date".into())
        })
    }

    async fn persist(&self, date: &str, day: &mut Day) -> Result<(), AppError> {
        self.days.save(day).await?;
        self.months.recompute(date, day).await?;
        Ok(())
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn record_not_found() -> AppError {
    AppError::NotFound("Record not found".into())
}

// A malformed id can't match any stored record.
fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| record_not_found())
}
