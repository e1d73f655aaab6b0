use std::path::PathBuf;

use tracing::debug;

use super::model::{Day, DayTotals, Month};
use crate::{storage, validate::month_of};

/// Maintains `month_<YYYY-MM>.json`, the per-day totals derived from day files.
#[derive(Debug, Clone)]
pub struct MonthAggregator {
    dir: PathBuf,
}

impl MonthAggregator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, month: &str) -> PathBuf {
        self.dir.join(format!("month_{month}.json"))
    }

    pub async fn load(&self, month: &str) -> anyhow::Result<Month> {
        Ok(storage::read_json(&self.path(month)).await?.unwrap_or_default())
    }

    /// Recompute `date`'s totals from `day` and rewrite the month file.
    /// A day with no records keeps a zeroed entry.
    pub async fn recompute(&self, date: &str, day: &Day) -> anyhow::Result<DayTotals> {
        let month = month_of(date);
        let mut roll_up = self.load(month).await?;

        let mut totals = day.totals();
        totals.date = date.to_string();
        roll_up.upsert(totals.clone());

        storage::write_json(&self.path(month), &roll_up).await?;
        debug!(%date, calories = totals.calories, "month totals recomputed");
        Ok(totals)
    }
}
