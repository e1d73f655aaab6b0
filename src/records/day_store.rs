use std::path::PathBuf;

use tracing::debug;

use super::model::Day;
use crate::storage;

/// One `day_<date>.json` file per calendar date.
#[derive(Debug, Clone)]
pub struct DayStore {
    dir: PathBuf,
}

impl DayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, date: &str) -> PathBuf {
        self.dir.join(format!("day_{date}.json"))
    }

    /// The stored day, or `None` if nothing was ever written for `date`.
    pub async fn find(&self, date: &str) -> anyhow::Result<Option<Day>> {
        storage::read_json(&self.path(date)).await
    }

    /// The stored day, or an empty one that is not persisted.
    pub async fn load(&self, date: &str) -> anyhow::Result<Day> {
        Ok(self.find(date).await?.unwrap_or_else(|| Day::empty(date)))
    }

    /// Overwrite the day file. Records are re-sorted newest first before writing.
    pub async fn save(&self, day: &mut Day) -> anyhow::Result<()> {
        day.sort_records();
        storage::write_json(&self.path(&day.date), day).await?;
        debug!(date = %day.date, records = day.records.len(), "day saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::model::tests::record;

    #[tokio::test]
    async fn load_of_unknown_date_is_empty_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = DayStore::new(dir.path());

        let day = store.load("2024-01-15").await.unwrap();
        assert_eq!(day, Day::empty("2024-01-15"));
        assert!(store.find("2024-01-15").await.unwrap().is_none());
        assert!(!store.path("2024-01-15").exists());
    }

    #[tokio::test]
    async fn save_sorts_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = DayStore::new(dir.path());
        let mut day = Day::empty("2024-01-15");
        day.push(record(10, 100.0));
        day.push(record(30, 300.0));
        day.push(record(20, 200.0));

        store.save(&mut day).await.unwrap();

        let back = store.load("2024-01-15").await.unwrap();
        let order: Vec<i64> = back.records.iter().map(|r| r.timestamp).collect();
        assert_eq!(order, vec![30, 20, 10]);
        assert_eq!(back, day);
        assert!(dir.path().join("day_2024-01-15.json").exists());
    }

    #[tokio::test]
    async fn empty_day_persists_as_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = DayStore::new(dir.path());
        let mut day = Day::empty("2024-01-15");
        store.save(&mut day).await.unwrap();

        let raw = std::fs::read_to_string(store.path("2024-01-15")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["records"], serde_json::json!([]));
        assert_eq!(store.find("2024-01-15").await.unwrap(), Some(day));
    }
}
