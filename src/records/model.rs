use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimator::{default_quantity, whole_rating, NutritionEstimate};

pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One food intake entry. `uuid` and `timestamp` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub uuid: Uuid,
    pub timestamp: i64,
    pub input: String,
    pub calories: f64,
    pub gram_carbs: f64,
    pub gram_proteins: f64,
    pub gram_fats: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "whole_rating")]
    pub star_rating: Option<u8>,
}

impl Record {
    pub fn new(uuid: Uuid, timestamp: i64, input: String, estimate: NutritionEstimate) -> Self {
        Self {
            uuid,
            timestamp,
            input,
            calories: estimate.calories,
            gram_carbs: estimate.gram_carbs,
            gram_proteins: estimate.gram_proteins,
            gram_fats: estimate.gram_fats,
            feedback: estimate.feedback,
            quantity: estimate.quantity,
            star_rating: estimate.star_rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default = "schema_version")]
    pub version: u32,
    pub date: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Day {
    pub fn empty(date: &str) -> Self {
        Self {
            version: SCHEMA_VERSION,
            date: date.to_string(),
            records: Vec::new(),
        }
    }

    /// Returns false and leaves the day untouched if the uuid is taken.
    pub fn push(&mut self, record: Record) -> bool {
        if self.records.iter().any(|r| r.uuid == record.uuid) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn record_mut(&mut self, uuid: Uuid) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.uuid == uuid)
    }

    pub fn remove(&mut self, uuid: Uuid) -> Option<Record> {
        let idx = self.records.iter().position(|r| r.uuid == uuid)?;
        Some(self.records.remove(idx))
    }

    /// Newest first; equal timestamps keep their order.
    pub fn sort_records(&mut self) {
        self.records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    pub fn totals(&self) -> DayTotals {
        let mut t = DayTotals::zero(&self.date);
        for r in &self.records {
            t.calories += r.calories;
            t.carbs += r.gram_carbs;
            t.proteins += r.gram_proteins;
            t.fats += r.gram_fats;
        }
        t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub date: String,
    pub calories: f64,
    pub carbs: f64,
    pub proteins: f64,
    pub fats: f64,
}

impl DayTotals {
    pub fn zero(date: &str) -> Self {
        Self {
            date: date.to_string(),
            calories: 0.0,
            carbs: 0.0,
            proteins: 0.0,
            fats: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Month {
    #[serde(default = "schema_version")]
    pub version: u32,
    #[serde(default)]
    pub days: Vec<DayTotals>,
}

impl Default for Month {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            days: Vec::new(),
        }
    }
}

impl Month {
    /// Replace or insert the entry for `totals.date`, then keep dates ascending.
    pub fn upsert(&mut self, totals: DayTotals) {
        match self.days.iter_mut().find(|d| d.date == totals.date) {
            Some(existing) => *existing = totals,
            None => self.days.push(totals),
        }
        self.days.sort_by(|a, b| a.date.cmp(&b.date));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn record(ts: i64, calories: f64) -> Record {
        Record {
            uuid: Uuid::new_v4(),
            timestamp: ts,
            input: format!("food at {ts}"),
            calories,
            gram_carbs: calories / 10.0,
            gram_proteins: 2.0,
            gram_fats: 1.0,
            feedback: String::new(),
            quantity: 1.0,
            star_rating: None,
        }
    }

    #[test]
    fn push_rejects_duplicate_uuid() {
        let mut day = Day::empty("2024-01-15");
        let r = record(1, 100.0);
        assert!(day.push(r.clone()));
        assert!(!day.push(r));
        assert_eq!(day.records.len(), 1);
    }

    #[test]
    fn remove_and_lookup() {
        let mut day = Day::empty("2024-01-15");
        let a = record(1, 100.0);
        let b = record(2, 200.0);
        day.push(a.clone());
        day.push(b.clone());

        day.record_mut(a.uuid).unwrap().calories = 1.0;
        assert_eq!(day.records[0].calories, 1.0);
        assert_eq!(day.remove(b.uuid), Some(b.clone()));
        assert!(day.remove(b.uuid).is_none());
        assert!(day.record_mut(b.uuid).is_none());
    }

    #[test]
    fn sort_is_newest_first() {
        let mut day = Day::empty("2024-01-15");
        for ts in [5, 9, 1, 7] {
            day.push(record(ts, 10.0));
        }
        day.sort_records();
        let order: Vec<i64> = day.records.iter().map(|r| r.timestamp).collect();
        assert_eq!(order, vec![9, 7, 5, 1]);
    }

    #[test]
    fn totals_are_row_sums() {
        let mut day = Day::empty("2024-01-15");
        day.push(record(1, 100.0));
        day.push(record(2, 250.0));
        let t = day.totals();
        assert_eq!(t.date, "2024-01-15");
        assert_eq!(t.calories, 350.0);
        assert_eq!(t.carbs, 35.0);
        assert_eq!(t.proteins, 4.0);
        assert_eq!(t.fats, 2.0);
        assert_eq!(Day::empty("2024-01-16").totals(), DayTotals::zero("2024-01-16"));
    }

    #[test]
    fn month_upsert_replaces_and_sorts() {
        let mut m = Month::default();
        m.upsert(DayTotals::zero("2024-01-20"));
        m.upsert(DayTotals::zero("2024-01-03"));
        let mut t = DayTotals::zero("2024-01-20");
        t.calories = 42.0;
        m.upsert(t);
        let dates: Vec<&str> = m.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-20"]);
        assert_eq!(m.days[1].calories, 42.0);
    }

    #[test]
    fn files_without_version_still_load() {
        let day: Day = serde_json::from_str(r#"{"date": "2024-01-15", "records": [
            {"uuid": "6f1c0a52-3b8e-4c1e-9d6a-0b0f1d2e3f40", "timestamp": 1705312800, "input": "toast",
             "calories": 80, "gram_carbs": 15, "gram_proteins": 3, "gram_fats": 1, "feedback": "fine"}
        ]}"#)
        .unwrap();
        assert_eq!(day.version, SCHEMA_VERSION);
        assert_eq!(day.records[0].quantity, 1.0);
        assert_eq!(day.records[0].star_rating, None);

        let month: Month = serde_json::from_str(r#"{"days": []}"#).unwrap();
        assert_eq!(month, Month::default());
    }
}
