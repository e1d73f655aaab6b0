use serde::{Deserialize, Deserializer};

use super::model::Record;
use crate::{error::AppError, estimator::whole_rating, validate::normalize_input};

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub input: Option<String>,
    pub date: Option<String>, // defaults to today (UTC)
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub date: Option<String>,
    pub uuid: Option<String>,
}

/// Partial update of a record. `uuid` and `timestamp` are not patchable and
/// are ignored if sent. `"star_rating": null` clears the rating.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPatch {
    pub input: Option<String>,
    pub calories: Option<f64>,
    pub gram_carbs: Option<f64>,
    pub gram_proteins: Option<f64>,
    pub gram_fats: Option<f64>,
    pub feedback: Option<String>,
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "clearable_rating")]
    pub star_rating: Option<Option<u8>>,
}

// Present-but-null is `Some(None)`; an absent field stays `None` via `default`.
fn clearable_rating<'de, D>(de: D) -> Result<Option<Option<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    whole_rating(de).map(Some)
}

impl RecordPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        let numbers = [
            ("calories", self.calories),
            ("gram_carbs", self.gram_carbs),
            ("gram_proteins", self.gram_proteins),
            ("gram_fats", self.gram_fats),
            ("quantity", self.quantity),
        ];
        for (name, value) in numbers {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::Validation(format!("{name} must be a number >= 0")));
                }
            }
        }
        if let Some(Some(r)) = self.star_rating {
            if !(1..=5).contains(&r) {
                return Err(AppError::Validation("star_rating must be between 1 and 5".into()));
            }
        }
        if let Some(input) = &self.input {
            if normalize_input(input).is_empty() {
                return Err(AppError::Validation("input must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Copy the present fields onto `record`. Nutrition values are taken as given.
    pub fn apply(self, record: &mut Record) {
        if let Some(input) = self.input {
            record.input = normalize_input(&input);
        }
        if let Some(v) = self.calories {
            record.calories = v;
        }
        if let Some(v) = self.gram_carbs {
            record.gram_carbs = v;
        }
        if let Some(v) = self.gram_proteins {
            record.gram_proteins = v;
        }
        if let Some(v) = self.gram_fats {
            record.gram_fats = v;
        }
        if let Some(v) = self.feedback {
            record.feedback = v;
        }
        if let Some(v) = self.quantity {
            record.quantity = v;
        }
        if let Some(v) = self.star_rating {
            record.star_rating = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::model::tests::record;

    #[test]
    fn patch_touches_only_present_fields() {
        let original = record(1_705_312_800, 300.0);
        let mut patched = original.clone();
        let patch: RecordPatch = serde_json::from_str(r#"{"calories": 500}"#).unwrap();
        patch.validate().unwrap();
        patch.apply(&mut patched);

        assert_eq!(patched.calories, 500.0);
        let mut expected = original;
        expected.calories = 500.0;
        assert_eq!(patched, expected);
    }

    #[test]
    fn patch_ignores_identity_fields_and_normalizes_input() {
        let original = record(10, 300.0);
        let mut patched = original.clone();
        let patch: RecordPatch = serde_json::from_str(
            r#"{"uuid": "00000000-0000-0000-0000-000000000000", "timestamp": 1, "input": "  Big SALAD "}"#,
        )
        .unwrap();
        patch.apply(&mut patched);
        assert_eq!(patched.uuid, original.uuid);
        assert_eq!(patched.timestamp, original.timestamp);
        assert_eq!(patched.input, "big salad");
    }

    #[test]
    fn patch_can_set_or_clear_the_rating() {
        let mut rec = record(10, 300.0);
        rec.star_rating = Some(2);

        let patch: RecordPatch = serde_json::from_str(r#"{"star_rating": 5.0}"#).unwrap();
        patch.validate().unwrap();
        patch.apply(&mut rec);
        assert_eq!(rec.star_rating, Some(5));

        let patch: RecordPatch = serde_json::from_str(r#"{"calories": 10}"#).unwrap();
        patch.apply(&mut rec);
        assert_eq!(rec.star_rating, Some(5));

        let patch: RecordPatch = serde_json::from_str(r#"{"star_rating": null}"#).unwrap();
        patch.validate().unwrap();
        patch.apply(&mut rec);
        assert_eq!(rec.star_rating, None);
    }

    #[test]
    fn patch_validation() {
        let bad: RecordPatch = serde_json::from_str(r#"{"gram_fats": -1}"#).unwrap();
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
        let bad: RecordPatch = serde_json::from_str(r#"{"star_rating": 0}"#).unwrap();
        assert!(bad.validate().is_err());
        let bad: RecordPatch = serde_json::from_str(r#"{"input": "   "}"#).unwrap();
        assert!(bad.validate().is_err());
        assert!(RecordPatch::default().validate().is_ok());
    }
}
