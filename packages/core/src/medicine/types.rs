//! Medicine records and the shapes derived from them

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Number of days tracked per week of a regimen.
pub const DAYS_PER_WEEK: i64 = 7;

/// A stored medicine regimen owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub dosage_type: String,
    pub dosage_amount: String,
    pub duration_weeks: i64,
    /// Daily dosing time, `HH:MM`.
    pub scheduled_time: String,
    /// Set once at creation. Index 0 of `completion_record` is this calendar day.
    pub start_date: DateTime<FixedOffset>,
    /// One flag per day, `duration_weeks * 7` long for the whole lifetime.
    pub completion_record: Vec<bool>,
}

/// A medicine that has been validated and scheduled but not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicine {
    pub user_id: i64,
    pub name: String,
    pub dosage_type: String,
    pub dosage_amount: String,
    pub duration_weeks: i64,
    pub scheduled_time: String,
    pub start_date: DateTime<FixedOffset>,
    pub completion_record: Vec<bool>,
}

impl NewMedicine {
    pub fn into_medicine(self, id: i64) -> Medicine {
        Medicine {
            id,
            user_id: self.user_id,
            name: self.name,
            dosage_type: self.dosage_type,
            dosage_amount: self.dosage_amount,
            duration_weeks: self.duration_weeks,
            scheduled_time: self.scheduled_time,
            start_date: self.start_date,
            completion_record: self.completion_record,
        }
    }
}

/// Caller-supplied fields for a new regimen.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMedicineParams {
    pub user_id: i64,
    pub name: String,
    pub dosage_type: String,
    pub dosage_amount: String,
    pub duration_weeks: i64,
    /// `HH:MM` or `HH:MM:SS`; seconds are dropped.
    pub scheduled_time: String,
}

/// Display-safe projection of a medicine. Carries no adherence data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSummary {
    pub id: i64,
    pub name: String,
    pub dosage_type: String,
    pub dosage_amount: String,
    pub scheduled_time: String,
}

impl From<&Medicine> for MedicineSummary {
    fn from(medicine: &Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name.clone(),
            dosage_type: medicine.dosage_type.clone(),
            dosage_amount: medicine.dosage_amount.clone(),
            scheduled_time: medicine.scheduled_time.clone(),
        }
    }
}
