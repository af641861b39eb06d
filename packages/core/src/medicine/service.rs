//! Medicine service.
//!
//! Composes the schedule engine and the adherence ledger over an injected
//! [`MedicineStore`]. Every operation returns an explicit
//! `Result<_, MedicineError>`; persistence failures surface immediately as
//! `MedicineError::Internal` without retries.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use super::error::MedicineError;
use super::ledger;
use super::schedule::{allocate_completion_record, compute_start_date, ScheduledTime};
use super::store::MedicineStore;
use super::types::{CreateMedicineParams, Medicine, MedicineSummary, NewMedicine};

/// Shared handle to a medicine store.
pub type SharedMedicineStore = Arc<dyn MedicineStore + Send + Sync>;

#[derive(Clone)]
pub struct MedicineService {
    store: SharedMedicineStore,
    offset: FixedOffset,
}

impl MedicineService {
    /// `offset` is the wall clock used for scheduling and for reducing
    /// dates to calendar days.
    pub fn new(store: SharedMedicineStore, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// The current instant on the service's wall clock.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Schedule and persist a new regimen starting from the current time.
    pub async fn create_medicine(
        &self,
        params: CreateMedicineParams,
    ) -> Result<Medicine, MedicineError> {
        let now = self.now();
        self.create_medicine_at(params, now).await
    }

    /// Schedule and persist a new regimen as if created at `now`.
    pub async fn create_medicine_at(
        &self,
        params: CreateMedicineParams,
        now: DateTime<FixedOffset>,
    ) -> Result<Medicine, MedicineError> {
        let scheduled: ScheduledTime = params.scheduled_time.parse()?;
        let completion_record = allocate_completion_record(params.duration_weeks)?;
        let start_date = compute_start_date(&now, scheduled);

        let new_medicine = NewMedicine {
            user_id: params.user_id,
            name: params.name,
            dosage_type: params.dosage_type,
            dosage_amount: params.dosage_amount,
            duration_weeks: params.duration_weeks,
            scheduled_time: scheduled.to_string(),
            start_date,
            completion_record,
        };

        let medicine = self.store.insert_medicine(&new_medicine).await.map_err(|err| {
            tracing::error!("Medicine creation failed for user {}: {}", new_medicine.user_id, err);
            MedicineError::from(err)
        })?;

        tracing::info!(
            medicine_id = medicine.id,
            user_id = medicine.user_id,
            start_date = %medicine.start_date,
            days = medicine.completion_record.len(),
            "Medicine created"
        );

        Ok(medicine)
    }

    /// Set the completion flag for `target` on one of `user_id`'s medicines.
    pub async fn mark_completion(
        &self,
        user_id: i64,
        medicine_id: i64,
        target: NaiveDate,
        value: bool,
    ) -> Result<Medicine, MedicineError> {
        let medicine = self
            .store
            .find_medicine(user_id, medicine_id)
            .await?
            .ok_or_else(|| {
                MedicineError::not_found(format!(
                    "no medicine {} for user {}",
                    medicine_id, user_id
                ))
            })?;

        let updated = ledger::mark_completion(&medicine, target, value, &self.offset)?;

        let found = self
            .store
            .update_completion_record(medicine_id, &updated.completion_record)
            .await
            .map_err(|err| {
                tracing::error!("Failed to save completion for medicine {}: {}", medicine_id, err);
                MedicineError::from(err)
            })?;

        if !found {
            return Err(MedicineError::not_found(format!(
                "medicine {} disappeared during update",
                medicine_id
            )));
        }

        tracing::debug!(medicine_id, %target, value, "Completion updated");
        Ok(updated)
    }

    /// Like [`mark_completion`](Self::mark_completion) with the target given
    /// as `YYYY-MM-DD` or RFC 3339.
    pub async fn mark_completion_on(
        &self,
        user_id: i64,
        medicine_id: i64,
        raw_target: &str,
        value: bool,
    ) -> Result<Medicine, MedicineError> {
        let target = ledger::parse_target_day(raw_target, &self.offset)?;
        self.mark_completion(user_id, medicine_id, target, value).await
    }

    pub async fn find_medicine(&self, medicine_id: i64) -> Result<Medicine, MedicineError> {
        self.store
            .find_medicine_by_id(medicine_id)
            .await?
            .ok_or_else(|| MedicineError::not_found(format!("no medicine {}", medicine_id)))
    }

    pub async fn list_medicines_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<MedicineSummary>, MedicineError> {
        let medicines = self.store.list_medicines_for_user(user_id).await?;
        Ok(medicines.iter().map(MedicineSummary::from).collect())
    }

    pub async fn list_medicine_names_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<String>, MedicineError> {
        let medicines = self.store.list_medicines_for_user(user_id).await?;
        Ok(medicines.into_iter().map(|m| m.name).collect())
    }

    pub async fn list_users_by_medicine_name(
        &self,
        name: &str,
    ) -> Result<Vec<i64>, MedicineError> {
        Ok(self.store.list_user_ids_by_medicine_name(name).await?)
    }
}
