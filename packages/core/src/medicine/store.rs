//! Persistence interface consumed by the medicine service
//!
//! Provides an abstraction over the backing database so the scheduling and
//! ledger logic never depends on a concrete driver.

use async_trait::async_trait;

use super::error::StoreError;
use super::types::{Medicine, NewMedicine};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Medicine persistence.
#[async_trait]
pub trait MedicineStore {
    /// Persist a new medicine and return it with its assigned id.
    async fn insert_medicine(&self, medicine: &NewMedicine) -> StoreResult<Medicine>;

    /// Find a medicine by id, restricted to its owner.
    async fn find_medicine(&self, user_id: i64, medicine_id: i64) -> StoreResult<Option<Medicine>>;

    /// Find a medicine by id regardless of owner.
    async fn find_medicine_by_id(&self, medicine_id: i64) -> StoreResult<Option<Medicine>>;

    /// Replace a medicine's completion record.
    /// Returns `false` when no row matched `medicine_id`.
    async fn update_completion_record(
        &self,
        medicine_id: i64,
        completion_record: &[bool],
    ) -> StoreResult<bool>;

    /// All medicines owned by `user_id`, oldest first.
    async fn list_medicines_for_user(&self, user_id: i64) -> StoreResult<Vec<Medicine>>;

    /// Owners of every medicine named exactly `name`, in insertion order.
    async fn list_user_ids_by_medicine_name(&self, name: &str) -> StoreResult<Vec<i64>>;
}
