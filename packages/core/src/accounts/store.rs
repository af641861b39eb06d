use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{NewPendingUser, NewUser, PendingUser, User};
use crate::medicine::store::StoreResult;

/// Account persistence.
#[async_trait]
pub trait AccountStore {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Append `medicine_id` to the user's medicine list.
    /// Returns `false` when the user or the medicine does not exist.
    async fn push_user_medicine(&self, user_id: i64, medicine_id: i64) -> StoreResult<bool>;

    /// Store a pending signup, replacing any earlier one for the same email.
    async fn upsert_pending_user(&self, pending: &NewPendingUser) -> StoreResult<PendingUser>;

    async fn find_pending_user(&self, pending_id: i64) -> StoreResult<Option<PendingUser>>;

    async fn delete_pending_user(&self, pending_id: i64) -> StoreResult<bool>;

    /// Delete pending signups created before `cutoff`. Returns the count removed.
    async fn prune_pending_users(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}
