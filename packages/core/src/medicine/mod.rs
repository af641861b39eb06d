//! Medicine scheduling and adherence tracking
//!
//! The schedule engine picks a regimen's start day and sizes its completion
//! record; the adherence ledger maps calendar days onto that record. The
//! service wires both to a [`MedicineStore`].

pub mod error;
pub mod ledger;
pub mod schedule;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{MedicineError, StoreError};
pub use schedule::{allocate_completion_record, compute_start_date, ScheduledTime, StartDay};
pub use service::{MedicineService, SharedMedicineStore};
pub use store::MedicineStore;
pub use types::*;
