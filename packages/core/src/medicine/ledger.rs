//! Adherence ledger.
//!
//! Maps calendar days onto indices of a medicine's completion record.
//! Both the start date and the target are reduced to calendar days in the
//! service's configured offset before differencing, so time-of-day never
//! shifts an index.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use super::error::MedicineError;
use super::types::Medicine;

/// Calendar-day difference `target - start`. Negative when `target` is
/// earlier.
pub fn whole_days_between(target: NaiveDate, start: NaiveDate) -> i64 {
    (target - start).num_days()
}

/// Calendar day of `instant` as seen from `offset`.
pub fn calendar_day<Tz: TimeZone>(instant: &DateTime<Tz>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}

/// Parse a target date given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp. Timestamps are reduced to their calendar day in `offset`.
pub fn parse_target_day(raw: &str, offset: &FixedOffset) -> Result<NaiveDate, MedicineError> {
    let raw = raw.trim();

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|instant| calendar_day(&instant, offset))
        .map_err(|_| MedicineError::invalid_date(format!("'{}' is not a recognised date", raw)))
}

/// Index into a record of `len` days for `target`, or `InvalidDate` when
/// the day falls outside the regimen.
pub fn completion_index(
    start: NaiveDate,
    target: NaiveDate,
    len: usize,
) -> Result<usize, MedicineError> {
    let index = whole_days_between(target, start);

    if index < 0 || index >= len as i64 {
        return Err(MedicineError::invalid_date(format!(
            "{} is outside the regimen starting {} ({} days)",
            target, start, len
        )));
    }

    Ok(index as usize)
}

/// Return a copy of `medicine` with the flag for `target` set to `value`.
///
/// Only the targeted index differs from the input. The input is left
/// untouched on error.
pub fn mark_completion(
    medicine: &Medicine,
    target: NaiveDate,
    value: bool,
    offset: &FixedOffset,
) -> Result<Medicine, MedicineError> {
    let start = calendar_day(&medicine.start_date, offset);
    let index = completion_index(start, target, medicine.completion_record.len())?;

    let mut updated = medicine.clone();
    updated.completion_record[index] = value;
    Ok(updated)
}
