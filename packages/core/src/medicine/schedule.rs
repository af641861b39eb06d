//! Schedule engine.
//!
//! Decides whether a new regimen starts on the creation day or the day
//! after, and allocates the per-day completion record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Timelike};

use super::error::MedicineError;
use super::types::DAYS_PER_WEEK;

/// Seconds of request latency absorbed when the scheduled minute is the
/// current minute.
pub const START_GRACE_SECONDS: u32 = 15;

/// Longest regimen accepted, in weeks.
pub const MAX_DURATION_WEEKS: i64 = 520;

/// A daily dosing time parsed from `HH:MM` (or `HH:MM:SS`, seconds dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTime {
    pub hour: u32,
    pub minute: u32,
}

impl FromStr for ScheduledTime {
    type Err = MedicineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(MedicineError::invalid_schedule_format(format!(
                "expected HH:MM, got '{}'",
                s
            )));
        }

        // One or two ASCII digits; signs and blanks are rejected.
        let parse = |part: &str, label: &str| {
            let part = part.trim();
            let digits_only =
                !part.is_empty() && part.len() <= 2 && part.bytes().all(|b| b.is_ascii_digit());
            part.parse::<u32>()
                .ok()
                .filter(|_| digits_only)
                .ok_or_else(|| {
                    MedicineError::invalid_schedule_format(format!(
                        "{} component '{}' is not an integer",
                        label, part
                    ))
                })
        };

        let hour = parse(parts[0], "hour")?;
        let minute = parse(parts[1], "minute")?;
        let second = match parts.get(2).copied() {
            Some(part) => parse(part, "second")?,
            None => 0,
        };

        if hour > 23 || minute > 59 || second > 59 {
            return Err(MedicineError::invalid_schedule_format(format!(
                "'{}' is outside 00:00:00-23:59:59",
                s
            )));
        }

        Ok(Self { hour, minute })
    }
}

impl fmt::Display for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Which calendar day a regimen's first dose falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDay {
    Today,
    Tomorrow,
}

/// Compare the scheduled time against `now`'s wall clock.
pub fn start_day<Tz: TimeZone>(now: &DateTime<Tz>, scheduled: ScheduledTime) -> StartDay {
    let (hour, minute, second) = (now.hour(), now.minute(), now.second());

    if scheduled.hour > hour {
        StartDay::Today
    } else if scheduled.hour == hour {
        if scheduled.minute > minute {
            StartDay::Today
        } else if scheduled.minute == minute {
            if second + START_GRACE_SECONDS < 60 {
                StartDay::Today
            } else {
                StartDay::Tomorrow
            }
        } else {
            StartDay::Tomorrow
        }
    } else {
        StartDay::Tomorrow
    }
}

/// Start date for a regimen created at `now`.
///
/// "Tomorrow" keeps `now`'s time-of-day; the stored start date carries the
/// creation timestamp, not the scheduled time.
pub fn compute_start_date<Tz: TimeZone>(
    now: &DateTime<Tz>,
    scheduled: ScheduledTime,
) -> DateTime<Tz> {
    match start_day(now, scheduled) {
        StartDay::Today => now.clone(),
        StartDay::Tomorrow => now.clone() + Duration::days(1),
    }
}

/// An all-false record with one entry per day of the regimen.
pub fn allocate_completion_record(duration_weeks: i64) -> Result<Vec<bool>, MedicineError> {
    if duration_weeks <= 0 {
        return Err(MedicineError::invalid_duration(format!(
            "duration must be a positive number of weeks, got {}",
            duration_weeks
        )));
    }

    if duration_weeks > MAX_DURATION_WEEKS {
        return Err(MedicineError::invalid_duration(format!(
            "{} weeks exceeds the {} week limit",
            duration_weeks, MAX_DURATION_WEEKS
        )));
    }

    Ok(vec![false; (duration_weeks * DAYS_PER_WEEK) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    }

    fn time(s: &str) -> ScheduledTime {
        s.parse().unwrap()
    }

    // ---- parsing ----

    #[test]
    fn parses_hours_and_minutes() {
        assert_eq!(time("08:30"), ScheduledTime { hour: 8, minute: 30 });
        assert_eq!(time("23:05"), ScheduledTime { hour: 23, minute: 5 });
    }

    #[test]
    fn drops_seconds_component() {
        assert_eq!(time("08:30:45"), ScheduledTime { hour: 8, minute: 30 });
    }

    #[test]
    fn seconds_component_must_be_valid() {
        assert_eq!(time("08:30:59"), ScheduledTime { hour: 8, minute: 30 });
        for bad in ["08:30:zz", "08:30:", "08:30:60", "08:30:-1", "08:30:+5"] {
            assert!(
                matches!(
                    bad.parse::<ScheduledTime>(),
                    Err(MedicineError::InvalidScheduleFormat { .. })
                ),
                "expected InvalidScheduleFormat for {:?}",
                bad
            );
        }
    }

    #[test]
    fn signed_components_are_rejected() {
        for bad in ["+8:30", "08:+30", "-1:30"] {
            assert!(bad.parse::<ScheduledTime>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(time("8:5").to_string(), "08:05");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "0830", "ab:cd", "08:", "08:30:00:00", "24:00", "12:60", "008:30"] {
            let err = bad.parse::<ScheduledTime>().unwrap_err();
            assert!(
                matches!(err, MedicineError::InvalidScheduleFormat { .. }),
                "expected InvalidScheduleFormat for {:?}",
                bad
            );
        }
    }

    // ---- start date ----

    #[test]
    fn later_hour_starts_today() {
        let now = at(7, 0, 0);
        assert_eq!(compute_start_date(&now, time("08:30")), now);
    }

    #[test]
    fn earlier_hour_starts_tomorrow() {
        let now = at(9, 0, 0);
        assert_eq!(compute_start_date(&now, time("08:30")), now + Duration::days(1));
    }

    #[test]
    fn same_hour_later_minute_starts_today() {
        assert_eq!(start_day(&at(8, 10, 59), time("08:30")), StartDay::Today);
    }

    #[test]
    fn same_hour_earlier_minute_starts_tomorrow() {
        assert_eq!(start_day(&at(8, 31, 0), time("08:30")), StartDay::Tomorrow);
    }

    #[test]
    fn same_minute_within_grace_starts_today() {
        assert_eq!(start_day(&at(8, 30, 0), time("08:30")), StartDay::Today);
        assert_eq!(start_day(&at(8, 30, 44), time("08:30")), StartDay::Today);
    }

    #[test]
    fn same_minute_past_grace_starts_tomorrow() {
        assert_eq!(start_day(&at(8, 30, 45), time("08:30")), StartDay::Tomorrow);

        let now = at(8, 30, 50);
        let start = compute_start_date(&now, time("08:30"));
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn tomorrow_keeps_creation_time_of_day() {
        let now = at(22, 15, 7);
        let start = compute_start_date(&now, time("06:00"));
        assert_eq!(start.time(), now.time());
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn tomorrow_rolls_over_month_end() {
        let now = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        let start = compute_start_date(&now, time("00:00"));
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    // ---- completion record ----

    #[test]
    fn two_weeks_allocates_fourteen_days() {
        let record = allocate_completion_record(2).unwrap();
        assert_eq!(record.len(), 14);
        assert!(record.iter().all(|done| !done));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        for weeks in [0, -1, i64::MIN] {
            assert!(matches!(
                allocate_completion_record(weeks),
                Err(MedicineError::InvalidDuration { .. })
            ));
        }
    }

    #[test]
    fn overlong_duration_is_rejected() {
        assert_eq!(
            allocate_completion_record(MAX_DURATION_WEEKS).unwrap().len(),
            (MAX_DURATION_WEEKS * 7) as usize
        );
        for weeks in [MAX_DURATION_WEEKS + 1, i64::MAX] {
            assert!(matches!(
                allocate_completion_record(weeks),
                Err(MedicineError::InvalidDuration { .. })
            ));
        }
    }
}
