//! Property tests for the schedule engine and the adherence ledger

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike};
use proptest::prelude::*;

use super::ledger::{completion_index, mark_completion};
use super::schedule::{allocate_completion_record, compute_start_date, ScheduledTime};
use super::types::Medicine;
use super::MedicineError;

fn instant_strategy() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        0i64..(365 * 20),
        0u32..24,
        0u32..60,
        0u32..60,
        -12i32..=14,
    )
        .prop_map(|(days, h, m, s, offset_hours)| {
            let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
            let day = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap() + Duration::days(days);
            offset
                .from_local_datetime(&day.and_hms_opt(h, m, s).unwrap())
                .unwrap()
        })
}

fn medicine_with(start_date: DateTime<FixedOffset>, weeks: i64) -> Medicine {
    Medicine {
        id: 1,
        user_id: 1,
        name: "Lisinopril".to_string(),
        dosage_type: "tablet".to_string(),
        dosage_amount: "10mg".to_string(),
        duration_weeks: weeks,
        scheduled_time: "09:00".to_string(),
        start_date,
        completion_record: allocate_completion_record(weeks).unwrap(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn later_scheduled_hour_starts_on_the_same_day(now in instant_strategy(), bump in 1u32..24, minute in 0u32..60) {
        prop_assume!(now.hour() + bump < 24);
        let scheduled = ScheduledTime { hour: now.hour() + bump, minute };

        let start = compute_start_date(&now, scheduled);
        prop_assert_eq!(start.date_naive(), now.date_naive());
    }

    #[test]
    fn same_minute_boundary_is_second_45(now in instant_strategy()) {
        let scheduled = ScheduledTime { hour: now.hour(), minute: now.minute() };
        let start = compute_start_date(&now, scheduled);

        if now.second() >= 45 {
            prop_assert_eq!(start, now + Duration::days(1));
        } else {
            prop_assert_eq!(start, now);
        }
    }

    #[test]
    fn start_is_today_or_tomorrow(now in instant_strategy(), hour in 0u32..24, minute in 0u32..60) {
        let start = compute_start_date(&now, ScheduledTime { hour, minute });
        let days = (start.date_naive() - now.date_naive()).num_days();
        prop_assert!(days == 0 || days == 1);
        prop_assert_eq!(start.time(), now.time());
    }

    #[test]
    fn record_is_seven_falses_per_week(weeks in 1i64..200) {
        let record = allocate_completion_record(weeks).unwrap();
        prop_assert_eq!(record.len() as i64, weeks * 7);
        prop_assert!(record.iter().all(|d| !d));
    }

    #[test]
    fn marking_touches_only_the_target(start in instant_strategy(), weeks in 1i64..10, offset_days in -20i64..100) {
        let utc = FixedOffset::east_opt(0).unwrap();
        let medicine = medicine_with(start, weeks);
        let start_day = start.with_timezone(&utc).date_naive();
        let target = start_day + Duration::days(offset_days);
        let len = medicine.completion_record.len() as i64;

        match mark_completion(&medicine, target, true, &utc) {
            Ok(updated) => {
                prop_assert!(offset_days >= 0 && offset_days < len);
                for (i, done) in updated.completion_record.iter().enumerate() {
                    prop_assert_eq!(*done, i as i64 == offset_days);
                }
            }
            Err(err) => {
                prop_assert!(offset_days < 0 || offset_days >= len);
                let is_invalid_date = matches!(err, MedicineError::InvalidDate { .. });
                prop_assert!(is_invalid_date);
            }
        }
    }

    #[test]
    fn index_ignores_time_of_day(day in 0i64..3000, later in 0i64..30) {
        let start = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap() + Duration::days(day);
        let target = start + Duration::days(later);
        prop_assert_eq!(completion_index(start, target, 30).unwrap() as i64, later);
    }
}
