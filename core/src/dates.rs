//! Conversions for Grist `Date` cells.
//!
//! Grist stores a `Date` as the number of seconds from the Unix epoch to
//! midnight UTC of that day.

use chrono::{DateTime, NaiveDate};

/// UTC calendar date of a Grist timestamp. `None` if `seconds` is not
/// finite or falls outside chrono's representable range.
pub fn timestamp_to_date(seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = (((seconds - whole) * 1e9) as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn epoch_is_1970_01_01() {
        assert_eq!(timestamp_to_date(0.0), Some(date(1970, 1, 1)));
    }

    #[test]
    fn grist_midnight_timestamp() {
        // 2024-03-15T00:00:00Z
        assert_eq!(timestamp_to_date(1_710_460_800.0), Some(date(2024, 3, 15)));
    }

    #[test]
    fn fractional_seconds_before_midnight_stay_on_same_day() {
        assert_eq!(timestamp_to_date(1_710_460_799.75), Some(date(2024, 3, 14)));
    }

    #[test]
    fn negative_timestamps_are_before_epoch() {
        assert_eq!(timestamp_to_date(-86_400.0), Some(date(1969, 12, 31)));
        assert_eq!(timestamp_to_date(-0.5), Some(date(1969, 12, 31)));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert_eq!(timestamp_to_date(f64::NAN), None);
        assert_eq!(timestamp_to_date(f64::INFINITY), None);
        assert_eq!(timestamp_to_date(1e300), None);
    }
}
