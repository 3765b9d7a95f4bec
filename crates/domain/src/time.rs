//! Time and timestamp helpers.
//!
//! Time-of-day values are [`NaiveTime`]; every helper here wraps around
//! midnight instead of failing.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for `last_changed`, automation bookkeeping, etc.
pub type Timestamp = DateTime<Utc>;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a wall-clock `HH:MM` (or `HH:MM:SS`) string.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimeOfDay`] when the input matches neither format.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTimeOfDay(value.to_string()))
}

/// Whether `now` lies in the half-open window `[start, end)`.
///
/// When `end < start` the window spans midnight.
#[must_use]
pub fn in_window(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        start <= now && now < end
    } else {
        now >= start || now < end
    }
}

/// Minutes from `from` until the next occurrence of `to` (same day or the next one).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn time_difference_minutes(from: NaiveTime, to: NaiveTime) -> f64 {
    let minutes = to.signed_duration_since(from).num_milliseconds() as f64 / 60_000.0;
    if minutes < 0.0 {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

/// Shift a time of day forward, wrapping past midnight.
#[must_use]
pub fn add_hours(time: NaiveTime, hours: f64) -> NaiveTime {
    time.overflowing_add_signed(hours_delta(hours)).0
}

/// Shift a time of day backward, wrapping past midnight.
#[must_use]
pub fn subtract_hours(time: NaiveTime, hours: f64) -> NaiveTime {
    time.overflowing_sub_signed(hours_delta(hours)).0
}

#[allow(clippy::cast_possible_truncation)]
fn hours_delta(hours: f64) -> TimeDelta {
    const DAY_MS: f64 = 86_400_000.0;
    TimeDelta::milliseconds((hours * 3_600_000.0).round().rem_euclid(DAY_MS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_hours_and_minutes() {
        assert_eq!(parse_time_of_day("22:00").unwrap(), hm(22, 0));
        assert_eq!(parse_time_of_day(" 06:30 ").unwrap(), hm(6, 30));
    }

    #[test]
    fn should_parse_time_with_seconds() {
        assert_eq!(parse_time_of_day("06:30:00").unwrap(), hm(6, 30));
    }

    #[test]
    fn should_reject_malformed_time() {
        assert!(matches!(
            parse_time_of_day("25:00"),
            Err(ValidationError::InvalidTimeOfDay(_))
        ));
        assert!(parse_time_of_day("noon").is_err());
    }

    #[test]
    fn should_contain_time_inside_same_day_window() {
        assert!(in_window(hm(12, 0), hm(8, 0), hm(18, 0)));
        assert!(!in_window(hm(19, 0), hm(8, 0), hm(18, 0)));
    }

    #[test]
    fn should_treat_window_as_half_open() {
        assert!(in_window(hm(8, 0), hm(8, 0), hm(18, 0)));
        assert!(!in_window(hm(18, 0), hm(8, 0), hm(18, 0)));
    }

    #[test]
    fn should_wrap_window_past_midnight() {
        assert!(in_window(hm(23, 0), hm(22, 0), hm(6, 0)));
        assert!(in_window(hm(5, 0), hm(22, 0), hm(6, 0)));
        assert!(!in_window(hm(12, 0), hm(22, 0), hm(6, 0)));
    }

    #[test]
    fn should_never_contain_anything_in_empty_window() {
        assert!(!in_window(hm(10, 0), hm(10, 0), hm(10, 0)));
    }

    #[test]
    fn should_measure_forward_difference() {
        let minutes = time_difference_minutes(hm(21, 0), hm(22, 0));
        assert!((minutes - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_measure_difference_across_midnight() {
        let minutes = time_difference_minutes(hm(23, 30), hm(0, 15));
        assert!((minutes - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_measure_zero_for_identical_times() {
        assert!(time_difference_minutes(hm(7, 0), hm(7, 0)).abs() < f64::EPSILON);
    }

    #[test]
    fn should_add_hours_with_wraparound() {
        assert_eq!(add_hours(hm(6, 30), 0.5), hm(7, 0));
        assert_eq!(add_hours(hm(23, 45), 0.5), hm(0, 15));
    }

    #[test]
    fn should_subtract_hours_with_wraparound() {
        assert_eq!(subtract_hours(hm(22, 0), 1.0), hm(21, 0));
        assert_eq!(subtract_hours(hm(0, 30), 1.0), hm(23, 30));
    }

    #[test]
    fn should_wrap_offsets_spanning_many_days() {
        assert_eq!(add_hours(hm(6, 0), 24.0 * 1000.0), hm(6, 0));
        assert_eq!(subtract_hours(hm(6, 0), -48.0), hm(6, 0));
        let far = add_hours(hm(6, 0), -1e16);
        assert_eq!(far, subtract_hours(hm(6, 0), 1e16));
        let _ = add_hours(hm(6, 0), f64::MAX);
    }
}
