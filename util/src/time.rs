//! General time utility functions

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if the nanosecond count overflows.
pub fn duration_to_seconds(duration: Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a UTC datetime into (fractional) seconds since the unix epoch.
pub fn datetime_to_seconds(datetime: &DateTime<Utc>) -> f64 {
    datetime.timestamp() as f64 + datetime.timestamp_subsec_nanos() as f64 / NANOS_PER_SECOND as f64
}

/// Convert (fractional) seconds since the unix epoch into a UTC datetime.
///
/// Returns `None` if the value is not finite or is out of the representable range.
pub fn seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }

    let secs = seconds.floor();
    let nanos = ((seconds - secs) * NANOS_PER_SECOND as f64).round() as u32;

    // Rounding can push the sub-second part up to a whole second
    let (secs, nanos) = if nanos >= NANOS_PER_SECOND as u32 {
        (secs as i64 + 1, 0)
    } else {
        (secs as i64, nanos)
    };

    Utc.timestamp_opt(secs, nanos).single()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(duration_to_seconds(Duration::milliseconds(1500)), Some(1.5));
        assert_eq!(duration_to_seconds(Duration::zero()), Some(0.0));
        assert_eq!(duration_to_seconds(Duration::max_value()), None);
    }

    #[test]
    fn test_seconds_datetime_conversion() {
        let dt = seconds_to_datetime(100.25).unwrap();
        assert_eq!(dt.timestamp(), 100);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
        assert!((datetime_to_seconds(&dt) - 100.25).abs() < 1e-9);

        assert!(seconds_to_datetime(std::f64::NAN).is_none());
    }
}
