//! Conversions between Photos' stored timestamps and calendar time.
//!
//! Photos stores creation dates as `REAL` seconds since 2001-01-01T00:00:00Z
//! (Core Data's "reference date"), not since the Unix epoch.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use eyre::{Result, eyre};

/// 2001-01-01T00:00:00Z expressed as Unix seconds.
pub const APPLE_EPOCH_UNIX: i64 = 978_307_200;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The instant `seconds` after the Apple epoch, kept to microsecond precision.
///
/// Returns `None` for NaN, infinities, and instants outside years 1..=9999,
/// which `YYYY-MM-DD` cannot spell.
pub fn apple_time_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round();
    // Beyond this, the i64 cast saturates and chrono would reject it anyway.
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    let unix_micros = (micros as i64).checked_add(APPLE_EPOCH_UNIX * 1_000_000)?;
    DateTime::from_timestamp_micros(unix_micros)
        .filter(|stamp| (1..=9999).contains(&stamp.year()))
}

/// Format Apple-epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Fractional seconds are dropped, so `-0.5` lands on `2000-12-31T23:59:59Z`.
pub fn apple_time_to_iso(seconds: f64) -> Result<String> {
    let stamp = apple_time_to_datetime(seconds)
        .ok_or_else(|| eyre!("Timestamp out of range: {} seconds since 2001-01-01", seconds))?;
    Ok(stamp.format(ISO_FORMAT).to_string())
}

/// Express a calendar instant in the unit Photos stores.
pub fn datetime_to_apple_time(stamp: DateTime<Utc>) -> f64 {
    let whole = stamp.timestamp() - APPLE_EPOCH_UNIX;
    whole as f64 + f64::from(stamp.timestamp_subsec_micros()) / 1_000_000.0
}

/// Parse a `--min-date` value: RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_min_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(stamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        eyre!(
            "Invalid date {:?}: expected YYYY-MM-DD or an RFC 3339 timestamp",
            value
        )
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_zero_is_2001() {
        assert_eq!(apple_time_to_iso(0.0).unwrap(), "2001-01-01T00:00:00Z");
    }

    #[test]
    fn negative_seconds_go_before_2001() {
        assert_eq!(apple_time_to_iso(-86400.0).unwrap(), "2000-12-31T00:00:00Z");
        assert_eq!(apple_time_to_iso(-0.5).unwrap(), "2000-12-31T23:59:59Z");
        // 1970-01-01 is exactly the Unix epoch.
        assert_eq!(
            apple_time_to_iso(-(APPLE_EPOCH_UNIX as f64)).unwrap(),
            "1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn fractions_are_truncated() {
        assert_eq!(apple_time_to_iso(59.999).unwrap(), "2001-01-01T00:00:59Z");
        // 2023-06-15T12:34:56Z
        assert_eq!(
            apple_time_to_iso(708_525_296.75).unwrap(),
            "2023-06-15T12:34:56Z"
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(apple_time_to_iso(f64::NAN).is_err());
        assert!(apple_time_to_iso(f64::INFINITY).is_err());
        assert!(apple_time_to_iso(1e300).is_err());
    }

    #[test]
    fn years_outside_four_digits_are_rejected() {
        assert!(apple_time_to_iso(3.2e11).is_err());
        assert!(apple_time_to_iso(-6.4e10).is_err());
        assert!(apple_time_to_datetime(3.2e11).is_none());

        // 0001-01-01T00:00:00Z and 9999-12-31T23:59:59Z are the edges.
        let first = -63_113_904_000.0;
        let last = 252_423_993_599.0;
        assert_eq!(apple_time_to_iso(first).unwrap(), "0001-01-01T00:00:00Z");
        assert!(apple_time_to_iso(first - 1.0).is_err());
        assert_eq!(apple_time_to_iso(last).unwrap(), "9999-12-31T23:59:59Z");
        assert!(apple_time_to_iso(last + 1.0).is_err());
    }

    #[test]
    fn conversion_recovers_whole_seconds() {
        for seconds in [-1_234_567.9, -1.0, 0.0, 0.4, 86_399.99, 708_525_296.75] {
            let stamp = apple_time_to_datetime(seconds).unwrap();
            let parsed = DateTime::parse_from_rfc3339(&apple_time_to_iso(seconds).unwrap())
                .unwrap()
                .with_timezone(&Utc);
            assert_eq!(datetime_to_apple_time(parsed), seconds.floor());
            assert_eq!(stamp.timestamp() - APPLE_EPOCH_UNIX, seconds.floor() as i64);
        }
    }

    #[test]
    fn min_date_accepts_plain_dates_and_rfc3339() {
        let plain = parse_min_date("2001-01-01").unwrap();
        assert_eq!(datetime_to_apple_time(plain), 0.0);

        let offset = parse_min_date("2001-01-01T02:00:00+02:00").unwrap();
        assert_eq!(datetime_to_apple_time(offset), 0.0);

        let later = parse_min_date(" 2001-01-02 ").unwrap();
        assert_eq!(datetime_to_apple_time(later), 86_400.0);
    }

    #[test]
    fn min_date_rejects_garbage() {
        assert!(parse_min_date("yesterday").is_err());
        assert!(parse_min_date("2001-13-01").is_err());
    }
}
