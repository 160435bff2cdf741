//! Civil-time helpers: date parsing, UTC offsets and the
//! "HH:MM" wall-clock format used across every record.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::error::{ObservatoryError, ObservatoryResult};

/// Largest UTC offset accepted, in hours.
pub const MAX_UTC_OFFSET_HOURS: f64 = 14.0;

/// Parse a civil date written `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_date(input: &str) -> ObservatoryResult<NaiveDate> {
    let normalized = input.trim().replace('/', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map_err(|_| ObservatoryError::data(format!("invalid date '{}'", input)))
}

/// ISO form used for cache keys and ids.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build a fixed offset from fractional hours (e.g. `5.5` for +05:30).
pub fn utc_offset(hours: f64) -> ObservatoryResult<FixedOffset> {
    if !hours.is_finite() || hours.abs() > MAX_UTC_OFFSET_HOURS {
        return Err(ObservatoryError::data(format!(
            "invalid UTC offset {} h",
            hours
        )));
    }
    let seconds = (hours * 3600.0).round() as i32;
    FixedOffset::east_opt(seconds)
        .ok_or_else(|| ObservatoryError::data(format!("invalid UTC offset {} h", hours)))
}

/// UTC instant of a local wall-clock time on `date`.
pub fn local_to_utc(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    offset: FixedOffset,
) -> ObservatoryResult<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ObservatoryError::data(format!("invalid time {:02}:{:02}", hour, minute)))?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ObservatoryError::data(format!("unrepresentable local time on {}", date)))
}

/// UTC instant of local midnight starting `date`.
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> ObservatoryResult<DateTime<Utc>> {
    local_to_utc(date, 0, 0, offset)
}

/// Civil date of `instant` as seen with `offset`.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Local wall-clock `HH:MM` of `instant`.
pub fn format_hhmm(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = instant.with_timezone(&offset);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// `start + step * index`, the instant of a fixed-cadence sample.
pub fn sample_instant(start: DateTime<Utc>, step_minutes: i64, index: usize) -> DateTime<Utc> {
    start + Duration::minutes(step_minutes * index as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_both_separators() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        assert_eq!(parse_date("2026-02-24").unwrap(), expected);
        assert_eq!(parse_date("2026/02/24").unwrap(), expected);
        assert_eq!(iso_date(expected), "2026-02-24");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        for bad in ["", "2026-13-01", "24/02/2026", "tomorrow"] {
            assert!(parse_date(bad).unwrap_err().is_data_error(), "{bad}");
        }
    }

    #[test]
    fn test_offsets() {
        assert_eq!(utc_offset(5.5).unwrap().local_minus_utc(), 19_800);
        assert_eq!(utc_offset(-3.0).unwrap().local_minus_utc(), -10_800);
        assert!(utc_offset(15.0).is_err());
        assert!(utc_offset(f64::NAN).is_err());
    }

    #[test]
    fn test_local_midnight_in_ist() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let ist = utc_offset(5.5).unwrap();
        let midnight = local_midnight(date, ist).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 2, 23, 18, 30, 0).unwrap());
        assert_eq!(local_date(midnight, ist), date);
        assert_eq!(format_hhmm(midnight, ist), "00:00");
    }

    #[test]
    fn test_invalid_wall_clock_time() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let utc = utc_offset(0.0).unwrap();
        assert!(local_to_utc(date, 24, 0, utc).is_err());
        assert!(local_to_utc(date, 6, 60, utc).is_err());
    }

    #[test]
    fn test_sample_instant() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            sample_instant(start, 10, 143),
            Utc.with_ymd_and_hms(2026, 1, 1, 23, 50, 0).unwrap()
        );
    }
}
