//! Spreadsheet date serials.

use chrono::{Days, NaiveDate};

/// Largest serial a spreadsheet can display as a date (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Convert a 1900-system date serial to a calendar date, discarding the
/// time of day. Returns `None` for negative, non-finite or out-of-range
/// serials.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let days = serial.floor() as u64;
    // Serials below 61 predate the phantom 1900-02-29 and count from 1899-12-31.
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

/// `YYYY-MM-DD` for a date serial.
pub fn format_iso_date(serial: f64) -> Option<String> {
    serial_to_date(serial).map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_dates() {
        assert_eq!(format_iso_date(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(format_iso_date(36526.0).as_deref(), Some("2000-01-01"));
        assert_eq!(format_iso_date(61.0).as_deref(), Some("1900-03-01"));
    }

    #[test]
    fn test_early_serials() {
        assert_eq!(format_iso_date(1.0).as_deref(), Some("1900-01-01"));
        assert_eq!(format_iso_date(59.0).as_deref(), Some("1900-02-28"));
    }

    #[test]
    fn test_time_of_day_is_discarded() {
        assert_eq!(format_iso_date(45292.75).as_deref(), Some("2024-01-01"));
        assert_eq!(format_iso_date(45292.999_999).as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(format_iso_date(-1.0), None);
        assert_eq!(format_iso_date(f64::NAN), None);
        assert_eq!(format_iso_date(3_000_000.0), None);
        assert_eq!(format_iso_date(2_958_465.0).as_deref(), Some("9999-12-31"));
    }
}
