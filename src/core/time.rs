//! CDA timestamp normalization
//!
//! CDA `effectiveTime` values look like `20230115083000+0100` or `20230115083000.000-0500`.
//! Only the first 14 characters (`YYYYMMDDHHMMSS`) are significant; the digits are read as a
//! wall-clock breakdown and never shifted between timezones.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Number of significant characters in a CDA timestamp
pub const TIMESTAMP_WIDTH: usize = 14;

/// Parses the leading `YYYYMMDDHHMMSS` of a CDA timestamp
///
/// Returns `None` when the input is shorter than 14 characters, any of the first 14 is not an
/// ASCII digit, or the fields do not form a valid calendar date and time of day. Years start at 1.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let head = raw.get(..TIMESTAMP_WIDTH)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let field = |range: std::ops::Range<usize>| head[range].parse::<u32>().ok();

    let year = head[0..4].parse::<i32>().ok().filter(|year| *year >= 1)?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?;
    let time = NaiveTime::from_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)?;

    Some(NaiveDateTime::new(date, time))
}

/// Normalizes a CDA timestamp into `("YYYY-MM-DD", "HH:MM:SS")`
///
/// Malformed input of any kind yields `("", "")`.
///
/// # Examples
///
/// ```
/// use healthport::core::time::normalize_timestamp;
///
/// assert_eq!(
///     normalize_timestamp("20230115083000+0100"),
///     ("2023-01-15".to_string(), "08:30:00".to_string())
/// );
/// assert_eq!(normalize_timestamp("20231332120000"), (String::new(), String::new()));
/// ```
#[must_use]
pub fn normalize_timestamp(raw: &str) -> (String, String) {
    match parse_timestamp(raw) {
        Some(timestamp) => (
            timestamp.format("%Y-%m-%d").to_string(),
            timestamp.format("%H:%M:%S").to_string(),
        ),
        None => (String::new(), String::new()),
    }
}
