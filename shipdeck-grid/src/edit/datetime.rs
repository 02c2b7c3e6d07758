//! Date and time text forms.
//!
//! Dates are stored as `YYYY-MM-DD` and shown as `DD/MM/YYYY`; times are
//! `HH:MM`; timestamps are stored as UTC RFC 3339 and typed in local wall
//! clock time.

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;
use shipdeck_lib::derived::parse_iso_date;

const MAX_TIME_DIGITS: usize = 4;

// =============================================================================
// Dates
// =============================================================================

/// Parses a typed date: `DD/MM/YYYY`, `DD-MM-YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Some(date) = parse_iso_date(input)
        && input.len() == 10
    {
        return Some(date);
    }
    for format in ["%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date);
        }
    }
    None
}

/// Storage form of a date.
pub fn storage_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Display form of a stored date or timestamp.
///
/// Returns `None` if the stored text is not a date.
pub fn display_date(stored: &str, separator: char) -> Option<String> {
    let date = parse_iso_date(stored)?;
    Some(date.format(&format!("%d{separator}%m{separator}%Y")).to_string())
}

// =============================================================================
// Times
// =============================================================================

/// Applies the time input mask.
///
/// Keeps up to four digits and inserts `:` after the first two.
///
/// # Example
///
/// ```
/// use shipdeck_grid::edit::mask_time;
///
/// assert_eq!(mask_time("0930"), "09:30");
/// assert_eq!(mask_time("9:3"), "93");
/// assert_eq!(mask_time("12345"), "12:34");
/// ```
pub fn mask_time(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_TIME_DIGITS)
        .collect();
    if digits.len() > 2 {
        format!("{}:{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Parses `HH:MM` with hours up to 23 and minutes up to 59.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let (hours, minutes) = input.trim().split_once(':')?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Storage form of a time.
pub fn storage_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

// =============================================================================
// Timestamps
// =============================================================================

/// Parses a local wall-clock timestamp into UTC.
///
/// Accepts the picker form `YYYY-MM-DDTHH:MM` (optionally with seconds),
/// `YYYY-MM-DD HH:MM`, and the typed forms `DD-MM-YYYY HH:MM` and
/// `DD/MM/YYYY HH:MM`.
pub fn parse_local_datetime(input: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d-%m-%Y %H:%M",
        "%d/%m/%Y %H:%M",
        "%d-%m-%YT%H:%M",
    ];
    let input = input.trim();
    let naive = FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Storage form of a timestamp: RFC 3339 UTC with milliseconds.
pub fn storage_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_stored_timestamp(stored: &str) -> Option<DateTime<Utc>> {
    let stored = stored.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(stored) {
        return Some(dt.with_timezone(&Utc));
    }
    // Columns without a zone suffix hold UTC
    NaiveDateTime::parse_from_str(stored, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(stored, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Display form of a stored timestamp in local time: `DD/MM/YYYY HH:MM`.
pub fn display_datetime(stored: &str, offset: FixedOffset, separator: char) -> Option<String> {
    let local = parse_stored_timestamp(stored)?.with_timezone(&offset);
    Some(
        local
            .format(&format!("%d{separator}%m{separator}%Y %H:%M"))
            .to_string(),
    )
}

/// Picker form of a stored timestamp in local time: `YYYY-MM-DDTHH:MM`.
pub fn input_datetime(stored: &str, offset: FixedOffset) -> Option<String> {
    let local = parse_stored_timestamp(stored)?.with_timezone(&offset);
    Some(local.format("%Y-%m-%dT%H:%M").to_string())
}

/// The machine's current offset from UTC.
pub fn local_offset() -> FixedOffset {
    *chrono::Local::now().offset()
}

/// Offset for a configured number of minutes, falling back to local time.
pub fn offset_from_minutes(minutes: Option<i32>) -> FixedOffset {
    minutes
        .and_then(|m| FixedOffset::east_opt(m * 60))
        .unwrap_or_else(local_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn santiago() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_date_round_trip() {
        let shown = display_date("2024-03-05", '/').unwrap();
        assert_eq!(shown, "05/03/2024");
        assert_eq!(storage_date(parse_date(&shown).unwrap()), "2024-03-05");
    }

    #[test]
    fn test_date_accepts_dashes_and_iso() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("05-03-2024"), expected);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date(" 5/3/2024 "), expected);
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("2024-03-05T10:00"), None);
        assert_eq!(parse_date("mañana"), None);
    }

    #[test]
    fn test_display_date_from_timestamp() {
        assert_eq!(
            display_date("2024-03-05T00:00:00.000Z", '-').as_deref(),
            Some("05-03-2024")
        );
    }

    #[test]
    fn test_time_mask_and_bounds() {
        assert_eq!(mask_time("2460"), "24:60");
        assert_eq!(parse_time(&mask_time("2460")), None);
        assert_eq!(parse_time(&mask_time("2359")), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(mask_time("930"), "93:0");
        assert_eq!(parse_time(&mask_time("930")), None);
        assert_eq!(storage_time(parse_time("9:05").unwrap()), "09:05");
    }

    #[test]
    fn test_local_datetime_to_utc() {
        let utc = parse_local_datetime("2024-03-05T21:30", santiago()).unwrap();
        assert_eq!(storage_timestamp(utc), "2024-03-06T00:30:00.000Z");

        let typed = parse_local_datetime("05-03-2024 21:30", santiago()).unwrap();
        assert_eq!(typed, utc);
    }

    #[test]
    fn test_timestamp_display_and_input() {
        let stored = "2024-03-06T00:30:00.000Z";
        assert_eq!(
            display_datetime(stored, santiago(), '/').as_deref(),
            Some("05/03/2024 21:30")
        );
        assert_eq!(input_datetime(stored, santiago()).as_deref(), Some("2024-03-05T21:30"));
        assert_eq!(
            input_datetime("2024-03-06T00:30:00", santiago()).as_deref(),
            Some("2024-03-05T21:30")
        );
    }
}
