//! Values derived from other fields.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::model::Value;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parses the calendar date at the start of an ISO date or timestamp string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let prefix = s.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    parse_iso_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days between departure and arrival, rounded to the nearest day
/// with halves rounded up.
///
/// Returns `Value::Null` when either side is missing or unparsable, or when
/// the rounded count is negative.
///
/// # Example
///
/// ```
/// use shipdeck_lib::derived::transit_days;
/// use shipdeck_lib::model::Value;
///
/// let tt = transit_days(&Value::from("2024-03-05"), &Value::from("2024-03-26"));
/// assert_eq!(tt, Value::Int(21));
/// ```
pub fn transit_days(departure: &Value, arrival: &Value) -> Value {
    let (Some(etd), Some(eta)) = (
        departure.as_str().and_then(parse_instant),
        arrival.as_str().and_then(parse_instant),
    ) else {
        return Value::Null;
    };

    let seconds = (eta - etd).num_seconds();
    let days = (seconds + SECONDS_PER_DAY / 2).div_euclid(SECONDS_PER_DAY);
    if days < 0 {
        return Value::Null;
    }
    Value::Int(days)
}

/// Splits a multi-value field into its tokens.
///
/// Lists pass through (blank items dropped); strings holding a JSON array
/// are decoded; any other string is split on whitespace.
pub fn split_multi_value(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[')
                && let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed)
            {
                return split_multi_value(&Value::List(items));
            }
            trimmed.split_whitespace().map(str::to_string).collect()
        }
        Value::Null => Vec::new(),
        other => vec![other.to_text()],
    }
}

/// Splits `"NAME [VOYAGE]"` into the vessel name and voyage.
///
/// Values without a trailing bracketed voyage are returned trimmed with no
/// voyage.
pub fn split_vessel_voyage(s: &str) -> (String, Option<String>) {
    let trimmed = s.trim();
    if let Some(without_close) = trimmed.strip_suffix(']')
        && let Some(open) = without_close.find('[')
    {
        let name = without_close[..open].trim();
        let voyage = without_close[open + 1..].trim();
        if !name.is_empty() && !voyage.is_empty() {
            return (name.to_string(), Some(voyage.to_string()));
        }
    }
    (trimmed.to_string(), None)
}
