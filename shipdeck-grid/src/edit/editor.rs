//! Editor kinds and draft parsing.

use chrono::FixedOffset;
use serde::Deserialize;
use serde::Serialize;
use shipdeck_lib::model::Value;

use super::datetime;
use crate::error::EditError;

// =============================================================================
// EditorKind
// =============================================================================

/// Where a select editor takes its options from.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSource {
    /// A fixed list.
    Static(Vec<String>),
    /// A named remote catalog, fetched once per grid.
    Catalog(String),
    /// Distinct values of the column across the loaded records.
    Distinct,
}

/// Inclusive bounds of a numeric field and the message shown when a value
/// falls outside them.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub message: String,
}

impl NumberBounds {
    /// Creates bounds with both ends set.
    pub fn between(min: f64, max: f64, message: impl Into<String>) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            message: message.into(),
        }
    }

    /// Creates bounds with only a lower end.
    pub fn at_least(min: f64, message: impl Into<String>) -> Self {
        Self {
            min: Some(min),
            max: None,
            message: message.into(),
        }
    }

    pub fn contains(&self, n: f64) -> bool {
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }
}

/// How a cell is edited.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorKind {
    /// Single-line free text.
    Text,
    /// Whitespace-separated tokens stored as a list.
    MultiText,
    /// A number, optionally bounded.
    Number { bounds: Option<NumberBounds> },
    /// A calendar date.
    Date,
    /// A masked `HH:MM` time.
    Time,
    /// A local date and time stored as a UTC timestamp.
    DateTime,
    /// One value from a list of options.
    Select { options: OptionSource },
}

impl EditorKind {
    /// Creates a select editor over a named catalog.
    pub fn catalog(name: impl Into<String>) -> Self {
        Self::Select {
            options: OptionSource::Catalog(name.into()),
        }
    }

    /// Creates a select editor over the column's distinct values.
    pub fn distinct() -> Self {
        Self::Select {
            options: OptionSource::Distinct,
        }
    }

    /// Creates a select editor over a fixed list.
    pub fn options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select {
            options: OptionSource::Static(options.into_iter().map(Into::into).collect()),
        }
    }

    /// Creates an unbounded number editor.
    pub fn number() -> Self {
        Self::Number { bounds: None }
    }

    /// Creates a bounded number editor.
    pub fn bounded(bounds: NumberBounds) -> Self {
        Self::Number {
            bounds: Some(bounds),
        }
    }

    /// Name of the expected input, used in error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Text | Self::Select { .. } => "text",
            Self::MultiText => "list",
            Self::Number { .. } => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date and time",
        }
    }

    /// The draft an editor opens with for a stored value.
    pub fn seed(&self, value: &Value, offset: FixedOffset, separator: char) -> String {
        let text = value.to_text();
        match self {
            Self::Date => datetime::display_date(&text, separator).unwrap_or(text),
            Self::DateTime => datetime::input_datetime(&text, offset).unwrap_or(text),
            Self::MultiText => match value {
                Value::List(items) => items.join(" "),
                _ => text,
            },
            _ => text,
        }
    }

    /// Applies the editor's input mask to raw keystrokes.
    pub fn mask(&self, raw: &str) -> String {
        match self {
            Self::Time => datetime::mask_time(raw),
            _ => raw.to_string(),
        }
    }

    /// Parses a draft into its storage value.
    ///
    /// Blank drafts parse to [`Value::Null`] for every kind. Unparsable
    /// drafts fail with [`EditError::InvalidInput`]; the caller decides what
    /// to do with them. Numbers outside the bounds fail with
    /// [`EditError::OutOfRange`].
    pub fn parse(&self, draft: &str, offset: FixedOffset) -> Result<Value, EditError> {
        let trimmed = draft.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        let invalid = || EditError::invalid_input(trimmed, self.expected());

        match self {
            Self::Text | Self::Select { .. } => Ok(Value::String(trimmed.to_string())),
            Self::MultiText => Ok(Value::List(
                trimmed.split_whitespace().map(str::to_string).collect(),
            )),
            Self::Number { bounds } => {
                let value = parse_number(trimmed).ok_or_else(invalid)?;
                if let Some(bounds) = bounds
                    && let Some(n) = value.as_f64()
                    && !bounds.contains(n)
                {
                    return Err(EditError::OutOfRange {
                        message: bounds.message.clone(),
                    });
                }
                Ok(value)
            }
            Self::Date => datetime::parse_date(trimmed)
                .map(|d| Value::String(datetime::storage_date(d)))
                .ok_or_else(invalid),
            Self::Time => datetime::parse_time(trimmed)
                .map(|t| Value::String(datetime::storage_time(t)))
                .ok_or_else(invalid),
            Self::DateTime => datetime::parse_local_datetime(trimmed, offset)
                .map(|dt| Value::String(datetime::storage_timestamp(dt)))
                .ok_or_else(invalid),
        }
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(Value::Int(n));
    }
    let n: f64 = s.replace(',', ".").parse().ok()?;
    n.is_finite().then_some(Value::Float(n))
}

// =============================================================================
// InvalidInputPolicy
// =============================================================================

/// What a commit does with a draft that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputPolicy {
    /// Store null in place of the unparsable draft.
    #[default]
    CoerceNull,
    /// Keep the editor open with an inline message.
    Reject,
}

impl InvalidInputPolicy {
    /// Resolves a parse result under this policy.
    pub fn resolve(self, parsed: Result<Value, EditError>) -> Result<Value, EditError> {
        match (self, parsed) {
            (Self::CoerceNull, Err(EditError::InvalidInput { input, expected })) => {
                log::debug!("Coercing invalid {expected} '{input}' to null");
                Ok(Value::Null)
            }
            (_, result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_blank_is_null_for_every_kind() {
        for editor in [
            EditorKind::Text,
            EditorKind::MultiText,
            EditorKind::number(),
            EditorKind::Date,
            EditorKind::Time,
            EditorKind::DateTime,
            EditorKind::distinct(),
        ] {
            assert_eq!(editor.parse("   ", utc()).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            EditorKind::Text.parse("  MSC  ", utc()).unwrap(),
            Value::from("MSC")
        );
    }

    #[test]
    fn test_multi_text_splits_tokens() {
        assert_eq!(
            EditorKind::MultiText.parse("MSCU123  TGHU456\n", utc()).unwrap(),
            Value::List(vec!["MSCU123".into(), "TGHU456".into()])
        );
    }

    #[test]
    fn test_numbers() {
        let editor = EditorKind::number();
        assert_eq!(editor.parse("12", utc()).unwrap(), Value::Int(12));
        assert_eq!(editor.parse("-0,5", utc()).unwrap(), Value::Float(-0.5));
        assert!(matches!(
            editor.parse("doce", utc()),
            Err(EditError::InvalidInput { expected: "number", .. })
        ));
    }

    #[test]
    fn test_bounds_reject_regardless_of_policy() {
        let editor = EditorKind::bounded(NumberBounds::between(-1.0, 1.0, "fuera de rango"));
        assert_eq!(editor.parse("-1", utc()).unwrap(), Value::Int(-1));
        let err = InvalidInputPolicy::CoerceNull
            .resolve(editor.parse("1.5", utc()))
            .unwrap_err();
        assert_eq!(err.to_string(), "fuera de rango");
    }

    #[test]
    fn test_policy_on_invalid_time() {
        let editor = EditorKind::Time;
        let draft = editor.mask("2460");
        assert_eq!(
            InvalidInputPolicy::CoerceNull
                .resolve(editor.parse(&draft, utc()))
                .unwrap(),
            Value::Null
        );
        assert!(
            InvalidInputPolicy::Reject
                .resolve(editor.parse(&draft, utc()))
                .is_err()
        );
        assert_eq!(editor.parse("23:59", utc()).unwrap(), Value::from("23:59"));
    }

    #[test]
    fn test_seed_matches_display() {
        let seed = EditorKind::Date.seed(&Value::from("2024-03-05"), utc(), '/');
        assert_eq!(seed, "05/03/2024");
        assert_eq!(
            EditorKind::Date.parse(&seed, utc()).unwrap(),
            Value::from("2024-03-05")
        );
        let list = Value::List(vec!["A".into(), "B".into()]);
        assert_eq!(EditorKind::MultiText.seed(&list, utc(), '/'), "A B");
    }
}
