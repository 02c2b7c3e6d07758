//! Dynamic shipment/transport record

use std::collections::HashMap;

use chrono::NaiveDate;

use super::FieldPatch;
use super::RecordId;
use super::RecordKind;
use super::Value;
use crate::derived;
use crate::error::FieldError;

static NULL: Value = Value::Null;

/// A record of the shipment or transport table.
///
/// Records hold field values as a `HashMap<String, Value>`. Typed getter
/// methods provide safe access with proper error handling.
///
/// # Example
///
/// ```
/// use shipdeck_lib::model::{Record, RecordKind};
///
/// let record = Record::new(RecordKind::Shipment, "r-1")
///     .set("naviera", "MSC")
///     .set("tt", 21i64);
///
/// assert_eq!(record.get_string("naviera").unwrap(), Some("MSC"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) kind: RecordKind,
    pub(crate) id: RecordId,
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new(kind: RecordKind, id: impl Into<RecordId>) -> Self {
        Self {
            kind,
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Returns the table this record belongs to.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the record ID.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, treating a missing field as null.
    pub fn value(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Applies every assignment of a patch to this record.
    pub fn apply(&mut self, patch: &FieldPatch) {
        for (field, value) in patch.iter() {
            self.fields.insert(field.to_string(), value.clone());
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(
                self,
                field,
                "string",
                other.type_name(),
            )),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(self, field, "bool", other.type_name())),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(self, field, "int", other.type_name())),
        }
    }

    /// Gets a numeric field value, widening integers.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)), // Allow widening
            Some(other) => Err(FieldError::type_mismatch(self, field, "float", other.type_name())),
        }
    }

    /// Gets a multi-value field.
    ///
    /// Accepts a list, a JSON-encoded string array or a whitespace-delimited
    /// string, the shapes container numbers arrive in.
    pub fn get_list(&self, field: &str) -> Result<Option<Vec<String>>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(value @ (Value::List(_) | Value::String(_))) => {
                Ok(Some(derived::split_multi_value(value)))
            }
            Some(other) => Err(FieldError::type_mismatch(self, field, "list", other.type_name())),
        }
    }

    /// Gets a calendar date from an ISO date or timestamp string.
    pub fn get_date(&self, field: &str) -> Result<Option<NaiveDate>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(self, field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => derived::parse_iso_date(s)
                .map(Some)
                .ok_or_else(|| FieldError::unparsable(self, field, "date", s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(self, field, "date", other.type_name())),
        }
    }
}
