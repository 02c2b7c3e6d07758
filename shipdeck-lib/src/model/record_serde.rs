//! JSON form of a Record.
//!
//! A record serializes as one flat object: `"id"` followed by every field in
//! name order. Reading goes through [`Record::from_json`] because the table
//! kind is not part of the row.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use super::Record;
use super::RecordId;
use super::RecordKind;
use super::Value;
use super::fields;
use crate::error::StoreError;

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ordered: BTreeMap<&String, &Value> = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != fields::ID)
            .collect();

        let mut map = serializer.serialize_map(Some(ordered.len() + 1))?;
        map.serialize_entry(fields::ID, &self.id)?;
        for (key, value) in ordered {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Record {
    /// Builds a record from one JSON row.
    ///
    /// The row must be an object with a string or numeric `"id"`.
    pub fn from_json(kind: RecordKind, json: serde_json::Value) -> Result<Self, StoreError> {
        let serde_json::Value::Object(obj) = json else {
            return Err(StoreError::parse("record row is not a JSON object"));
        };

        let mut id = None;
        let mut record_fields = std::collections::HashMap::with_capacity(obj.len());
        for (key, value) in obj {
            if key == fields::ID {
                id = match value {
                    serde_json::Value::String(s) => Some(RecordId::new(s)),
                    serde_json::Value::Number(n) => Some(RecordId::new(n.to_string())),
                    _ => None,
                };
            } else {
                record_fields.insert(key, Value::from(value));
            }
        }

        let id = id.ok_or_else(|| StoreError::parse("record row has no usable \"id\""))?;
        Ok(Self {
            kind,
            id,
            fields: record_fields,
        })
    }
}
