//! Record identity

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Which table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Shipment bookings (`registros`).
    Shipment,
    /// Ground transport legs (`transportes`).
    Transport,
}

impl RecordKind {
    /// Returns the store table name for this kind.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Shipment => "registros",
            RecordKind::Transport => "transportes",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Shipment => write!(f, "shipment"),
            RecordKind::Transport => write!(f, "transport"),
        }
    }
}

/// Opaque store identifier of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        Self(v)
    }
}
