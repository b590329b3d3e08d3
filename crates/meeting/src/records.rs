//! Typed documents persisted by the booking service.
//!
//! The store only knows generic JSON objects. Each record type here owns its
//! field names and converts to and from [`Document`] through serde, so a
//! malformed stored document surfaces as [`MeetingError::MalformedDocument`]
//! at the boundary instead of deep inside the booking logic.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use evenday::TimeTable;

use crate::error::{MeetingError, Result};
use crate::store::Document;

/// Persisted field names shared by queries and records.
pub mod fields {
    pub const CREATED_BY: &str = "createdBy";
    pub const FOR_PROFESSIONAL: &str = "forProfessional";
    pub const PROFESSIONAL: &str = "professional";
    pub const FROM: &str = "from";
    pub const TO: &str = "to";
    pub const LENGTH: &str = "length";
    pub const DAY: &str = "day";
    pub const TIME_TABLE: &str = "timeTable";
}

/// Identity of a user, professional or client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&UserId> for Value {
    fn from(id: &UserId) -> Self {
        Value::String(id.0.clone())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ── Booking ─────────────────────────────────────────────────────────────────

/// A committed appointment. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// The caller who made the booking.
    pub created_by: UserId,
    /// The professional being booked.
    #[serde(rename = "forProfessional")]
    pub professional: UserId,
    /// Start, Unix seconds.
    pub from: i64,
    /// End, Unix seconds; always `from + length * 60`.
    pub to: i64,
    /// Length in minutes.
    pub length: i64,
    /// Calendar-date key of `from` (`YYYY.MM.DD`).
    pub day: String,
}

impl Booking {
    pub fn to_document(&self) -> Result<Document> {
        to_document(self)
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        from_document(doc, "booking")
    }
}

// ── TimeTable document ──────────────────────────────────────────────────────

/// The single timetable document a professional owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTableDocument {
    pub created_by: UserId,
    pub time_table: TimeTable,
}

impl TimeTableDocument {
    pub fn to_document(&self) -> Result<Document> {
        to_document(self)
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        from_document(doc, "timetable")
    }

    pub fn time_table(&self) -> &TimeTable {
        &self.time_table
    }
}

// ── Allowed length ──────────────────────────────────────────────────────────

/// One meeting length a professional accepts, configured outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedLength {
    pub professional: UserId,
    /// Minutes.
    pub length: i64,
}

impl AllowedLength {
    pub fn to_document(&self) -> Result<Document> {
        to_document(self)
    }
}

fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(MeetingError::MalformedDocument(format!(
            "expected an object, serialized to {other}"
        ))),
        Err(e) => Err(MeetingError::MalformedDocument(e.to_string())),
    }
}

fn from_document<T: DeserializeOwned>(doc: &Document, what: &str) -> Result<T> {
    T::deserialize(Value::Object(doc.clone()))
        .map_err(|e| MeetingError::MalformedDocument(format!("{what}: {e}")))
}
