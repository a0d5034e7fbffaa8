//! Common types used throughout the kintone client
//!
//! This module contains shared type definitions, type aliases,
//! and serde bridges used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// App identifier assigned by the service
pub type AppId = u64;

/// Record identifier assigned by the service
pub type RecordId = u64;

/// Optimistic-concurrency token attached to a record
pub type Revision = u64;

// ============================================================================
// Field Values
// ============================================================================

/// One field of a record: an optional field-type tag plus an opaque value.
///
/// The service transmits fields as `{"type": "...", "value": ...}` objects.
/// The client never interprets the value; it round-trips whatever shape the
/// service produced. Requests omit `type` (the service infers it from the
/// app's form definition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Field type tag, present on responses only
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// The raw field value
    #[serde(default)]
    pub value: serde_json::Value,
}

impl FieldValue {
    /// Create an untyped field value for a request
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            field_type: None,
            value: value.into(),
        }
    }

    /// The value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

/// A record: field values keyed by field code. Fields carry no ordering.
pub type Record = HashMap<String, FieldValue>;

// ============================================================================
// Record Stamps
// ============================================================================

/// Per-record outcome of a write: the record's id and, for operations that
/// bump it, the new revision. Deletions carry no revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStamp {
    /// The record's service-assigned id
    #[serde(with = "stringified")]
    pub id: RecordId,
    /// Revision after the write, if the operation produced one
    #[serde(default, skip_serializing_if = "Option::is_none", with = "stringified::option")]
    pub revision: Option<Revision>,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Stringified Integers
// ============================================================================

/// Serde bridge for integers the service transmits as JSON strings.
///
/// Responses carry ids and revisions as strings (`"10"`); requests accept
/// either form. Deserialization takes both, serialization emits strings to
/// match the wire format.
pub mod stringified {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(crate) enum NumOrStr {
        Num(u64),
        Str(String),
    }

    impl NumOrStr {
        pub(crate) fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
            match self {
                NumOrStr::Num(n) => Ok(n),
                NumOrStr::Str(s) => s
                    .parse()
                    .map_err(|_| E::custom(format!("invalid integer string: {s:?}"))),
            }
        }
    }

    /// Emit the integer as a JSON string
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accept a JSON string or number
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        NumOrStr::deserialize(deserializer)?.into_u64()
    }

    /// `Option<u64>` variant; `null` and absent map to `None`.
    pub mod option {
        use super::NumOrStr;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Emit the integer as a JSON string, or `null`
        pub fn serialize<S: Serializer>(
            value: &Option<u64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_str(&v.to_string()),
                None => serializer.serialize_none(),
            }
        }

        /// Accept a JSON string, number, or `null`
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            match Option::<NumOrStr>::deserialize(deserializer)? {
                Some(raw) => raw.into_u64().map(Some),
                None => Ok(None),
            }
        }
    }

    /// `Vec<u64>` variant for response arrays like `"ids": ["10", "11"]`.
    pub mod vec {
        use super::NumOrStr;
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Emit every integer as a JSON string
        pub fn serialize<S: Serializer>(values: &[u64], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&value.to_string())?;
            }
            seq.end()
        }

        /// Accept an array of JSON strings or numbers
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u64>, D::Error> {
            Vec::<NumOrStr>::deserialize(deserializer)?
                .into_iter()
                .map(NumOrStr::into_u64)
                .collect()
        }
    }
}
