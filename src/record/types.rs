//! Request parameters and wire payloads for record operations

use crate::types::{stringified, AppId, Record, RecordId, RecordStamp, Revision};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Single-record payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GetRecordResponse {
    pub record: Record,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddRecordResponse {
    #[serde(with = "stringified")]
    pub id: RecordId,
    #[serde(with = "stringified")]
    pub revision: Revision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionResponse {
    #[serde(with = "stringified")]
    pub revision: Revision,
}

// ============================================================================
// Multi-record payloads
// ============================================================================

/// Parameters for a single-page record query
#[derive(Debug, Clone)]
pub struct GetRecordsParams {
    /// Target app
    pub app: AppId,
    /// Field codes to return; `None` returns all fields
    pub fields: Option<Vec<String>>,
    /// Query expression (condition, ordering, limit/offset)
    pub query: Option<String>,
    /// Ask the service to count all matching records
    pub total_count: bool,
}

impl GetRecordsParams {
    /// Query all fields of every record in `app`
    pub fn new(app: AppId) -> Self {
        Self {
            app,
            fields: None,
            query: None,
            total_count: false,
        }
    }

    /// Restrict the returned fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Set the query expression
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Request the total matching count alongside the page
    #[must_use]
    pub fn with_total_count(mut self) -> Self {
        self.total_count = true;
        self
    }
}

/// One page of records, with the total count when it was requested
#[derive(Debug, Clone, Deserialize)]
pub struct GetRecordsResponse {
    /// The records of this page
    pub records: Vec<Record>,
    /// Total matching records, when `totalCount` was requested
    #[serde(rename = "totalCount", default, with = "stringified::option")]
    pub total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddRecordsResponse {
    #[serde(with = "stringified::vec")]
    pub ids: Vec<RecordId>,
    #[serde(with = "stringified::vec")]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateRecordsResponse {
    pub records: Vec<RecordStamp>,
}

// ============================================================================
// Update targets
// ============================================================================

/// How an update addresses its record: by id, or by a unique-key field
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateTarget {
    /// Address by record id
    Id(RecordId),
    /// Address by the value of a field with the unique constraint
    Key {
        /// Field code of the unique-key field
        field: String,
        /// Key value identifying the record
        value: serde_json::Value,
    },
}

impl UpdateTarget {
    /// Address by unique-key field
    pub fn key(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::Key {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One operation of a bulk update
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    /// Which record to update
    pub target: UpdateTarget,
    /// Field values to write
    pub record: Record,
    /// Expected revision; the service rejects the update if it is stale
    pub revision: Option<Revision>,
}

impl RecordUpdate {
    /// Update a record addressed by id
    pub fn by_id(id: RecordId, record: Record) -> Self {
        Self {
            target: UpdateTarget::Id(id),
            record,
            revision: None,
        }
    }

    /// Update a record addressed by a unique-key field
    pub fn by_key(
        field: impl Into<String>,
        value: impl Into<serde_json::Value>,
        record: Record,
    ) -> Self {
        Self {
            target: UpdateTarget::key(field, value),
            record,
            revision: None,
        }
    }

    /// Guard the update with an expected revision
    #[must_use]
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }
}

impl Serialize for RecordUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.target {
            UpdateTarget::Id(id) => map.serialize_entry("id", &id.to_string())?,
            UpdateTarget::Key { field, value } => map.serialize_entry(
                "updateKey",
                &serde_json::json!({"field": field, "value": value}),
            )?,
        }
        map.serialize_entry("record", &self.record)?;
        if let Some(revision) = self.revision {
            map.serialize_entry("revision", &revision.to_string())?;
        }
        map.end()
    }
}

// ============================================================================
// Process management
// ============================================================================

/// One status transition of a bulk status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusAction {
    /// Record to transition
    pub id: RecordId,
    /// Name of the process action to run
    pub action: String,
    /// Next assignee, when the destination status requires one
    pub assignee: Option<String>,
    /// Expected revision
    pub revision: Option<Revision>,
}

impl StatusAction {
    /// Run `action` on the record
    pub fn new(id: RecordId, action: impl Into<String>) -> Self {
        Self {
            id,
            action: action.into(),
            assignee: None,
            revision: None,
        }
    }

    /// Set the next assignee
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Guard the transition with an expected revision
    #[must_use]
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }
}

impl Serialize for StatusAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id.to_string())?;
        map.serialize_entry("action", &self.action)?;
        if let Some(assignee) = &self.assignee {
            map.serialize_entry("assignee", assignee)?;
        }
        if let Some(revision) = self.revision {
            map.serialize_entry("revision", &revision.to_string())?;
        }
        map.end()
    }
}

// ============================================================================
// Comments
// ============================================================================

/// A user, group, or organization mentioned in a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMention {
    /// Code of the mentioned entity
    pub code: String,
    /// Entity kind: `USER`, `GROUP`, or `ORGANIZATION`
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// Body of a new comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentContent {
    /// Comment text
    pub text: String,
    /// Entities to notify
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<CommentMention>,
}

impl CommentContent {
    /// A comment with no mentions
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mentions: Vec::new(),
        }
    }

    /// Mention an entity
    #[must_use]
    pub fn mention(mut self, code: impl Into<String>, entity_type: impl Into<String>) -> Self {
        self.mentions.push(CommentMention {
            code: code.into(),
            entity_type: entity_type.into(),
        });
        self
    }
}

/// Author of an existing comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentCreator {
    /// User code
    pub code: String,
    /// Display name
    pub name: String,
}

/// An existing comment on a record
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Comment id, ascending per record
    #[serde(with = "stringified")]
    pub id: u64,
    /// Comment text as stored, mentions included
    pub text: String,
    /// Creation timestamp, ISO 8601
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Comment author
    pub creator: CommentCreator,
    /// Mentioned entities
    #[serde(default)]
    pub mentions: Vec<CommentMention>,
}

/// Sort order for comment listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

/// Parameters for listing comments
#[derive(Debug, Clone)]
pub struct GetCommentsParams {
    /// Target app
    pub app: AppId,
    /// Target record
    pub record: RecordId,
    /// Sort order
    pub order: Option<CommentSortOrder>,
    /// Comments to skip
    pub offset: Option<u64>,
    /// Comments to return, at most 10
    pub limit: Option<u64>,
}

impl GetCommentsParams {
    /// List comments of one record with service defaults
    pub fn new(app: AppId, record: RecordId) -> Self {
        Self {
            app,
            record,
            order: None,
            offset: None,
            limit: None,
        }
    }

    /// Set the sort order
    #[must_use]
    pub fn with_order(mut self, order: CommentSortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Skip the first `offset` comments
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return at most `limit` comments
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of a record's comments
#[derive(Debug, Clone, Deserialize)]
pub struct GetCommentsResponse {
    /// The comments of this page
    pub comments: Vec<Comment>,
    /// Whether older comments exist beyond this page
    pub older: bool,
    /// Whether newer comments exist beyond this page
    pub newer: bool,
}
