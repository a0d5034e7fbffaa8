//! Pagination types and query composition
//!
//! The three strategies share one public contract but build their page
//! queries differently; the pure composition helpers live here so the
//! drivers stay thin.

use crate::types::{stringified, AppId, Record};
use serde::Deserialize;

/// Strategy for streaming a full result set.
///
/// The choice is the caller's: each strategy trades consistency against
/// robustness differently, and the engine never second-guesses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationStrategy {
    /// Service-side cursor: one consistent snapshot, but the cursor expires
    /// if iteration stalls
    #[default]
    Cursor,
    /// Bounded queries keyed on an ascending `$id` watermark: robust for
    /// long-running streams, imposes `$id` ordering
    IdWatermark,
    /// Plain limit/offset paging: records inserted or removed during the
    /// traversal can cause skips or duplicates
    Offset,
}

/// Parameters for streaming every matching record of an app
#[derive(Debug, Clone)]
pub struct GetAllRecordsParams {
    /// Target app
    pub app: AppId,
    /// Field codes to return; `None` returns all fields
    pub fields: Option<Vec<String>>,
    /// Filter condition, without ordering or limit clauses
    pub condition: Option<String>,
    /// Ordering clause, e.g. `"Customer desc"`; rejected by the
    /// id-watermark strategy, which imposes its own
    pub order_by: Option<String>,
    /// Pagination strategy
    pub strategy: PaginationStrategy,
    /// Page size override; the client default applies when `None`
    pub page_size: Option<u32>,
}

impl GetAllRecordsParams {
    /// Stream every record of `app` with the default (cursor) strategy
    pub fn new(app: AppId) -> Self {
        Self {
            app,
            fields: None,
            condition: None,
            order_by: None,
            strategy: PaginationStrategy::default(),
            page_size: None,
        }
    }

    /// Restrict the returned fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Filter the stream
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Order the stream
    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Pick the pagination strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: PaginationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the page size for this stream
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

// ============================================================================
// Cursor payloads
// ============================================================================

/// Parameters for creating a service-side cursor
#[derive(Debug, Clone)]
pub struct CreateCursorParams {
    /// Target app
    pub app: AppId,
    /// Field codes to return; `None` returns all fields
    pub fields: Option<Vec<String>>,
    /// Query expression (condition and ordering, no limit/offset)
    pub query: Option<String>,
    /// Records per fetch; the client default applies when `None`
    pub size: Option<u32>,
}

impl CreateCursorParams {
    /// Cursor over every record of `app`
    pub fn new(app: AppId) -> Self {
        Self {
            app,
            fields: None,
            query: None,
            size: None,
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

    /// Set the per-fetch page size
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

/// A service-side cursor handle
#[derive(Debug, Clone, Deserialize)]
pub struct Cursor {
    /// Opaque cursor id
    pub id: String,
    /// Total records the cursor will yield
    #[serde(rename = "totalCount", with = "stringified")]
    pub total_count: u64,
}

/// One fetch from a cursor
#[derive(Debug, Clone, Deserialize)]
pub struct CursorPage {
    /// The records of this fetch
    pub records: Vec<Record>,
    /// Whether more records remain on the cursor
    pub next: bool,
}

// ============================================================================
// Query composition
// ============================================================================

/// Compose the cursor-create query from a condition and an ordering clause
pub(crate) fn cursor_query(condition: Option<&str>, order_by: Option<&str>) -> Option<String> {
    match (condition, order_by) {
        (None, None) => None,
        (Some(condition), None) => Some(condition.to_string()),
        (None, Some(order_by)) => Some(format!("order by {order_by}")),
        (Some(condition), Some(order_by)) => Some(format!("{condition} order by {order_by}")),
    }
}

/// Compose one page query of the id-watermark strategy
pub(crate) fn id_page_query(condition: Option<&str>, watermark: u64, page_size: u32) -> String {
    let bound = match condition {
        Some(condition) => format!("({condition}) and $id > {watermark}"),
        None => format!("$id > {watermark}"),
    };
    format!("{bound} order by $id asc limit {page_size}")
}

/// Compose one page query of the offset strategy
pub(crate) fn offset_page_query(
    condition: Option<&str>,
    order_by: Option<&str>,
    page_size: u32,
    offset: u64,
) -> String {
    let mut query = String::new();
    if let Some(condition) = condition {
        query.push_str(condition);
        query.push(' ');
    }
    if let Some(order_by) = order_by {
        query.push_str("order by ");
        query.push_str(order_by);
        query.push(' ');
    }
    query.push_str(&format!("limit {page_size} offset {offset}"));
    query
}

/// Whether a caller-supplied condition smuggles in its own ordering clause
pub(crate) fn contains_order_by(condition: &str) -> bool {
    condition.to_ascii_lowercase().contains("order by")
}
