//! Streaming drivers for the three pagination strategies
//!
//! Every strategy yields the same thing: a lazy, finite, one-shot sequence
//! of record pages. What differs is how the next page is addressed — a
//! service-side cursor, an `$id` watermark, or a plain offset — and what
//! lifecycle bookkeeping that requires.

use super::types::{
    contains_order_by, cursor_query, id_page_query, offset_page_query, CreateCursorParams, Cursor,
    CursorPage, GetAllRecordsParams, PaginationStrategy,
};
use crate::config::MAX_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::http::{api_path, call_json, HttpTransport};
use crate::record::GetRecordsResponse;
use crate::types::{Record, RecordId};
use futures::Stream;
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Service error code for a cursor that is gone: expired, deleted, or never
/// created by this user
pub(crate) const CURSOR_GONE_CODE: &str = "GAIA_CO02";

// ============================================================================
// Cursor wire operations
// ============================================================================

pub(crate) async fn create_cursor(
    transport: &dyn HttpTransport,
    guest_space_id: Option<u64>,
    params: &CreateCursorParams,
    default_size: u32,
) -> Result<Cursor> {
    let mut body = Map::new();
    body.insert("app".to_string(), params.app.into());
    body.insert(
        "size".to_string(),
        params.size.unwrap_or(default_size).into(),
    );
    if let Some(fields) = &params.fields {
        body.insert("fields".to_string(), serde_json::to_value(fields)?);
    }
    if let Some(query) = &params.query {
        body.insert("query".to_string(), query.as_str().into());
    }

    call_json(
        transport,
        Method::POST,
        &api_path("records/cursor", false, guest_space_id),
        Value::Object(body),
    )
    .await
}

/// Fetch the next page of a cursor. A gone cursor surfaces as
/// [`Error::CursorExpired`] so callers can tell it apart from other API
/// failures and restart with a fresh strategy.
pub(crate) async fn fetch_cursor_page(
    transport: &dyn HttpTransport,
    guest_space_id: Option<u64>,
    cursor_id: &str,
) -> Result<CursorPage> {
    let result: Result<CursorPage> = call_json(
        transport,
        Method::GET,
        &api_path("records/cursor", false, guest_space_id),
        serde_json::json!({"id": cursor_id}),
    )
    .await;

    match result {
        Err(Error::Api(api)) if api.code == CURSOR_GONE_CODE => Err(Error::CursorExpired {
            cursor_id: cursor_id.to_string(),
        }),
        other => other,
    }
}

pub(crate) async fn release_cursor(
    transport: &dyn HttpTransport,
    guest_space_id: Option<u64>,
    cursor_id: &str,
) -> Result<()> {
    transport
        .call(
            Method::DELETE,
            &api_path("records/cursor", false, guest_space_id),
            serde_json::json!({"id": cursor_id}),
        )
        .await?;
    Ok(())
}

// ============================================================================
// RecordStream
// ============================================================================

/// A lazy, finite, one-shot sequence of record pages.
///
/// A fresh call to `stream_records` starts a fresh traversal; a consumed
/// stream cannot be replayed. Taking `&mut self` on [`next_page`] keeps
/// iteration strictly sequential — the service does not support advancing
/// one cursor from two sides.
///
/// [`next_page`]: RecordStream::next_page
pub struct RecordStream {
    inner: StreamKind,
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            StreamKind::Cursor(_) => "Cursor",
            StreamKind::Id(_) => "Id",
            StreamKind::Offset(_) => "Offset",
        };
        f.debug_struct("RecordStream")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

enum StreamKind {
    Cursor(CursorDriver),
    Id(IdWatermarkDriver),
    Offset(OffsetDriver),
}

impl RecordStream {
    pub(crate) async fn open(
        transport: Arc<dyn HttpTransport>,
        guest_space_id: Option<u64>,
        default_page_size: u32,
        params: GetAllRecordsParams,
    ) -> Result<Self> {
        let page_size = params.page_size.unwrap_or(default_page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        let inner = match params.strategy {
            PaginationStrategy::Cursor => {
                let create = CreateCursorParams {
                    app: params.app,
                    fields: params.fields,
                    query: cursor_query(params.condition.as_deref(), params.order_by.as_deref()),
                    size: Some(page_size),
                };
                StreamKind::Cursor(
                    CursorDriver::open(transport, guest_space_id, &create, page_size).await?,
                )
            }
            PaginationStrategy::IdWatermark => {
                if params.order_by.is_some() {
                    return Err(Error::config(
                        "id-watermark pagination imposes its own `$id asc` ordering and cannot take an order_by",
                    ));
                }
                if let Some(condition) = &params.condition {
                    if contains_order_by(condition) {
                        return Err(Error::config(
                            "the condition must not contain an ordering clause under id-watermark pagination",
                        ));
                    }
                }
                let fields = params.fields.map(|mut fields| {
                    // The watermark is read from each page, so `$id` must come back.
                    if !fields.iter().any(|field| field == "$id") {
                        fields.push("$id".to_string());
                    }
                    fields
                });
                StreamKind::Id(IdWatermarkDriver {
                    transport,
                    guest_space_id,
                    app: params.app,
                    fields,
                    condition: params.condition,
                    page_size,
                    watermark: 0,
                    done: false,
                })
            }
            PaginationStrategy::Offset => StreamKind::Offset(OffsetDriver {
                transport,
                guest_space_id,
                app: params.app,
                fields: params.fields,
                condition: params.condition,
                order_by: params.order_by,
                page_size,
                offset: 0,
                done: false,
            }),
        };

        Ok(Self { inner })
    }

    /// Total matching records, known only for cursor streams
    pub fn total_count(&self) -> Option<u64> {
        match &self.inner {
            StreamKind::Cursor(driver) => Some(driver.total_count),
            _ => None,
        }
    }

    /// The next page of records, or `None` once the stream is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        match &mut self.inner {
            StreamKind::Cursor(driver) => driver.next_page().await,
            StreamKind::Id(driver) => driver.next_page().await,
            StreamKind::Offset(driver) => driver.next_page().await,
        }
    }

    /// Eagerly drain the stream into one ordered sequence
    pub async fn fetch_all(mut self) -> Result<Vec<Record>> {
        let mut all = match self.total_count() {
            Some(total) => Vec::with_capacity(total as usize),
            None => Vec::new(),
        };
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }

    /// Adapt the page sequence into a `Stream` of individual records
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> {
        futures::stream::try_unfold(
            (self, VecDeque::new()),
            |(mut pages, mut buffer)| async move {
                loop {
                    if let Some(record) = buffer.pop_front() {
                        return Ok(Some((record, (pages, buffer))));
                    }
                    match pages.next_page().await? {
                        Some(page) => buffer.extend(page),
                        None => return Ok(None),
                    }
                }
            },
        )
    }
}

// ============================================================================
// Cursor driver
// ============================================================================

/// Cursor lifecycle: Active until the service reports exhaustion or expiry,
/// then terminal. Release happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Active,
    Expired,
    Released,
}

struct CursorDriver {
    transport: Arc<dyn HttpTransport>,
    guest_space_id: Option<u64>,
    cursor_id: String,
    total_count: u64,
    state: CursorState,
}

impl CursorDriver {
    async fn open(
        transport: Arc<dyn HttpTransport>,
        guest_space_id: Option<u64>,
        params: &CreateCursorParams,
        page_size: u32,
    ) -> Result<Self> {
        let cursor = create_cursor(transport.as_ref(), guest_space_id, params, page_size).await?;
        debug!(cursor = %cursor.id, total = cursor.total_count, "cursor created");
        Ok(Self {
            transport,
            guest_space_id,
            cursor_id: cursor.id,
            total_count: cursor.total_count,
            state: CursorState::Active,
        })
    }

    async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.state != CursorState::Active {
            return Ok(None);
        }

        let page = match fetch_cursor_page(
            self.transport.as_ref(),
            self.guest_space_id,
            &self.cursor_id,
        )
        .await
        {
            Ok(page) => page,
            Err(err) => {
                if matches!(err, Error::CursorExpired { .. }) {
                    // Terminal: restarting silently could duplicate or skip
                    // records if the dataset changed underneath the cursor.
                    self.state = CursorState::Expired;
                }
                return Err(err);
            }
        };

        if !page.next {
            self.release().await;
        }
        if page.records.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.records))
    }

    /// Best-effort release; the service reclaims unreleased cursors on its
    /// own, so a failure here is logged and swallowed.
    async fn release(&mut self) {
        if let Err(err) = release_cursor(
            self.transport.as_ref(),
            self.guest_space_id,
            &self.cursor_id,
        )
        .await
        {
            warn!(cursor = %self.cursor_id, error = %err, "failed to release cursor");
        }
        self.state = CursorState::Released;
    }
}

impl Drop for CursorDriver {
    /// A stream abandoned mid-iteration still releases its cursor,
    /// best-effort, when dropped inside a tokio runtime.
    fn drop(&mut self) {
        if self.state != CursorState::Active {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let transport = Arc::clone(&self.transport);
        let guest_space_id = self.guest_space_id;
        let cursor_id = std::mem::take(&mut self.cursor_id);
        handle.spawn(async move {
            if let Err(err) = release_cursor(transport.as_ref(), guest_space_id, &cursor_id).await {
                warn!(cursor = %cursor_id, error = %err, "failed to release abandoned cursor");
            }
        });
    }
}

// ============================================================================
// Id-watermark driver
// ============================================================================

struct IdWatermarkDriver {
    transport: Arc<dyn HttpTransport>,
    guest_space_id: Option<u64>,
    app: u64,
    fields: Option<Vec<String>>,
    condition: Option<String>,
    page_size: u32,
    watermark: RecordId,
    done: bool,
}

impl IdWatermarkDriver {
    async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.done {
            return Ok(None);
        }

        let query = id_page_query(self.condition.as_deref(), self.watermark, self.page_size);
        let page = fetch_records_page(
            self.transport.as_ref(),
            self.guest_space_id,
            self.app,
            self.fields.as_deref(),
            &query,
        )
        .await?;

        if page.records.len() < self.page_size as usize {
            self.done = true;
        }
        for record in &page.records {
            self.watermark = self.watermark.max(record_id(record)?);
        }
        debug!(
            app = self.app,
            watermark = self.watermark,
            records = page.records.len(),
            "id-watermark page fetched"
        );

        if page.records.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.records))
    }
}

// ============================================================================
// Offset driver
// ============================================================================

struct OffsetDriver {
    transport: Arc<dyn HttpTransport>,
    guest_space_id: Option<u64>,
    app: u64,
    fields: Option<Vec<String>>,
    condition: Option<String>,
    order_by: Option<String>,
    page_size: u32,
    offset: u64,
    done: bool,
}

impl OffsetDriver {
    async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.done {
            return Ok(None);
        }

        let query = offset_page_query(
            self.condition.as_deref(),
            self.order_by.as_deref(),
            self.page_size,
            self.offset,
        );
        let page = fetch_records_page(
            self.transport.as_ref(),
            self.guest_space_id,
            self.app,
            self.fields.as_deref(),
            &query,
        )
        .await?;

        if page.records.len() < self.page_size as usize {
            self.done = true;
        }
        self.offset += u64::from(self.page_size);

        if page.records.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.records))
    }
}

// ============================================================================
// Shared page fetch
// ============================================================================

async fn fetch_records_page(
    transport: &dyn HttpTransport,
    guest_space_id: Option<u64>,
    app: u64,
    fields: Option<&[String]>,
    query: &str,
) -> Result<GetRecordsResponse> {
    let mut params = Map::new();
    params.insert("app".to_string(), app.into());
    params.insert("query".to_string(), query.into());
    if let Some(fields) = fields {
        params.insert("fields".to_string(), serde_json::to_value(fields)?);
    }

    call_json(
        transport,
        Method::GET,
        &api_path("records", false, guest_space_id),
        Value::Object(params),
    )
    .await
}

/// Read the `$id` field the service stamps on every record
fn record_id(record: &Record) -> Result<RecordId> {
    let field = record
        .get("$id")
        .ok_or_else(|| Error::decode("record is missing the $id field"))?;
    match &field.value {
        Value::String(raw) => raw
            .parse()
            .map_err(|_| Error::decode(format!("record has an unparseable $id: {raw:?}"))),
        Value::Number(raw) => raw
            .as_u64()
            .ok_or_else(|| Error::decode(format!("record has an unparseable $id: {raw}"))),
        other => Err(Error::decode(format!(
            "record has an unparseable $id: {other}"
        ))),
    }
}
