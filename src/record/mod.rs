//! Record operations
//!
//! [`RecordClient`] is the public surface for everything record-shaped:
//! single-record CRUD, bulk writes chunked to the service's per-call limit,
//! streaming retrieval through the pagination strategies, plus comments and
//! process-management transitions. It holds no mutable state — one instance
//! can serve any number of concurrent operations; per-call state lives in
//! the planner and stream drivers it spins up.

mod bulk;
mod types;

pub use types::{
    Comment, CommentContent, CommentCreator, CommentMention, CommentSortOrder, GetCommentsParams,
    GetCommentsResponse, GetRecordsParams, GetRecordsResponse, RecordUpdate, StatusAction,
    UpdateTarget,
};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{api_path, call_json, HttpTransport};
use crate::pagination::{
    self, CreateCursorParams, Cursor, CursorPage, GetAllRecordsParams, RecordStream,
};
use crate::types::{AppId, Record, RecordId, RecordStamp, Revision};
use bulk::BatchPlanner;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use types::{
    AddRecordResponse, AddRecordsResponse, GetRecordResponse, RevisionResponse,
    UpdateRecordsResponse,
};

/// Record-level operations of one app deployment
#[derive(Clone)]
pub struct RecordClient {
    transport: Arc<dyn HttpTransport>,
    guest_space_id: Option<u64>,
    page_size: u32,
    chunk_limit: usize,
}

impl RecordClient {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            guest_space_id: config.guest_space_id,
            page_size: config.page_size,
            chunk_limit: config.chunk_limit,
        }
    }

    fn path(&self, endpoint: &str) -> String {
        api_path(endpoint, false, self.guest_space_id)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Value,
    ) -> Result<T> {
        call_json(
            self.transport.as_ref(),
            method,
            &self.path(endpoint),
            params,
        )
        .await
    }

    // ========================================================================
    // Single-record operations
    // ========================================================================

    /// Fetch one record by id
    pub async fn get_record(&self, app: AppId, id: RecordId) -> Result<Record> {
        let response: GetRecordResponse = self
            .call(Method::GET, "record", json!({"app": app, "id": id}))
            .await?;
        Ok(response.record)
    }

    /// Add one record
    pub async fn add_record(&self, app: AppId, record: Record) -> Result<RecordStamp> {
        let response: AddRecordResponse = self
            .call(Method::POST, "record", json!({"app": app, "record": record}))
            .await?;
        Ok(RecordStamp {
            id: response.id,
            revision: Some(response.revision),
        })
    }

    /// Update one record, addressed by id or unique key; returns the new revision
    pub async fn update_record(
        &self,
        app: AppId,
        target: UpdateTarget,
        record: Record,
        revision: Option<Revision>,
    ) -> Result<Revision> {
        let mut params = Map::new();
        params.insert("app".to_string(), app.into());
        match target {
            UpdateTarget::Id(id) => {
                params.insert("id".to_string(), id.into());
            }
            UpdateTarget::Key { field, value } => {
                params.insert(
                    "updateKey".to_string(),
                    json!({"field": field, "value": value}),
                );
            }
        }
        params.insert("record".to_string(), serde_json::to_value(record)?);
        if let Some(revision) = revision {
            params.insert("revision".to_string(), revision.into());
        }

        let response: RevisionResponse = self
            .call(Method::PUT, "record", Value::Object(params))
            .await?;
        Ok(response.revision)
    }

    /// Fetch a single page of records
    pub async fn get_records(&self, params: GetRecordsParams) -> Result<GetRecordsResponse> {
        let mut body = Map::new();
        body.insert("app".to_string(), params.app.into());
        if let Some(fields) = params.fields {
            body.insert("fields".to_string(), serde_json::to_value(fields)?);
        }
        if let Some(query) = params.query {
            body.insert("query".to_string(), query.into());
        }
        if params.total_count {
            body.insert("totalCount".to_string(), true.into());
        }

        self.call(Method::GET, "records", Value::Object(body)).await
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Add any number of records.
    ///
    /// The input is split into chunks of at most the configured chunk limit
    /// and submitted as one call per chunk. The merged result holds one
    /// stamp per input record, in input order. A mid-sequence failure
    /// surfaces as [`Error::PartialBatch`] carrying what was applied.
    pub async fn add_records(&self, app: AppId, records: Vec<Record>) -> Result<Vec<RecordStamp>> {
        let path = self.path("records");
        let transport = Arc::clone(&self.transport);

        BatchPlanner::new(self.chunk_limit)
            .execute(records, move |_, chunk| {
                let transport = Arc::clone(&transport);
                let path = path.clone();
                async move {
                    let value = transport
                        .call(Method::POST, &path, json!({"app": app, "records": chunk}))
                        .await?;
                    let response: AddRecordsResponse = serde_json::from_value(value)?;
                    if response.ids.len() != response.revisions.len() {
                        return Err(Error::decode(
                            "service returned mismatched ids and revisions",
                        ));
                    }
                    Ok(response
                        .ids
                        .into_iter()
                        .zip(response.revisions)
                        .map(|(id, revision)| RecordStamp {
                            id,
                            revision: Some(revision),
                        })
                        .collect())
                }
            })
            .await
    }

    /// Update any number of records, addressed by id or unique key.
    ///
    /// Chunking and failure behavior are the same as [`add_records`].
    ///
    /// [`add_records`]: RecordClient::add_records
    pub async fn update_records(
        &self,
        app: AppId,
        updates: Vec<RecordUpdate>,
    ) -> Result<Vec<RecordStamp>> {
        let path = self.path("records");
        let transport = Arc::clone(&self.transport);

        BatchPlanner::new(self.chunk_limit)
            .execute(updates, move |_, chunk| {
                let transport = Arc::clone(&transport);
                let path = path.clone();
                async move {
                    let value = transport
                        .call(Method::PUT, &path, json!({"app": app, "records": chunk}))
                        .await?;
                    let response: UpdateRecordsResponse = serde_json::from_value(value)?;
                    Ok(response.records)
                }
            })
            .await
    }

    /// Delete any number of records.
    ///
    /// When `revisions` is supplied it must align one-to-one with `ids`;
    /// the pairs stay together across chunk boundaries. Chunking and
    /// failure behavior are the same as [`add_records`].
    ///
    /// [`add_records`]: RecordClient::add_records
    pub async fn delete_records(
        &self,
        app: AppId,
        ids: Vec<RecordId>,
        revisions: Option<Vec<Revision>>,
    ) -> Result<()> {
        let items: Vec<(RecordId, Option<Revision>)> = match revisions {
            Some(revisions) => {
                if revisions.len() != ids.len() {
                    return Err(Error::config(format!(
                        "revisions must align one-to-one with ids: {} revisions for {} ids",
                        revisions.len(),
                        ids.len()
                    )));
                }
                ids.into_iter().zip(revisions.into_iter().map(Some)).collect()
            }
            None => ids.into_iter().map(|id| (id, None)).collect(),
        };

        let path = self.path("records");
        let transport = Arc::clone(&self.transport);

        BatchPlanner::new(self.chunk_limit)
            .execute(items, move |_, chunk| {
                let transport = Arc::clone(&transport);
                let path = path.clone();
                async move {
                    let stamps: Vec<RecordStamp> = chunk
                        .iter()
                        .map(|(id, _)| RecordStamp {
                            id: *id,
                            revision: None,
                        })
                        .collect();

                    let mut body = Map::new();
                    body.insert("app".to_string(), app.into());
                    body.insert(
                        "ids".to_string(),
                        chunk.iter().map(|(id, _)| *id).collect::<Vec<_>>().into(),
                    );
                    if chunk.iter().any(|(_, revision)| revision.is_some()) {
                        // Absent revisions skip the concurrency check for
                        // that record, which the service spells -1.
                        body.insert(
                            "revisions".to_string(),
                            chunk
                                .iter()
                                .map(|(_, revision)| revision.map_or(-1, |r| r as i64))
                                .collect::<Vec<_>>()
                                .into(),
                        );
                    }

                    transport
                        .call(Method::DELETE, &path, Value::Object(body))
                        .await?;
                    Ok(stamps)
                }
            })
            .await?;

        Ok(())
    }

    // ========================================================================
    // Streaming retrieval
    // ========================================================================

    /// Open a lazy stream over every matching record.
    ///
    /// The strategy in `params` decides how pages are addressed; see
    /// [`PaginationStrategy`] for the trade-offs.
    ///
    /// [`PaginationStrategy`]: crate::pagination::PaginationStrategy
    pub async fn stream_records(&self, params: GetAllRecordsParams) -> Result<RecordStream> {
        RecordStream::open(
            Arc::clone(&self.transport),
            self.guest_space_id,
            self.page_size,
            params,
        )
        .await
    }

    /// Fetch every matching record eagerly, in traversal order
    pub async fn get_all_records(&self, params: GetAllRecordsParams) -> Result<Vec<Record>> {
        self.stream_records(params).await?.fetch_all().await
    }

    // ========================================================================
    // Cursor primitives
    // ========================================================================

    /// Create a service-side cursor; prefer [`stream_records`] unless the
    /// cursor lifecycle must be driven by hand
    ///
    /// [`stream_records`]: RecordClient::stream_records
    pub async fn create_cursor(&self, params: CreateCursorParams) -> Result<Cursor> {
        pagination::create_cursor(
            self.transport.as_ref(),
            self.guest_space_id,
            &params,
            self.page_size,
        )
        .await
    }

    /// Fetch the next page of a cursor
    pub async fn get_records_by_cursor(&self, cursor_id: &str) -> Result<CursorPage> {
        pagination::fetch_cursor_page(self.transport.as_ref(), self.guest_space_id, cursor_id).await
    }

    /// Delete a cursor before it is exhausted
    pub async fn delete_cursor(&self, cursor_id: &str) -> Result<()> {
        pagination::release_cursor(self.transport.as_ref(), self.guest_space_id, cursor_id).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// List the comments of one record
    pub async fn get_comments(&self, params: GetCommentsParams) -> Result<GetCommentsResponse> {
        let mut body = Map::new();
        body.insert("app".to_string(), params.app.into());
        body.insert("record".to_string(), params.record.into());
        if let Some(order) = params.order {
            body.insert("order".to_string(), serde_json::to_value(order)?);
        }
        if let Some(offset) = params.offset {
            body.insert("offset".to_string(), offset.into());
        }
        if let Some(limit) = params.limit {
            body.insert("limit".to_string(), limit.into());
        }

        self.call(Method::GET, "record/comments", Value::Object(body))
            .await
    }

    /// Post a comment on a record; returns the comment id
    pub async fn add_comment(
        &self,
        app: AppId,
        record: RecordId,
        comment: CommentContent,
    ) -> Result<u64> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(with = "crate::types::stringified")]
            id: u64,
        }

        let response: Response = self
            .call(
                Method::POST,
                "record/comment",
                json!({"app": app, "record": record, "comment": comment}),
            )
            .await?;
        Ok(response.id)
    }

    /// Delete a comment
    pub async fn delete_comment(&self, app: AppId, record: RecordId, comment: u64) -> Result<()> {
        self.transport
            .call(
                Method::DELETE,
                &self.path("record/comment"),
                json!({"app": app, "record": record, "comment": comment}),
            )
            .await?;
        Ok(())
    }

    // ========================================================================
    // Process management
    // ========================================================================

    /// Replace the assignees of one record; returns the new revision
    pub async fn update_assignees(
        &self,
        app: AppId,
        id: RecordId,
        assignees: Vec<String>,
        revision: Option<Revision>,
    ) -> Result<Revision> {
        let mut body = Map::new();
        body.insert("app".to_string(), app.into());
        body.insert("id".to_string(), id.into());
        body.insert("assignees".to_string(), serde_json::to_value(assignees)?);
        if let Some(revision) = revision {
            body.insert("revision".to_string(), revision.into());
        }

        let response: RevisionResponse = self
            .call(Method::PUT, "record/assignees", Value::Object(body))
            .await?;
        Ok(response.revision)
    }

    /// Run one process action on one record; returns the new revision
    pub async fn update_status(&self, app: AppId, action: StatusAction) -> Result<Revision> {
        let mut body = Map::new();
        body.insert("app".to_string(), app.into());
        body.insert("id".to_string(), action.id.into());
        body.insert("action".to_string(), action.action.into());
        if let Some(assignee) = action.assignee {
            body.insert("assignee".to_string(), assignee.into());
        }
        if let Some(revision) = action.revision {
            body.insert("revision".to_string(), revision.into());
        }

        let response: RevisionResponse = self
            .call(Method::PUT, "record/status", Value::Object(body))
            .await?;
        Ok(response.revision)
    }

    /// Run process actions on any number of records.
    ///
    /// Chunking and failure behavior are the same as [`add_records`].
    ///
    /// [`add_records`]: RecordClient::add_records
    pub async fn update_statuses(
        &self,
        app: AppId,
        actions: Vec<StatusAction>,
    ) -> Result<Vec<RecordStamp>> {
        let path = self.path("records/status");
        let transport = Arc::clone(&self.transport);

        BatchPlanner::new(self.chunk_limit)
            .execute(actions, move |_, chunk| {
                let transport = Arc::clone(&transport);
                let path = path.clone();
                async move {
                    let value = transport
                        .call(Method::PUT, &path, json!({"app": app, "records": chunk}))
                        .await?;
                    let response: UpdateRecordsResponse = serde_json::from_value(value)?;
                    Ok(response.records)
                }
            })
            .await
    }
}

impl std::fmt::Debug for RecordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordClient")
            .field("guest_space_id", &self.guest_space_id)
            .field("page_size", &self.page_size)
            .field("chunk_limit", &self.chunk_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
