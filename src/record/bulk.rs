//! Chunked dispatch for bulk record operations
//!
//! The service caps every bulk call at a fixed number of records, so a
//! larger request is split into contiguous chunks and submitted as a
//! sequence of calls. Each call is atomic on the service side; the sequence
//! as a whole is not, which is why a mid-sequence failure carries the
//! results that were already applied.

use crate::error::{Error, Result};
use crate::types::RecordStamp;
use std::future::Future;
use tracing::debug;

/// Split `items` into contiguous chunks of at most `limit` elements.
///
/// Chunks partition the input in order: concatenating them reconstructs the
/// original sequence exactly, and an empty input yields no chunks.
pub(crate) fn split_chunks<T>(items: Vec<T>, limit: usize) -> Vec<Vec<T>> {
    debug_assert!(limit > 0);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(limit));
    let mut remaining = items.into_iter();
    loop {
        let chunk: Vec<T> = remaining.by_ref().take(limit).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}

/// Splits a bulk request into service-limit-sized chunks, submits them, and
/// merges the per-record results back into input order.
pub(crate) struct BatchPlanner {
    chunk_limit: usize,
}

impl BatchPlanner {
    pub fn new(chunk_limit: usize) -> Self {
        Self { chunk_limit }
    }

    /// Submit `items` chunk by chunk and merge the results.
    ///
    /// `submit` receives the chunk index and the chunk's operations and
    /// returns one stamp per operation, in the chunk's order. Chunks go out
    /// strictly in sequence, one in flight at a time; a failed chunk stops
    /// the sequence, so later chunks are never submitted. Because the chunks
    /// partition the input in order, the merged element at position *i*
    /// always corresponds to the operation at position *i*.
    ///
    /// An empty input returns an empty result without submitting anything.
    /// A failure after at least one applied chunk surfaces as
    /// [`Error::PartialBatch`] carrying the merged results so far.
    pub async fn execute<T, S, Fut>(&self, items: Vec<T>, mut submit: S) -> Result<Vec<RecordStamp>>
    where
        S: FnMut(usize, Vec<T>) -> Fut,
        Fut: Future<Output = Result<Vec<RecordStamp>>>,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let chunks = split_chunks(items, self.chunk_limit);
        let mut merged: Vec<RecordStamp> = Vec::with_capacity(total);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let expected = chunk.len();
            match submit(index, chunk).await {
                Ok(stamps) => {
                    if stamps.len() != expected {
                        return Err(Error::decode(format!(
                            "chunk {index} returned {} results for {expected} operations",
                            stamps.len()
                        )));
                    }
                    merged.extend(stamps);
                    debug!(chunk = index, records = expected, "bulk chunk applied");
                }
                Err(source) => {
                    return Err(Error::partial_batch(index, merged, source));
                }
            }
        }

        Ok(merged)
    }
}
