//! Streaming record retrieval
//!
//! Three interchangeable strategies turn an unbounded result set into a
//! finite sequence of fixed-size pages:
//!
//! - **Cursor** — a service-side cursor over one consistent snapshot, with
//!   full lifecycle management (create, iterate, auto-release on exhaustion
//!   or abandonment, expiry surfaced as its own error)
//! - **IdWatermark** — repeated bounded queries ordered by `$id` ascending,
//!   each lower-bounded by the highest id already seen; immune to cursor
//!   expiry on long streams
//! - **Offset** — plain limit/offset paging; simplest, but records shifting
//!   during the traversal can cause skips or duplicates
//!
//! The strategy is chosen explicitly per stream; the trade-offs are the
//! caller's to accept.

mod strategies;
mod types;

pub use strategies::RecordStream;
pub use types::{
    CreateCursorParams, Cursor, CursorPage, GetAllRecordsParams, PaginationStrategy,
};

pub(crate) use strategies::{create_cursor, fetch_cursor_page, release_cursor};
