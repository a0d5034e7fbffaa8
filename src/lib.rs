// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # kintone-client
//!
//! A Rust client for the kintone REST API. Record CRUD, bulk mutation, and
//! cursor-based streaming, with the service's hard limits (records per bulk
//! call, cursor lifetime, page sizes) handled transparently — "add 10,000
//! records" and "stream every matching record" are single logical calls.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use kintone_client::{AuthConfig, ClientConfig, GetAllRecordsParams, KintoneClient};
//!
//! #[tokio::main]
//! async fn main() -> kintone_client::Result<()> {
//!     let config = ClientConfig::builder(
//!         "https://example.cybozu.com",
//!         AuthConfig::api_token("YOUR_API_TOKEN"),
//!     )
//!     .build()?;
//!     let client = KintoneClient::new(config)?;
//!
//!     // Stream every matching record through a service-side cursor
//!     let records = client
//!         .record()
//!         .get_all_records(GetAllRecordsParams::new(8).with_condition("Customer != \"foo\""))
//!         .await?;
//!
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        KintoneClient                            │
//! │   record() → RecordClient          call() → raw endpoint access │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │
//! ┌──────────┬─────────────────┴───────────┬─────────────────────────┐
//! │   Auth   │          Bulk               │        Paginate         │
//! ├──────────┼─────────────────────────────┼─────────────────────────┤
//! │ APIToken │ chunk ≤ 100 per call        │ Cursor (auto-release)   │
//! │ Password │ ordered merge               │ IdWatermark             │
//! │ Session  │ partial-failure reporting   │ Offset                  │
//! └──────────┴──────────────┬──────────────┴─────────────────────────┘
//!                           │
//!                  ┌────────┴────────┐
//!                  │  HttpTransport  │  retry · backoff · rate limit
//!                  └─────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication header construction
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Streaming record retrieval strategies
pub mod pagination;

/// Record operations: CRUD, bulk writes, comments, process management
pub mod record;

/// Client configuration
pub mod config;

/// Top-level client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{ApiTokens, AuthConfig};
pub use client::KintoneClient;
pub use config::{ClientConfig, ClientConfigBuilder, MAX_PAGE_SIZE, MAX_RECORDS_PER_CALL};
pub use error::{ApiError, Error, PartialBatchFailure, Result};
pub use pagination::{
    CreateCursorParams, Cursor, CursorPage, GetAllRecordsParams, PaginationStrategy, RecordStream,
};
pub use record::{
    GetRecordsParams, GetRecordsResponse, RecordClient, RecordUpdate, StatusAction, UpdateTarget,
};
pub use types::{AppId, FieldValue, Record, RecordId, RecordStamp, Revision};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
