//! HTTP transport layer
//!
//! One trait, [`HttpTransport`], is the seam between the record operations
//! and the network: a call is a method, an API path, and a parameter object,
//! and comes back as parsed JSON or a classified error. [`KintoneHttpClient`]
//! is the production implementation on top of reqwest, with retries, backoff,
//! and rate limiting; tests swap in a scripted transport instead.

mod client;
mod params;
mod path;
mod rate_limit;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpConfig, KintoneHttpClient};
pub use path::api_path;
pub use rate_limit::{RateLimiter, RateLimiterConfig};

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One HTTP call against the service.
///
/// `path` is the full API path (see [`api_path`]); `params` become the query
/// string on GET and the JSON body otherwise. Implementations attach the
/// client's auth headers to every call and return the parsed response body,
/// or a classified error for non-2xx responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the call and parse the response body as JSON
    async fn call(&self, method: Method, path: &str, params: Value) -> Result<Value>;
}

/// Perform a call and deserialize the response into a typed payload
pub(crate) async fn call_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    method: Method,
    path: &str,
    params: Value,
) -> Result<T> {
    let value = transport.call(method, path, params).await?;
    Ok(serde_json::from_value(value)?)
}
