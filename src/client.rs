//! Top-level client
//!
//! [`KintoneClient`] owns one immutable configuration and one transport for
//! its whole lifetime. It hands out [`RecordClient`] facades that share the
//! transport, and exposes a raw [`call`] escape hatch for endpoints without
//! a dedicated wrapper (app settings, ACLs, views, and the rest of the
//! configuration surface), including their preview/draft forms via
//! [`api_path`].
//!
//! [`call`]: KintoneClient::call
//! [`api_path`]: KintoneClient::api_path

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{self, HttpTransport, KintoneHttpClient};
use crate::record::RecordClient;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Client for one app deployment.
///
/// Holds no mutable state, so a single instance can be shared freely across
/// concurrent operations.
#[derive(Debug)]
pub struct KintoneClient {
    transport: Arc<KintoneHttpClient>,
    config: ClientConfig,
}

impl KintoneClient {
    /// Create a client. Configuration problems — contradictory auth, limits
    /// outside the service's range, an unparseable base URL — surface here,
    /// before any network call.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(KintoneHttpClient::new(&config)?);
        Ok(Self { transport, config })
    }

    /// Record-level operations
    pub fn record(&self) -> RecordClient {
        let transport: Arc<dyn HttpTransport> = self.transport.clone();
        RecordClient::new(transport, &self.config)
    }

    /// Raw API call for endpoints without a dedicated wrapper
    pub async fn call(&self, method: Method, path: &str, params: Value) -> Result<Value> {
        self.transport.call(method, path, params).await
    }

    /// Build an endpoint path, optionally addressing the app's unreleased
    /// (preview) configuration, honoring the configured guest space
    pub fn api_path(&self, endpoint: &str, preview: bool) -> String {
        http::api_path(endpoint, preview, self.config.guest_space_id)
    }

    /// The client's configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
