//! Client configuration
//!
//! One immutable [`ClientConfig`] per client instance: the host, exactly one
//! auth variant, the defaults the paginators and the bulk planner work with,
//! and the transport tuning knobs. Violations of the service's hard limits
//! are rejected at build time, before any network call.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpConfig, RateLimiterConfig};
use crate::types::BackoffType;
use std::time::Duration;

/// Largest page the service serves per cursor fetch or record query
pub const MAX_PAGE_SIZE: u32 = 500;

/// Most records one bulk add/update/delete call may carry
pub const MAX_RECORDS_PER_CALL: usize = 100;

/// Immutable configuration for one client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the deployment, e.g. `https://example.cybozu.com`
    pub base_url: String,
    /// Authentication variant
    pub auth: AuthConfig,
    /// Guest space the target apps live in, if any
    pub guest_space_id: Option<u64>,
    /// Ambient anti-CSRF request token supplied by the hosting environment
    pub request_token: Option<String>,
    /// Default page size for streaming retrieval
    pub page_size: u32,
    /// Default chunk size for bulk writes and deletes
    pub chunk_limit: usize,
    /// Transport tuning
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Start building a configuration
    pub fn builder(base_url: impl Into<String>, auth: AuthConfig) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                base_url: base_url.into(),
                auth,
                guest_space_id: None,
                request_token: None,
                page_size: MAX_PAGE_SIZE,
                chunk_limit: MAX_RECORDS_PER_CALL,
                http: HttpConfig::default(),
            },
        }
    }

    /// Check the configuration against the service's hard limits
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("base_url must not be empty"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.chunk_limit == 0 || self.chunk_limit > MAX_RECORDS_PER_CALL {
            return Err(Error::config(format!(
                "chunk_limit must be between 1 and {MAX_RECORDS_PER_CALL}, got {}",
                self.chunk_limit
            )));
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Address apps inside a guest space
    pub fn guest_space_id(mut self, space: u64) -> Self {
        self.config.guest_space_id = Some(space);
        self
    }

    /// Supply the ambient anti-CSRF request token
    pub fn request_token(mut self, token: impl Into<String>) -> Self {
        self.config.request_token = Some(token.into());
        self
    }

    /// Set the default page size for streaming retrieval
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the default chunk size for bulk writes and deletes
    pub fn chunk_limit(mut self, limit: usize) -> Self {
        self.config.chunk_limit = limit;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.http.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.http.backoff_type = backoff_type;
        self.config.http.initial_backoff = initial;
        self.config.http.max_backoff = max;
        self
    }

    /// Set the rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.http.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.http.rate_limit = None;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.http.user_agent = agent.into();
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
