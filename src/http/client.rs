//! HTTP client for the kintone REST API
//!
//! Wraps reqwest and handles:
//! - Auth headers attached to every request
//! - Automatic retries with configurable backoff
//! - Rate limiting to stay under the service's request ceiling
//! - Error-body classification for non-2xx responses
//! - The method-override fallback for oversized GET query strings

use super::params::flatten_params;
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::HttpTransport;
use crate::auth::build_headers;
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// GET requests whose encoded URL grows past this many bytes are re-issued
/// as POST with an `X-HTTP-Method-Override: GET` header and a JSON body,
/// which the service accepts for exactly this case.
const METHOD_OVERRIDE_THRESHOLD: usize = 4096;

/// Transport-level configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration; `None` disables pacing
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("kintone-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Production transport on top of reqwest.
///
/// The auth header set is built once at construction from the immutable
/// auth configuration and attached to every call.
pub struct KintoneHttpClient {
    client: Client,
    base_url: Url,
    default_headers: HashMap<String, String>,
    config: HttpConfig,
    rate_limiter: Option<RateLimiter>,
}

impl KintoneHttpClient {
    /// Create a transport for the given client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let default_headers = build_headers(&config.auth, config.request_token.as_deref())?;
        let client = Client::builder()
            .timeout(config.http.timeout)
            .user_agent(&config.http.user_agent)
            .build()
            .map_err(Error::Http)?;
        let rate_limiter = config.http.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            base_url,
            default_headers,
            config: config.http.clone(),
            rate_limiter,
        })
    }

    /// Headers attached to every request
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Decide URL, body and method for one call.
    ///
    /// GET parameters ride in the query string until the encoded URL passes
    /// [`METHOD_OVERRIDE_THRESHOLD`]; past that the call becomes a POST with
    /// a method-override header.
    fn plan_request(
        &self,
        method: Method,
        path: &str,
        params: Value,
    ) -> Result<(Method, Url, Option<Value>, bool)> {
        let url = self.endpoint_url(path)?;

        if method != Method::GET {
            return Ok((method, url, Some(params), false));
        }

        let mut query_url = url.clone();
        query_url
            .query_pairs_mut()
            .extend_pairs(flatten_params(&params));

        if query_url.as_str().len() > METHOD_OVERRIDE_THRESHOLD {
            debug!(path, "query string over limit, switching to method override");
            return Ok((Method::POST, url, Some(params), true));
        }

        Ok((Method::GET, query_url, None, false))
    }

    async fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        override_get: bool,
    ) -> Result<Value> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.request(method.clone(), url.clone());
            for (key, value) in &self.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }
            if override_get {
                req = req.header("X-HTTP-Method-Override", "GET");
            }
            if let Some(ref body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = extract_retry_after(&response);
                        if attempt < max_retries {
                            warn!(
                                attempt = attempt + 1,
                                retry_after, "rate limited by service, backing off"
                            );
                            tokio::time::sleep(Duration::from_secs(retry_after)).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(Error::RateLimited {
                            retry_after_seconds: retry_after,
                        });
                    }

                    if is_retryable_status(status) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            ?delay,
                            "request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Api(ApiError::from_body(status.as_u16(), "")));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(classify_error(status, response).await);
                    }

                    debug!(%method, %url, "request succeeded");
                    return parse_body(response).await;
                }
                Err(e) => {
                    if e.is_timeout() {
                        let timeout_ms = self.config.timeout.as_millis() as u64;
                        if attempt < max_retries {
                            let delay = self.calculate_backoff(attempt);
                            warn!(attempt = attempt + 1, ?delay, "request timeout, retrying");
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            last_error = Some(Error::Timeout { timeout_ms });
                            continue;
                        }
                        return Err(Error::Timeout { timeout_ms });
                    }

                    if e.is_connect() && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(attempt = attempt + 1, ?delay, "connection error, retrying");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Http(e));
                        continue;
                    }

                    return Err(Error::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    /// Calculate backoff delay for a given attempt
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl HttpTransport for KintoneHttpClient {
    async fn call(&self, method: Method, path: &str, params: Value) -> Result<Value> {
        let (method, url, body, override_get) = self.plan_request(method, path, params)?;
        self.dispatch(method, url, body, override_get).await
    }
}

impl std::fmt::Debug for KintoneHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KintoneHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Parse a successful response body; empty bodies become an empty object
async fn parse_body(response: Response) -> Result<Value> {
    let text = response.text().await.map_err(Error::Http)?;
    if text.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str(&text)?)
}

/// Turn a non-2xx response into a classified error
async fn classify_error(status: StatusCode, response: Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    Error::Api(ApiError::from_body(status.as_u16(), &body))
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
