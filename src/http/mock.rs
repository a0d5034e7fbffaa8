//! Scripted transport for module tests
//!
//! Records every call as `{method, path, params}` and replays queued
//! responses in order; when the queue runs dry it answers `{}`, which is
//! what the service returns for bodyless successes.

use super::HttpTransport;
use crate::error::{ApiError, Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One captured call
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CallLog {
    pub method: Method,
    pub path: String,
    pub params: Value,
}

/// In-memory transport that records calls and replays scripted responses
#[derive(Default)]
pub(crate) struct MockTransport {
    logs: Mutex<Vec<CallLog>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn enqueue(&self, response: Value) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn enqueue_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Queue a service error with the given status and code
    pub fn enqueue_api_error(&self, status: u16, code: &str, message: &str) {
        self.enqueue_error(Error::Api(ApiError {
            status,
            code: code.to_string(),
            message: message.to_string(),
            error_id: None,
        }));
    }

    /// All calls captured so far
    pub fn logs(&self) -> Vec<CallLog> {
        self.logs.lock().unwrap().clone()
    }

    /// Number of calls captured so far
    pub fn call_count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn call(&self, method: Method, path: &str, params: Value) -> Result<Value> {
        self.logs.lock().unwrap().push(CallLog {
            method,
            path: path.to_string(),
            params,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Object(serde_json::Map::new())))
    }
}
