//! Authentication
//!
//! kintone authenticates a client with exactly one of three header sets:
//! an API token header, a base64 password header, or the session markers a
//! browser-hosted deployment supplies. [`build_headers`] turns an
//! [`AuthConfig`] (plus the optional ambient anti-CSRF request token) into
//! the header map the transport attaches to every request.

mod headers;
mod types;

pub use headers::{
    build_headers, API_TOKEN_HEADER, PASSWORD_AUTH_HEADER, REQUESTED_WITH_HEADER,
    REQUEST_TOKEN_HEADER,
};
pub use types::{ApiTokens, AuthConfig};
