//! Header construction for each auth variant

use super::types::AuthConfig;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

/// Header carrying one or more API tokens
pub const API_TOKEN_HEADER: &str = "X-Cybozu-API-Token";

/// Header carrying base64-encoded password credentials
pub const PASSWORD_AUTH_HEADER: &str = "X-Cybozu-Authorization";

/// Marker header the service requires on session-authenticated requests
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Header carrying the ambient anti-CSRF request token
pub const REQUEST_TOKEN_HEADER: &str = "X-Cybozu-RequestToken";

/// Build the header set for one auth configuration.
///
/// `request_token` is the ambient anti-CSRF token the hosting environment
/// hands out at call time; it is injected explicitly so the builder stays a
/// pure function. When the deployment requires a token and none is supplied
/// the service rejects the request — that is a caller error, not a builder
/// error, so no check happens here.
pub fn build_headers(
    auth: &AuthConfig,
    request_token: Option<&str>,
) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();

    match auth {
        AuthConfig::ApiToken { tokens } => {
            if tokens.is_empty() {
                return Err(Error::config("at least one API token is required"));
            }
            headers.insert(API_TOKEN_HEADER.to_string(), tokens.header_value());
        }
        AuthConfig::Password { username, password } => {
            if username.is_empty() || password.is_empty() {
                return Err(Error::config("username and password must be non-empty"));
            }
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            headers.insert(PASSWORD_AUTH_HEADER.to_string(), encoded);
        }
        AuthConfig::Session => {
            headers.insert(
                REQUESTED_WITH_HEADER.to_string(),
                "XMLHttpRequest".to_string(),
            );
        }
    }

    if let Some(token) = request_token {
        headers.insert(
            REQUESTED_WITH_HEADER.to_string(),
            "XMLHttpRequest".to_string(),
        );
        headers.insert(REQUEST_TOKEN_HEADER.to_string(), token.to_string());
    }

    Ok(headers)
}
