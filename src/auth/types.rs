//! Auth configuration types

use crate::error::{Error, Result};

/// An ordered list of API tokens.
///
/// The service accepts several tokens on one request (e.g. when a lookup
/// field pulls from a second app). Callers hand tokens over as a single
/// token, a comma-separated string, or an explicit list; all three forms
/// normalize to the same ordered list. Order is preserved and duplicates
/// are not removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTokens(Vec<String>);

impl ApiTokens {
    /// Create from an explicit token list
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// The tokens joined with commas, in input order
    pub fn header_value(&self) -> String {
        self.0.join(",")
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no token was supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ApiTokens {
    fn from(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

impl From<String> for ApiTokens {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Vec<String>> for ApiTokens {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<Vec<&str>> for ApiTokens {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(String::from).collect())
    }
}

/// Authentication configuration; exactly one variant per client instance,
/// immutable for the client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// API token authentication
    ApiToken {
        /// One or more tokens, joined into a single header
        tokens: ApiTokens,
    },

    /// Username/password authentication
    Password {
        /// Login name
        username: String,
        /// Password
        password: String,
    },

    /// Session authentication: no credential header; the hosting browser
    /// session carries the identity and the request token carries CSRF proof
    Session,
}

impl AuthConfig {
    /// API token auth from any of the accepted token forms
    pub fn api_token(tokens: impl Into<ApiTokens>) -> Self {
        Self::ApiToken {
            tokens: tokens.into(),
        }
    }

    /// Password auth
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Session auth
    pub fn session() -> Self {
        Self::Session
    }

    /// Resolve a loosely-typed auth surface into exactly one variant.
    ///
    /// Supplying both an API token and password credentials is rejected as a
    /// configuration error rather than ranked; the service documents no
    /// precedence between them. Supplying nothing selects session auth.
    pub fn resolve(
        api_token: Option<ApiTokens>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        match (api_token, username, password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::config(
                "both an API token and password credentials were supplied; pick one",
            )),
            (Some(tokens), None, None) => {
                if tokens.is_empty() {
                    return Err(Error::config("at least one API token is required"));
                }
                Ok(Self::ApiToken { tokens })
            }
            (None, Some(username), Some(password)) => Ok(Self::Password { username, password }),
            (None, Some(_), None) | (None, None, Some(_)) => Err(Error::config(
                "username and password must be supplied together",
            )),
            (None, None, None) => Ok(Self::Session),
        }
    }
}
