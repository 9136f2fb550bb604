//! Typed errors for configuration, authentication and remote calls.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{method} auth requires '{field}' to be set")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },
    #[error(
        "no valid authentication credentials configured; checked access_token, \
         refresh_token (with client_id/client_secret), private_key/private_key_file, \
         and username/password"
    )]
    NoCredentials,
    #[error("either private_key or private_key_file must be set")]
    MissingPrivateKey,
    #[error("failed to read private key file {path:?}: {source}")]
    PrivateKeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config load: {0}")]
    Load(String),
}

/// Failure reported by the remote API or the HTTP layer underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        RemoteError {
            status,
            message: message.into(),
        }
    }

    /// Error with no HTTP status (connect failures, unreadable bodies).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => {
                let reason = reqwest::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("");
                write!(f, "{} {}: {}", code, reason, self.message)
            }
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::new(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("access_token authentication cannot be refreshed automatically; supply a new access_token or configure another authentication method")]
    CannotRefresh,
    #[error("session expired after re-authentication: {0}")]
    SessionExpired(String),
    #[error("remote: {0}")]
    Remote(#[from] RemoteError),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
