//! Authentication method selection: fixed precedence over which credential fields are set.

use crate::config::types::{non_empty, ConnectionConfig};
use crate::error::ConfigError;

/// Where the RSA key for the JWT bearer flow comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrivateKeySource {
    Inline(String),
    File(String),
}

/// The single active authentication method of a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    AccessToken {
        instance_url: String,
        access_token: String,
    },
    RefreshToken {
        instance_url: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    JwtBearer {
        instance_url: String,
        client_id: String,
        username: String,
        key: PrivateKeySource,
    },
    Password {
        instance_url: String,
        username: String,
        password: String,
        security_token: Option<String>,
    },
}

/// Method tag kept with a session, without any secrets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthKind {
    AccessToken,
    RefreshToken,
    JwtBearer,
    Password,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::AccessToken => "access_token",
            AuthKind::RefreshToken => "refresh_token",
            AuthKind::JwtBearer => "jwt",
            AuthKind::Password => "password",
        }
    }
}

impl AuthMethod {
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthMethod::AccessToken { .. } => AuthKind::AccessToken,
            AuthMethod::RefreshToken { .. } => AuthKind::RefreshToken,
            AuthMethod::JwtBearer { .. } => AuthKind::JwtBearer,
            AuthMethod::Password { .. } => AuthKind::Password,
        }
    }
}

fn required(field: &Option<String>, method: &'static str, name: &'static str) -> Result<String, ConfigError> {
    non_empty(field)
        .map(str::to_string)
        .ok_or(ConfigError::MissingField { method, field: name })
}

/// Pick the active method. First satisfied branch wins:
/// access_token > refresh_token > private_key/private_key_file > username/password.
pub fn resolve_auth_method(config: &ConnectionConfig) -> Result<AuthMethod, ConfigError> {
    if let Some(access_token) = non_empty(&config.access_token) {
        return Ok(AuthMethod::AccessToken {
            instance_url: required(&config.url, "access_token", "url")?,
            access_token: access_token.to_string(),
        });
    }

    if let Some(refresh_token) = non_empty(&config.refresh_token) {
        return Ok(AuthMethod::RefreshToken {
            instance_url: required(&config.url, "refresh_token", "url")?,
            client_id: required(&config.client_id, "refresh_token", "client_id")?,
            client_secret: required(&config.client_secret, "refresh_token", "client_secret")?,
            refresh_token: refresh_token.to_string(),
        });
    }

    let inline_key = non_empty(&config.private_key);
    let key_file = non_empty(&config.private_key_file);
    if inline_key.is_some() || key_file.is_some() {
        let instance_url = required(&config.url, "jwt", "url")?;
        let username = required(&config.username, "jwt", "username")?;
        let client_id = required(&config.client_id, "jwt", "client_id")?;
        let key = match (inline_key, key_file) {
            (Some(pem), _) => PrivateKeySource::Inline(pem.to_string()),
            (None, Some(path)) => PrivateKeySource::File(path.to_string()),
            (None, None) => return Err(ConfigError::MissingPrivateKey),
        };
        return Ok(AuthMethod::JwtBearer {
            instance_url,
            client_id,
            username,
            key,
        });
    }

    if let (Some(username), Some(password)) = (non_empty(&config.username), non_empty(&config.password)) {
        return Ok(AuthMethod::Password {
            instance_url: required(&config.url, "password", "url")?,
            username: username.to_string(),
            password: password.to_string(),
            security_token: non_empty(&config.token).map(str::to_string),
        });
    }

    Err(ConfigError::NoCredentials)
}
