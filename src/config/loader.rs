//! Load connection config from a JSON file, the process environment, or a `.env` file.

use crate::config::types::{ConnectionConfig, NamingConvention};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Environment variable prefix for every config field (SALESFORCE_URL, SALESFORCE_USERNAME, ...).
pub const ENV_PREFIX: &str = "SALESFORCE_";

/// Load config from a JSON file whose keys match the field names (url, username, access_token, ...).
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ConnectionConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config: ConnectionConfig =
        serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded connection config");
    Ok(config)
}

/// Load config from SALESFORCE_* variables of the process environment.
pub fn load_from_env() -> Result<ConnectionConfig, ConfigError> {
    let vars: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect();
    from_vars(&vars)
}

/// Load config from SALESFORCE_* entries of a `.env` file without touching the process environment.
pub fn load_from_dotenv(path: impl AsRef<Path>) -> Result<ConnectionConfig, ConfigError> {
    let path = path.as_ref();
    let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let mut vars = HashMap::new();
    for item in iter {
        let (k, v) = item.map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        if k.starts_with(ENV_PREFIX) {
            vars.insert(k, v);
        }
    }
    from_vars(&vars)
}

fn from_vars(vars: &HashMap<String, String>) -> Result<ConnectionConfig, ConfigError> {
    let get = |name: &str| {
        vars.get(&format!("{}{}", ENV_PREFIX, name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let objects = get("OBJECTS").map(|list| {
        list.split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
    });
    let naming_convention = get("NAMING_CONVENTION")
        .map(|s| s.parse::<NamingConvention>())
        .transpose()?;

    Ok(ConnectionConfig {
        url: get("URL"),
        username: get("USERNAME"),
        password: get("PASSWORD"),
        token: get("TOKEN"),
        access_token: get("ACCESS_TOKEN"),
        refresh_token: get("REFRESH_TOKEN"),
        client_secret: get("CLIENT_SECRET"),
        private_key: get("PRIVATE_KEY"),
        private_key_file: get("PRIVATE_KEY_FILE"),
        client_id: get("CLIENT_ID"),
        api_version: get("API_VERSION"),
        objects,
        naming_convention,
    })
}
