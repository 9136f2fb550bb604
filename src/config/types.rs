//! Raw connection config: a flat set of optional fields, loaded once and then immutable.

use serde::{Deserialize, Serialize};

/// API version used when the config does not set one.
pub const DEFAULT_API_VERSION: &str = "43.0";

/// Client identifier sent to Salesforce when the config does not set one.
pub const DEFAULT_CLIENT_ID: &str = "salesforce-tables";

/// How remote field and object names are exposed locally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `AccountId` -> `account_id`, custom fields lowercased.
    #[default]
    SnakeCase,
    /// Remote names kept verbatim.
    ApiNative,
}

impl std::str::FromStr for NamingConvention {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snake_case" => Ok(NamingConvention::SnakeCase),
            "api_native" => Ok(NamingConvention::ApiNative),
            _ => Err(crate::error::ConfigError::Load(format!(
                "invalid naming_convention: {} (expected snake_case or api_native)",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Instance URL, e.g. https://mycompany.my.salesforce.com
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Security token appended to the password; only needed outside trusted IP ranges.
    #[serde(default)]
    pub token: Option<String>,
    /// Pre-obtained bearer token. Cannot be refreshed.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Inline PEM RSA key for the JWT bearer flow. Wins over `private_key_file`.
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub private_key_file: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Object types exposed as dynamic tables.
    #[serde(default)]
    pub objects: Option<Vec<String>>,
    #[serde(default)]
    pub naming_convention: Option<NamingConvention>,
}

impl ConnectionConfig {
    pub fn api_version(&self) -> &str {
        non_empty(&self.api_version).unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn client_id(&self) -> &str {
        non_empty(&self.client_id).unwrap_or(DEFAULT_CLIENT_ID)
    }

    pub fn naming_convention(&self) -> NamingConvention {
        self.naming_convention.unwrap_or_default()
    }

    pub fn objects(&self) -> &[String] {
        self.objects.as_deref().unwrap_or(&[])
    }
}

/// `Some(s)` only when the field is set and non-empty.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
