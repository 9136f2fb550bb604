//! Authentication flows: OAuth token grants (refresh token, JWT bearer) and SOAP password login.

use super::Session;
use crate::config::{resolve_auth_method, AuthKind, AuthMethod, ConnectionConfig, PrivateKeySource};
use crate::error::{ConfigError, ConnectorError, RemoteError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Validity window of a signed JWT assertion.
pub const ASSERTION_LIFETIME_SECS: i64 = 180;

const PRODUCTION_LOGIN: &str = "https://login.salesforce.com";
const SANDBOX_LOGIN: &str = "https://test.salesforce.com";
const SANDBOX_PATTERN: &str = r"(?i)(sandbox|[/.]cs\d+\.|test\.salesforce\.com)";

/// Result of a successful token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Endpoint the token is valid for. Refresh grants may omit it.
    pub instance_url: Option<String>,
}

/// Network side of authentication. `HttpAuthClient` talks to Salesforce; tests count calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// POST a form to an OAuth token endpoint.
    async fn request_token(&self, token_url: &str, form: &[(&str, &str)]) -> Result<TokenGrant, ConnectorError>;

    /// SOAP username/password login. `password` already carries the security token.
    async fn login_password(
        &self,
        instance_url: &str,
        api_version: &str,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<TokenGrant, ConnectorError>;
}

/// Login endpoint for an instance URL: the sandbox host for sandbox-looking URLs, production otherwise.
pub fn login_url(instance_url: &str) -> &'static str {
    let sandbox = Regex::new(SANDBOX_PATTERN)
        .map(|re| re.is_match(instance_url))
        .unwrap_or(false);
    if sandbox {
        SANDBOX_LOGIN
    } else {
        PRODUCTION_LOGIN
    }
}

fn token_url(instance_url: &str) -> String {
    format!("{}/services/oauth2/token", login_url(instance_url))
}

/// PEM text for the JWT flow, read from disk when configured as a file.
pub async fn load_private_key(source: &PrivateKeySource) -> Result<String, ConfigError> {
    match source {
        PrivateKeySource::Inline(pem) => Ok(pem.clone()),
        PrivateKeySource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::PrivateKeyFile {
                    path: path.clone(),
                    source,
                })
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    sub: String,
    aud: String,
    exp: i64,
}

/// RS256-signed assertion for the JWT bearer grant.
pub fn build_assertion(
    client_id: &str,
    username: &str,
    audience: &str,
    pem: &str,
    now: DateTime<Utc>,
) -> Result<String, ConnectorError> {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| ConnectorError::Auth(format!("failed to parse private key: {}", e)))?;
    let claims = AssertionClaims {
        iss: client_id.to_string(),
        sub: username.to_string(),
        aud: audience.to_string(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };
    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| ConnectorError::Auth(format!("failed to sign jwt: {}", e)))
}

fn with_context(kind: AuthKind, e: ConnectorError) -> ConnectorError {
    match e {
        ConnectorError::Auth(msg) => ConnectorError::Auth(format!("{} login failed: {}", kind.as_str(), msg)),
        other => other,
    }
}

/// Resolve the configured method and produce a fresh session.
pub async fn authenticate(
    config: &ConnectionConfig,
    authenticator: &dyn Authenticator,
) -> Result<Session, ConnectorError> {
    let method = resolve_auth_method(config)?;
    let kind = method.kind();
    let session = |access_token: String, instance_url: String, client_id: &str| Session {
        access_token,
        instance_url,
        api_version: config.api_version().to_string(),
        client_id: client_id.to_string(),
        auth: kind,
    };

    match &method {
        AuthMethod::AccessToken {
            instance_url,
            access_token,
        } => Ok(session(access_token.clone(), instance_url.clone(), config.client_id())),
        AuthMethod::RefreshToken {
            instance_url,
            client_id,
            client_secret,
            refresh_token,
        } => {
            let form = [
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ];
            let grant = authenticator
                .request_token(&token_url(instance_url), &form)
                .await
                .map_err(|e| with_context(kind, e))?;
            let instance = grant.instance_url.unwrap_or_else(|| instance_url.clone());
            Ok(session(grant.access_token, instance, client_id.as_str()))
        }
        AuthMethod::JwtBearer {
            instance_url,
            client_id,
            username,
            key,
        } => {
            let pem = load_private_key(key).await?;
            let audience = login_url(instance_url);
            let assertion = build_assertion(client_id, username, audience, &pem, Utc::now())?;
            let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
            let grant = authenticator
                .request_token(&token_url(instance_url), &form)
                .await
                .map_err(|e| with_context(kind, e))?;
            let instance = grant
                .instance_url
                .ok_or_else(|| ConnectorError::Auth("jwt login failed: token response missing instance_url".into()))?;
            Ok(session(grant.access_token, instance, client_id.as_str()))
        }
        AuthMethod::Password {
            instance_url,
            username,
            password,
            security_token,
        } => {
            let secret = format!("{}{}", password, security_token.as_deref().unwrap_or(""));
            let grant = authenticator
                .login_password(instance_url, config.api_version(), config.client_id(), username, &secret)
                .await
                .map_err(|e| with_context(kind, e))?;
            let instance = grant.instance_url.unwrap_or_else(|| instance_url.clone());
            Ok(session(grant.access_token, instance, config.client_id()))
        }
    }
}

/// reqwest-backed `Authenticator`.
#[derive(Clone, Default)]
pub struct HttpAuthClient {
    client: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new() -> Self {
        HttpAuthClient::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        HttpAuthClient { client }
    }
}

#[async_trait]
impl Authenticator for HttpAuthClient {
    async fn request_token(&self, token_url: &str, form: &[(&str, &str)]) -> Result<TokenGrant, ConnectorError> {
        tracing::debug!(url = %token_url, "requesting oauth token");
        let response = self
            .client
            .post(token_url)
            .form(form)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RemoteError::from)?;
        parse_token_response(status, &body)
    }

    async fn login_password(
        &self,
        instance_url: &str,
        api_version: &str,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<TokenGrant, ConnectorError> {
        let url = format!("{}/services/Soap/u/{}", instance_url.trim_end_matches('/'), api_version);
        tracing::debug!(url = %url, "soap login");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(login_envelope(client_id, username, password)?)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RemoteError::from)?;
        parse_login_response(status, &body)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    instance_url: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn parse_token_response(status: u16, body: &str) -> Result<TokenGrant, ConnectorError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|_| RemoteError::new(Some(status), body.trim().to_string()))?;
    if let Some(error) = parsed.error {
        let description = parsed.error_description.unwrap_or_default();
        return Err(ConnectorError::Auth(format!("{}: {}", error, description)));
    }
    let access_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConnectorError::Auth("token response missing access_token".into()))?;
    Ok(TokenGrant {
        access_token,
        instance_url: parsed.instance_url.filter(|u| !u.is_empty()),
    })
}

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const PARTNER_NS: &str = "urn:partner.soap.sforce.com";

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ConnectorError> {
    writer
        .write_event(event)
        .map_err(|e| ConnectorError::Auth(format!("failed to build login request: {}", e)))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), ConnectorError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

/// Partner API `login` request. Credentials are written as escaped element text.
fn login_envelope(client_id: &str, username: &str, password: &str) -> Result<String, ConnectorError> {
    let mut writer = Writer::new(Vec::new());
    write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    let envelope = BytesStart::new("env:Envelope").with_attributes([
        ("xmlns:env", SOAP_ENV_NS),
        ("xmlns:urn", PARTNER_NS),
    ]);
    write_event(&mut writer, Event::Start(envelope))?;

    write_event(&mut writer, Event::Start(BytesStart::new("env:Header")))?;
    write_event(&mut writer, Event::Start(BytesStart::new("urn:CallOptions")))?;
    write_text_element(&mut writer, "urn:client", client_id)?;
    write_text_element(&mut writer, "urn:defaultNamespace", "sf")?;
    write_event(&mut writer, Event::End(BytesEnd::new("urn:CallOptions")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("env:Header")))?;

    write_event(&mut writer, Event::Start(BytesStart::new("env:Body")))?;
    write_event(&mut writer, Event::Start(BytesStart::new("urn:login")))?;
    write_text_element(&mut writer, "urn:username", username)?;
    write_text_element(&mut writer, "urn:password", password)?;
    write_event(&mut writer, Event::End(BytesEnd::new("urn:login")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("env:Body")))?;

    write_event(&mut writer, Event::End(BytesEnd::new("env:Envelope")))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| ConnectorError::Auth(format!("failed to build login request: {}", e)))
}

fn element_text<'a>(doc: &'a roxmltree::Document, name: &str) -> Option<&'a str> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
}

fn parse_login_response(status: u16, body: &str) -> Result<TokenGrant, ConnectorError> {
    let doc = roxmltree::Document::parse(body)
        .map_err(|e| RemoteError::new(Some(status), format!("unreadable login response: {}", e)))?;
    if let Some(fault) = element_text(&doc, "faultstring") {
        return Err(ConnectorError::Auth(fault.to_string()));
    }
    let session_id = element_text(&doc, "sessionId")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConnectorError::Auth("login response missing sessionId".into()))?;
    let instance_url = element_text(&doc, "serverUrl")
        .and_then(|u| reqwest::Url::parse(u).ok())
        .map(|u| u.origin().ascii_serialization());
    Ok(TokenGrant {
        access_token: session_id.to_string(),
        instance_url,
    })
}
