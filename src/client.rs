use crate::error::VaultError;
use crate::models::{ErrorInfo, SecretResponse, StatusInfo, TokenCreateRequest, TokenResponse};
use crate::transport::{ReqwestTransport, TOKEN_HEADER, Transport, VaultRequest};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const TOKEN_LOOKUP_PATH: &str = "auth/token/lookup/";

pub struct SecretsClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    application_name: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for SecretsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretsClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            application_name: None,
            transport: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Use a pre-configured HTTP client (TLS, proxy, timeouts)
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.transport = Some(Arc::new(ReqwestTransport::new(client)));
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn resolve_config(&self) -> Result<ResolvedConfig, VaultError> {
        let base_url = self
            .base_url
            .clone()
            .or_else(|| std::env::var("VAULT_ADDR").ok())
            .ok_or(VaultError::VaultNotDetected)?;

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("VAULT_TOKEN").ok())
            .ok_or(VaultError::MissingToken)?;

        Ok(ResolvedConfig { base_url, token })
    }

    pub fn build(self) -> Result<SecretsClient, VaultError> {
        let config = self.resolve_config()?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        Ok(SecretsClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            application_name: self.application_name,
            transport,
        })
    }
}

struct ResolvedConfig {
    base_url: String,
    token: String,
}

/// Which statuses an endpoint treats as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Status(u16),
    BelowClientError,
}

impl Expect {
    fn accepts(self, status: u16) -> bool {
        match self {
            Expect::Status(expected) => status == expected,
            Expect::BelowClientError => status < 400,
        }
    }
}

/// Client for the Vault HTTP API.
///
/// Every method performs exactly one request. The client keeps no state
/// between calls, so it can be cloned and shared across tasks freely.
#[derive(Clone)]
pub struct SecretsClient {
    base_url: String,
    token: String,
    application_name: Option<String>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for SecretsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsClient")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl SecretsClient {
    /// Client with a default `reqwest` transport.
    ///
    /// `address` is the server root, e.g. `http://127.0.0.1:8200`. It is not
    /// validated here; a malformed address fails on the first request.
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_transport(address, token, Arc::new(ReqwestTransport::default()))
    }

    pub fn with_http_client(
        address: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self::with_transport(address, token, Arc::new(ReqwestTransport::new(client)))
    }

    pub fn with_transport(
        address: impl Into<String>,
        token: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: address.into().trim_end_matches('/').to_string(),
            token: token.into(),
            application_name: None,
            transport,
        }
    }

    pub fn from_env() -> Result<Self, VaultError> {
        SecretsClientBuilder::new().build()
    }

    pub fn builder() -> SecretsClientBuilder {
        SecretsClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the secret stored at `path`. Succeeds on 200 only.
    pub async fn read(&self, path: &str) -> Result<SecretResponse, VaultError> {
        let body = self
            .perform(Method::GET, path, None, Expect::Status(200))
            .await?;
        decode(&body)
    }

    /// Write key/value pairs to `path`. Succeeds on 204 only.
    ///
    /// A 204 normally carries no body, in which case an empty
    /// `SecretResponse` is returned.
    pub async fn write(
        &self,
        path: &str,
        secret: &HashMap<String, String>,
    ) -> Result<SecretResponse, VaultError> {
        let payload = serde_json::to_value(secret)?;
        let body = self
            .perform(Method::POST, path, Some(payload), Expect::Status(204))
            .await?;
        decode_or_default(&body)
    }

    /// Renew a lease. Any status below 400 is a success.
    pub async fn renew(
        &self,
        lease_id: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<SecretResponse, VaultError> {
        let payload = serde_json::to_value(parameters)?;
        let body = self
            .perform(
                Method::PUT,
                &format!("sys/renew/{}", lease_id),
                Some(payload),
                Expect::BelowClientError,
            )
            .await?;
        decode_or_default(&body)
    }

    /// Revoke a lease immediately. Any status below 400 is a success.
    pub async fn revoke(&self, lease_id: &str) -> Result<(), VaultError> {
        self.perform(
            Method::PUT,
            &format!("sys/revoke/{}", lease_id),
            Some(serde_json::json!({})),
            Expect::BelowClientError,
        )
        .await?;
        Ok(())
    }

    /// Delete the secret at `path`. Succeeds on 204 only, a 200 is an error.
    pub async fn delete(&self, path: &str) -> Result<(), VaultError> {
        self.perform(Method::DELETE, path, None, Expect::Status(204))
            .await?;
        Ok(())
    }

    /// Seal status of the server
    pub async fn status(&self) -> Result<StatusInfo, VaultError> {
        let body = self
            .perform(Method::GET, "sys/seal-status", None, Expect::Status(200))
            .await?;
        decode(&body)
    }

    /// Look up `token`; its metadata is in `TokenResponse::data`.
    ///
    /// The token is put into the URL as is, escaping reserved characters is
    /// up to the caller.
    pub async fn lookup_token(&self, token: &str) -> Result<TokenResponse, VaultError> {
        let body = self
            .perform(
                Method::GET,
                &format!("{}{}", TOKEN_LOOKUP_PATH, token),
                None,
                Expect::Status(200),
            )
            .await?;
        decode(&body)
    }

    /// Issue a new token; its credentials are in `TokenResponse::auth`.
    pub async fn create_token(
        &self,
        request: &TokenCreateRequest,
    ) -> Result<TokenResponse, VaultError> {
        let payload = serde_json::to_value(request)?;
        let body = self
            .perform(
                Method::POST,
                "auth/token/create",
                Some(payload),
                Expect::Status(200),
            )
            .await?;
        decode(&body)
    }

    /// Send one request and check its status against `expect`.
    ///
    /// Returns the raw body on success. Otherwise the body is decoded as an
    /// error list, each message is logged and `VaultError::Operation` is
    /// returned. The response is consumed before this returns.
    async fn perform(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        expect: Expect,
    ) -> Result<Vec<u8>, VaultError> {
        let path = path.trim_start_matches('/');
        let url = format!("{}/v1/{}", self.base_url, path);

        let mut headers = vec![
            (TOKEN_HEADER, self.token.clone()),
            ("Accept", "application/json".to_string()),
        ];
        if let Some(ref app_name) = self.application_name {
            headers.push(("User-Agent", app_name.clone()));
        }

        tracing::debug!(method = %method, path = %redact(path), "Sending Vault request");

        let response = self
            .transport
            .send(VaultRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if expect.accepts(status) {
            return Ok(body);
        }

        let error: ErrorInfo = decode_or_default(&body)?;
        if error.errors.is_empty() {
            tracing::warn!(status, path = %redact(path), "Vault request failed");
        }
        for e in &error.errors {
            tracing::warn!(status, error = %e, "Vault request failed");
        }

        Err(VaultError::Operation {
            status,
            errors: error.errors,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, VaultError> {
    Ok(serde_json::from_slice(body)?)
}

fn decode_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, VaultError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    decode(body)
}

// Token lookups carry the token in the path.
fn redact(path: &str) -> &str {
    if path.starts_with(TOKEN_LOOKUP_PATH) {
        "auth/token/lookup/***"
    } else {
        path
    }
}
