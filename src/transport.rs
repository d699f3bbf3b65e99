use crate::VaultError;
use async_trait::async_trait;
use reqwest::Method;
use std::fmt;

pub(crate) const TOKEN_HEADER: &str = "X-Vault-Token";

/// A single outgoing request to the Vault HTTP API
#[derive(Clone)]
pub struct VaultRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl fmt::Debug for VaultRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(TOKEN_HEADER) {
                    (*name, "***")
                } else {
                    (*name, value.as_str())
                }
            })
            .collect();

        f.debug_struct("VaultRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// Response handle owned by the caller until its body is read.
///
/// Reading the body consumes the handle, so the underlying connection is
/// released exactly once whichever way the call ends.
#[async_trait]
pub trait TransportResponse: Send {
    fn status(&self) -> u16;

    /// Read the whole body and release the response
    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, VaultError>;
}

/// Trait for HTTP stacks able to carry Vault requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: VaultRequest) -> Result<Box<dyn TransportResponse>, VaultError>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

struct ReqwestResponse(reqwest::Response);

#[async_trait]
impl TransportResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.0.status().as_u16()
    }

    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, VaultError> {
        self.0
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| VaultError::RequestError(e.to_string()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: VaultRequest) -> Result<Box<dyn TransportResponse>, VaultError> {
        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| VaultError::RequestError(e.to_string()))?;

        Ok(Box::new(ReqwestResponse(response)))
    }
}
