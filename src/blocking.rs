//! Blocking variant of [`crate::SecretsClient`].
//!
//! Each call parks the current thread until its single HTTP round-trip has
//! finished. Do not use it from inside an async runtime; `block_on` panics
//! there.

use crate::models::{SecretResponse, StatusInfo, TokenCreateRequest, TokenResponse};
use crate::VaultError;
use std::collections::HashMap;
use tokio::runtime::{Builder, Runtime};

#[derive(Debug)]
pub struct SecretsClient {
    inner: crate::SecretsClient,
    runtime: Runtime,
}

impl SecretsClient {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Result<Self, VaultError> {
        Self::from_async(crate::SecretsClient::new(address, token))
    }

    pub fn with_http_client(
        address: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self, VaultError> {
        Self::from_async(crate::SecretsClient::with_http_client(address, token, client))
    }

    pub fn from_env() -> Result<Self, VaultError> {
        Self::from_async(crate::SecretsClient::from_env()?)
    }

    /// Wrap an async client, e.g. one produced by `SecretsClient::builder()`
    pub fn from_async(inner: crate::SecretsClient) -> Result<Self, VaultError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    pub fn read(&self, path: &str) -> Result<SecretResponse, VaultError> {
        self.runtime.block_on(self.inner.read(path))
    }

    pub fn write(
        &self,
        path: &str,
        secret: &HashMap<String, String>,
    ) -> Result<SecretResponse, VaultError> {
        self.runtime.block_on(self.inner.write(path, secret))
    }

    pub fn renew(
        &self,
        lease_id: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<SecretResponse, VaultError> {
        self.runtime.block_on(self.inner.renew(lease_id, parameters))
    }

    pub fn revoke(&self, lease_id: &str) -> Result<(), VaultError> {
        self.runtime.block_on(self.inner.revoke(lease_id))
    }

    pub fn delete(&self, path: &str) -> Result<(), VaultError> {
        self.runtime.block_on(self.inner.delete(path))
    }

    pub fn status(&self) -> Result<StatusInfo, VaultError> {
        self.runtime.block_on(self.inner.status())
    }

    pub fn lookup_token(&self, token: &str) -> Result<TokenResponse, VaultError> {
        self.runtime.block_on(self.inner.lookup_token(token))
    }

    pub fn create_token(&self, request: &TokenCreateRequest) -> Result<TokenResponse, VaultError> {
        self.runtime.block_on(self.inner.create_token(request))
    }
}
