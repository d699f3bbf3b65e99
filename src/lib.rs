//! vault-lite - thin client for the HashiCorp Vault HTTP API
//!
//! One method per endpoint, one request per call:
//! 1. secrets: `read`, `write`, `delete`
//! 2. leases: `renew`, `revoke`
//! 3. server: `status` (seal status)
//! 4. tokens: `lookup_token`, `create_token`
//!
//! Any status an endpoint does not accept becomes
//! `VaultError::Operation { status, errors }` with the messages the server
//! sent back.

pub mod blocking;
mod client;
mod error;
mod models;
pub mod transport;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use client::{SecretsClient, SecretsClientBuilder};
pub use error::VaultError;
pub use models::{
    AuthInfo, SecretResponse, StatusInfo, TokenCreateRequest, TokenCreateRequestBuilder,
    TokenInfo, TokenResponse,
};
