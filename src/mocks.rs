use crate::transport::{Transport, TransportResponse, VaultRequest};
use crate::VaultError;
use async_trait::async_trait;
use mockall::*;
use reqwest::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
  pub VaultTransport {}

  #[async_trait]
  impl Transport for VaultTransport {
    async fn send(&self, request: VaultRequest) -> Result<Box<dyn TransportResponse>, VaultError>;
  }
}

/// Canned response that counts how many times it has been dropped
pub struct CountingResponse {
    status: u16,
    body: String,
    released: Arc<AtomicUsize>,
}

impl CountingResponse {
    pub fn boxed(status: u16, body: &str, released: &Arc<AtomicUsize>) -> Box<dyn TransportResponse> {
        Box::new(Self {
            status,
            body: body.to_string(),
            released: Arc::clone(released),
        })
    }
}

impl Drop for CountingResponse {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransportResponse for CountingResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn bytes(self: Box<Self>) -> Result<Vec<u8>, VaultError> {
        Ok(self.body.as_bytes().to_vec())
    }
}

impl MockVaultTransport {
    /// Expect one `method url` request and answer it with `status` and `body`
    pub fn expect_call(
        &mut self,
        method: Method,
        url: &str,
        status: u16,
        body: &str,
        released: &Arc<AtomicUsize>,
    ) -> &mut Self {
        let url = url.to_string();
        let body = body.to_string();
        let released = Arc::clone(released);

        self.expect_send()
            .withf(move |request| request.method == method && request.url == url)
            .times(1)
            .returning(move |_| Ok(CountingResponse::boxed(status, &body, &released)));
        self
    }
}
