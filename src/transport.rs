//! HTTP transport abstraction for the scrape pipeline.
//!
//! The reporting site only ever sees url-encoded form POSTs, so the whole
//! transport surface is one method. Putting it behind a trait object keeps
//! the retry engine and the orchestrator free of any `reqwest` type, which is
//! what makes both testable with an in-memory double — the tests count
//! invocations and script failures without a network in sight.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{HarvestError, TransportError};

/// One outgoing form POST, fully materialised.
///
/// Built fresh per call by [`crate::scrape::SiteProfile`]; nothing here is
/// shared or mutated between requests.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub url: String,
    /// Header name/value pairs, applied in order.
    pub headers: Vec<(String, String)>,
    /// Form fields, url-encoded into the body by the transport.
    pub form: Vec<(String, String)>,
}

/// Status and body of a completed POST.
#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FormResponse {
    /// 2xx and 3xx count as success; redirects are followed upstream, so a
    /// surviving 3xx is informational rather than an error.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Sends a url-encoded form POST and returns the raw response.
///
/// A returned `Err` means the request produced no response at all; an HTTP
/// error status comes back as a normal [`FormResponse`] and is classified by
/// the caller. Implementations must be `Send + Sync` so the engine can be
/// shared behind an `Arc`.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn post_form(&self, request: &FormRequest) -> Result<FormResponse, TransportError>;
}

/// The production transport, backed by a shared [`reqwest::Client`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn post_form(&self, request: &FormRequest) -> Result<FormResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .form(&request.form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();

        Ok(FormResponse { status, body })
    }
}
