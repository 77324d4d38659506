//! Retrying POST engine with fixed-delay rate limiting.
//!
//! ## Retry strategy
//!
//! The legacy reporting backend fails in bursts (stale JSF view state,
//! overloaded nights, flaky government networking), and almost every failure
//! clears on a plain re-send. So the policy is deliberately dumb: a fixed
//! delay, a fixed ceiling, no exponential backoff. The delay is applied
//! before *every* attempt — including the first — which doubles as the rate
//! limit that keeps a full multi-year run from hammering the server.
//!
//! Exceeding the ceiling wraps the last failure into a single
//! [`HarvestError::Connectivity`], which aborts the run: once the session is
//! dead, every further unit would burn the same retry budget for nothing.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::HarvestError;
use crate::transport::{FormRequest, FormTransport};

/// How persistently (and how politely) the engine POSTs.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure. Default: 3 (4 attempts total).
    pub max_retries: u32,

    /// Delay applied before every attempt, retry or not. Default: 1.5 s.
    ///
    /// This is rate limiting, not backoff: it caps the request rate of the
    /// whole run at one POST per `request_delay` even when nothing fails.
    pub request_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            request_delay: Duration::from_millis(1500),
        }
    }
}

/// A [`FormTransport`] wrapped in a [`RetryPolicy`].
pub struct Engine {
    transport: Arc<dyn FormTransport>,
    policy: RetryPolicy,
}

impl Engine {
    pub fn new(transport: Arc<dyn FormTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// POST `request`, retrying on any failure up to the policy ceiling.
    ///
    /// A failure is either a transport error (no response) or a non-2xx/3xx
    /// status. Returns the response body on the first success; after
    /// `1 + max_retries` failed attempts, returns
    /// [`HarvestError::Connectivity`] carrying the last failure.
    pub async fn post(&self, request: &FormRequest) -> Result<Vec<u8>, HarvestError> {
        let mut last_err = String::new();

        for attempt in 0..=self.policy.max_retries {
            sleep(self.policy.request_delay).await;

            match self.transport.post_form(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    last_err = format!("HTTP {}", response.status);
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }

            if attempt < self.policy.max_retries {
                warn!(
                    "POST {} failed (attempt {}/{}): {}",
                    request.url,
                    attempt + 1,
                    self.policy.max_retries + 1,
                    last_err
                );
            }
        }

        Err(HarvestError::Connectivity {
            url: request.url.clone(),
            attempts: self.policy.max_retries + 1,
            detail: last_err,
        })
    }
}
