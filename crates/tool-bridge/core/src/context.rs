//! Tool execution context.

use crate::error::BridgeError;
use std::future::Future;
use std::time::Duration;

/// Context passed to tool executions.
///
/// Carries the caller's optional timeout. Expiry stops waiting for the call;
/// it does not abort work already running on a remote endpoint.
#[derive(Clone, Default, Debug)]
pub struct ToolContext {
    timeout: Option<Duration>,
}

impl ToolContext {
    /// Create a new default context with no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Await `fut`, bounded by this context's timeout.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, BridgeError>
    where
        F: Future<Output = Result<T, BridgeError>>,
    {
        bounded(fut, self.timeout).await
    }
}

/// Await `fut`, giving up with [`BridgeError::Timeout`] once `timeout` elapses.
pub async fn bounded<F, T>(fut: F, timeout: Option<Duration>) -> Result<T, BridgeError>
where
    F: Future<Output = Result<T, BridgeError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| BridgeError::Timeout(limit))?,
        None => fut.await,
    }
}
