//! Timeout helpers for model calls
//!
//! Every outbound model request is bounded. Exceeding the bound yields
//! [`MentorError::Timeout`], which the caller classifies like any other
//! network failure.

use std::future::Future;
use std::time::Duration;

use crate::constants::network as net_constants;
use crate::types::{MentorError, Result};

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Bound for one structured stage call
    pub stage_request: Duration,
    /// Bound for one chat reply
    pub chat_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS))
    }
}

impl TimeoutConfig {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            stage_request: timeout,
            chat_request: timeout,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::uniform(Duration::from_secs(secs))
    }
}

/// Run `future`, failing with [`MentorError::Timeout`] once `timeout` elapses
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(MentorError::timeout(operation_name, timeout)),
    }
}
