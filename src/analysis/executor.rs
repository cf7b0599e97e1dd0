//! Stage Executor
//!
//! One structured model call per invocation: build the request from the
//! instruction, context and schema table, wait for the reply (bounded by a
//! timeout and racing the cancellation token), then repair, validate and
//! deserialize the payload.
//!
//! No retries, no logging, no shared state. Outcomes are reported to the
//! caller as [`StageError`].

use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::ai::provider::{LlmResponse, ModelRequest, SharedProvider};
use crate::ai::timeout::with_timeout;
use crate::ai::validation::{Schema, describe_violations, extract_json_from_response};
use crate::constants::network as net_constants;
use crate::types::{ErrorClassifier, StageError};

#[derive(Clone)]
pub struct StageExecutor {
    provider: SharedProvider,
    timeout: Duration,
}

impl StageExecutor {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one schema-constrained call and decode the result as `T`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        instruction: String,
        context: String,
        schema: &Schema,
        cancel: &CancellationToken,
    ) -> Result<(T, LlmResponse), StageError> {
        let request = ModelRequest::new(instruction, context, schema.to_json_schema());
        let operation = format!("{} stage", schema.name);
        let call = with_timeout(self.timeout, self.provider.generate(&request), &operation);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StageError::Cancelled),
            result = call => result.map_err(|e| {
                StageError::ModelCallFailure(ErrorClassifier::classify_mentor_error(
                    &e,
                    self.provider.name(),
                ))
            })?,
        };

        let value = decode(schema, &response.content)?;
        Ok((value, response))
    }
}

/// Parse raw model text against a schema table
pub fn decode<T: DeserializeOwned>(schema: &Schema, raw: &str) -> Result<T, StageError> {
    let value = extract_json_from_response(raw)
        .map_err(|failure| StageError::schema_violation(schema.name, failure.to_string(), raw))?;

    let violations = schema.validate(&value);
    if !violations.is_empty() {
        return Err(StageError::schema_violation(
            schema.name,
            describe_violations(&violations),
            raw,
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| StageError::schema_violation(schema.name, e.to_string(), raw))
}
