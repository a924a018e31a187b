//! Long-running operation handles.

use crate::error::{SdkError, SdkResult};
use crate::poller::{wait_for_job_state, PollConfig};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use stratus_abstraction::{Operation, OperationsService};
use tracing::{debug, info};

const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// An operation returned by a mutating call, pollable until it resolves.
pub struct OperationHandle {
    operation: Operation,
    operations: Arc<dyn OperationsService>,
    interval: Duration,
}

impl OperationHandle {
    #[must_use]
    pub fn new(operation: Operation, operations: Arc<dyn OperationsService>) -> Self {
        info!(operation = %operation.name, "Operation is lengthy");
        Self { operation, operations, interval: OPERATION_POLL_INTERVAL }
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.operation.name
    }

    /// Last fetched snapshot of the operation.
    #[must_use]
    pub const fn snapshot(&self) -> &Operation {
        &self.operation
    }

    /// Waits for the operation to finish and returns its response payload.
    ///
    /// # Errors
    /// [`SdkError::Timeout`] if it is still running after `timeout`,
    /// [`SdkError::OperationFailed`] if it finished with a non-OK status.
    pub async fn result(mut self, timeout: Duration) -> SdkResult<Option<serde_json::Value>> {
        if !self.operation.done {
            let operations = self.operations.clone();
            let config = PollConfig::expecting(&["OPERATION_DONE", "OPERATION_FAILED"])
                .with_timeout(timeout)
                .with_interval(self.interval);
            self.operation = wait_for_job_state(
                move |name: String| {
                    let operations = operations.clone();
                    async move { operations.get_operation(&name).await }
                },
                &self.operation.name,
                &config,
            )
            .await?;
        }

        match self.operation.error {
            Some(status) if !status.is_ok() => {
                Err(SdkError::OperationFailed { operation: self.operation.name, status })
            }
            _ => {
                debug!(operation = %self.operation.name, "Operation completed");
                Ok(self.operation.response)
            }
        }
    }

    /// Like [`result`](Self::result), decoding the response into `T`.
    pub async fn result_as<T: DeserializeOwned>(self, timeout: Duration) -> SdkResult<T> {
        let name = self.operation.name.clone();
        let response = self.result(timeout).await?.ok_or_else(|| {
            SdkError::Precondition(format!("operation {name} finished without a response"))
        })?;
        Ok(serde_json::from_value(response)?)
    }
}
