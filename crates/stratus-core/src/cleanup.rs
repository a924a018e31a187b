//! Teardown of training pipelines.

use crate::error::{SdkError, SdkResult};
use crate::training::TrainingJob;
use std::time::Duration;
use stratus_abstraction::ServiceError;
use tracing::{info, warn};

/// Cancels `job`, then deletes it and waits for the delete.
///
/// A `FailedPrecondition` from cancel means the job is already terminal and
/// is ignored. Any other cancel error and every delete error propagate.
pub async fn cancel_and_delete(job: &TrainingJob, timeout: Duration) -> SdkResult<()> {
    match job.cancel().await {
        Ok(()) => {}
        Err(SdkError::Service(ServiceError::FailedPrecondition(msg))) => {
            warn!(pipeline = %job.resource_name(), reason = %msg, "Cancel skipped, job already terminal");
        }
        Err(e) => return Err(e),
    }

    job.delete(timeout).await?;
    info!(pipeline = %job.resource_name(), "TrainingPipeline cancelled and deleted");
    Ok(())
}
