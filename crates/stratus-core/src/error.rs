use std::time::Duration;
use stratus_abstraction::{ServiceError, Status};
use thiserror::Error;

pub type SdkResult<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    /// A remote call failed; carries the service's canonical error.
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(
        "Job state didn't reach {expected} in {} seconds\nMaybe it's a good idea to increase the timeout\nLast recorded state: {last_state}",
        .timeout.as_secs_f64()
    )]
    Timeout { expected: String, timeout: Duration, last_state: String },

    #[error("{resource} failed with:\n{status}")]
    JobFailed { resource: String, status: Status },

    #[error("operation {operation} failed with:\n{status}")]
    OperationFailed { operation: String, status: Status },

    /// Raised before any remote call is issued.
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid resource name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error("invalid storage uri '{0}'")]
    InvalidUri(String),

    #[error("no training job type is registered for schema {schema_uri}")]
    UnsupportedSchema { schema_uri: String },

    #[error("schema {schema_uri} is already claimed by {existing}")]
    AmbiguousSchema { schema_uri: String, existing: String },

    #[error("Could not find time series resource with display name: {display_name}")]
    TimeSeriesNotFound {
        display_name: String,
        #[source]
        source: ServiceError,
    },

    #[error("background job failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SdkError {
    /// Returns the underlying service error, if this error came from a remote call.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) | Self::TimeSeriesNotFound { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_reports_last_state() {
        let err = SdkError::Timeout {
            expected: "CANCELLED".to_string(),
            timeout: Duration::from_secs(90),
            last_state: "JOB_STATE_RUNNING".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("didn't reach CANCELLED in 90 seconds"));
        assert!(msg.contains("increase the timeout"));
        assert!(msg.contains("Last recorded state: JOB_STATE_RUNNING"));
    }

    #[test]
    fn test_service_error_conversion() {
        let err: SdkError = ServiceError::NotFound("x".to_string()).into();
        assert!(err.service_error().is_some_and(ServiceError::is_not_found));
    }
}
