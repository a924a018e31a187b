//! Service abstraction layer for Stratus.
//!
//! This crate defines the remote surface of the managed ML platform: the
//! request/response types mirrored from the service schema, the error type
//! every remote call returns, and the async service traits that concrete
//! backends (REST, in-memory mock) implement.

pub mod service;
pub mod types;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use service::{
    DatasetService, ModelService, OperationsService, PipelineService, TensorboardService,
    TuningService,
};
pub use types::*;

/// An error returned by a remote service call.
///
/// Variants follow the canonical status codes the platform reports, so callers
/// can branch on the kind of failure without parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
    /// The addressed resource does not exist.
    #[error("Not Found: {0}")]
    NotFound(String),

    /// The request was malformed or referenced invalid values.
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    /// The resource is not in a state that allows the operation
    /// (e.g., cancelling a job that already finished).
    #[error("Failed Precondition: {0}")]
    FailedPrecondition(String),

    /// A resource with the same identifier already exists.
    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    /// The caller lacks permission for the operation.
    #[error("Permission Denied: {0}")]
    PermissionDenied(String),

    /// Credentials were missing or rejected.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Quota exceeded or rate limit hit.
    #[error("Resource Exhausted: {0}")]
    ResourceExhausted(String),

    /// The service is temporarily unavailable.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The request deadline passed before the service answered.
    #[error("Deadline Exceeded: {0}")]
    DeadlineExceeded(String),

    /// The service reported an internal error.
    #[error("Internal: {0}")]
    Internal(String),

    /// The request never reached the service (network, TLS, ...).
    #[error("Transport Error: {0}")]
    Transport(String),

    /// A request or response body could not be (de)serialized.
    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// Builds an error from a canonical status name such as `"NOT_FOUND"`.
    ///
    /// Unknown names map to [`ServiceError::Internal`].
    #[must_use]
    pub fn from_status(status: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            "NOT_FOUND" => Self::NotFound(message),
            "INVALID_ARGUMENT" | "OUT_OF_RANGE" => Self::InvalidArgument(message),
            "FAILED_PRECONDITION" | "ABORTED" => Self::FailedPrecondition(message),
            "ALREADY_EXISTS" => Self::AlreadyExists(message),
            "PERMISSION_DENIED" => Self::PermissionDenied(message),
            "UNAUTHENTICATED" => Self::Unauthenticated(message),
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted(message),
            "UNAVAILABLE" => Self::Unavailable(message),
            "DEADLINE_EXCEEDED" => Self::DeadlineExceeded(message),
            _ => Self::Internal(message),
        }
    }

    /// Returns the canonical status name of this error.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            Self::Internal(_) | Self::Transport(_) | Self::Serialization(_) => "INTERNAL",
        }
    }

    /// Returns true if the addressed resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_canonical_codes() {
        assert!(ServiceError::from_status("NOT_FOUND", "x").is_not_found());
        assert!(matches!(
            ServiceError::from_status("FAILED_PRECONDITION", "done"),
            ServiceError::FailedPrecondition(_)
        ));
        assert!(matches!(
            ServiceError::from_status("INVALID_ARGUMENT", "bad"),
            ServiceError::InvalidArgument(_)
        ));
        assert!(matches!(ServiceError::from_status("WHATEVER", "?"), ServiceError::Internal(_)));
    }

    #[test]
    fn test_status_round_trips_through_from_status() {
        let err = ServiceError::PermissionDenied("nope".to_string());
        let again = ServiceError::from_status(err.status(), "nope");
        assert_eq!(err, again);
    }

    #[test]
    fn test_error_display_includes_message() {
        let err = ServiceError::NotFound("projects/p/locations/l/datasets/1".to_string());
        assert_eq!(err.to_string(), "Not Found: projects/p/locations/l/datasets/1");
    }
}
