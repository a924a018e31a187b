//! Request and response messages mirrored from the platform's REST schema.
//!
//! Field names serialize as camelCase, matching the JSON the service sends.
//! Server-populated fields default when absent so partially filled requests
//! and sparse responses both round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status of a failed call or job (`google.rpc.Status` shape).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Canonical code; 0 is OK.
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

impl Status {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {} message: {}", self.code, self.message)
    }
}

/// State of a job resource (tuning jobs, custom jobs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    #[serde(rename = "JOB_STATE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "JOB_STATE_QUEUED")]
    Queued,
    #[serde(rename = "JOB_STATE_PENDING")]
    Pending,
    #[serde(rename = "JOB_STATE_RUNNING")]
    Running,
    #[serde(rename = "JOB_STATE_SUCCEEDED")]
    Succeeded,
    #[serde(rename = "JOB_STATE_FAILED")]
    Failed,
    #[serde(rename = "JOB_STATE_CANCELLING")]
    Cancelling,
    #[serde(rename = "JOB_STATE_CANCELLED")]
    Cancelled,
    #[serde(rename = "JOB_STATE_PAUSED")]
    Paused,
    #[serde(rename = "JOB_STATE_EXPIRED")]
    Expired,
    #[serde(rename = "JOB_STATE_UPDATING")]
    Updating,
    #[serde(rename = "JOB_STATE_PARTIALLY_SUCCEEDED")]
    PartiallySucceeded,
}

impl JobState {
    /// Wire name of the state, e.g. `JOB_STATE_RUNNING`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "JOB_STATE_UNSPECIFIED",
            Self::Queued => "JOB_STATE_QUEUED",
            Self::Pending => "JOB_STATE_PENDING",
            Self::Running => "JOB_STATE_RUNNING",
            Self::Succeeded => "JOB_STATE_SUCCEEDED",
            Self::Failed => "JOB_STATE_FAILED",
            Self::Cancelling => "JOB_STATE_CANCELLING",
            Self::Cancelled => "JOB_STATE_CANCELLED",
            Self::Paused => "JOB_STATE_PAUSED",
            Self::Expired => "JOB_STATE_EXPIRED",
            Self::Updating => "JOB_STATE_UPDATING",
            Self::PartiallySucceeded => "JOB_STATE_PARTIALLY_SUCCEEDED",
        }
    }

    /// True once the job can no longer transition.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(
            self,
            Self::Succeeded
                | Self::Failed
                | Self::Cancelled
                | Self::Paused
                | Self::Expired
                | Self::PartiallySucceeded
        )
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Failed | Self::Expired)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a training pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    #[default]
    #[serde(rename = "PIPELINE_STATE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PIPELINE_STATE_QUEUED")]
    Queued,
    #[serde(rename = "PIPELINE_STATE_PENDING")]
    Pending,
    #[serde(rename = "PIPELINE_STATE_RUNNING")]
    Running,
    #[serde(rename = "PIPELINE_STATE_SUCCEEDED")]
    Succeeded,
    #[serde(rename = "PIPELINE_STATE_FAILED")]
    Failed,
    #[serde(rename = "PIPELINE_STATE_CANCELLING")]
    Cancelling,
    #[serde(rename = "PIPELINE_STATE_CANCELLED")]
    Cancelled,
    #[serde(rename = "PIPELINE_STATE_PAUSED")]
    Paused,
}

impl PipelineState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "PIPELINE_STATE_UNSPECIFIED",
            Self::Queued => "PIPELINE_STATE_QUEUED",
            Self::Pending => "PIPELINE_STATE_PENDING",
            Self::Running => "PIPELINE_STATE_RUNNING",
            Self::Succeeded => "PIPELINE_STATE_SUCCEEDED",
            Self::Failed => "PIPELINE_STATE_FAILED",
            Self::Cancelling => "PIPELINE_STATE_CANCELLING",
            Self::Cancelled => "PIPELINE_STATE_CANCELLED",
            Self::Paused => "PIPELINE_STATE_PAUSED",
        }
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled | Self::Paused)
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a long-running operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Customer-managed encryption key applied to a created resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionSpec {
    pub kms_key_name: String,
}

/// A managed dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Server-assigned resource name; empty on create requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub display_name: String,
    pub metadata_schema_uri: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Cloud Storage locations to import from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsSource {
    pub uris: Vec<String>,
}

/// One import request entry: where the data lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDataConfig {
    pub gcs_source: GcsSource,
    pub import_schema_uri: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data_item_labels: HashMap<String, String>,
}

/// Source of a tabular or time-series dataset, stored in its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputConfig {
    GcsSource { uri: Vec<String> },
    BigquerySource { uri: String },
}

/// Dataset split used by a training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FractionSplit {
    pub training_fraction: f64,
    pub validation_fraction: f64,
    pub test_fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDataConfig {
    pub dataset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_split: Option<FractionSplit>,
}

/// A model in the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

/// A training pipeline; the training task shape is named by
/// `training_task_definition` (a schema URI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPipeline {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub display_name: String,
    pub training_task_definition: String,
    #[serde(default)]
    pub training_task_inputs: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub training_task_metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_config: Option<InputDataConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_to_upload: Option<Model>,
    #[serde(default)]
    pub state: PipelineState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdapterSize {
    #[default]
    AdapterSizeUnspecified,
    AdapterSizeOne,
    AdapterSizeFour,
    AdapterSizeEight,
    AdapterSizeSixteen,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningHyperParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_size: Option<AdapterSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisedTuningSpec {
    pub training_dataset_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_dataset_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyper_parameters: Option<TuningHyperParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistillationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_teacher_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuned_teacher_model_source: Option<String>,
    pub training_dataset_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_dataset_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyper_parameters: Option<TuningHyperParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_root_directory: Option<String>,
}

/// The model (and endpoint) a tuning job produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunedModel {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
}

/// A tuning job over a foundation model.
///
/// Exactly one of `supervised_tuning_spec` / `distillation_spec` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningJob {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub base_model: String,
    #[serde(default)]
    pub tuned_model_display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervised_tuning_spec: Option<SupervisedTuningSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distillation_spec: Option<DistillationSpec>,
    #[serde(default)]
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuned_model: Option<TunedModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning_data_stats: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tensorboard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// `bucket/folder` under which the service stores blob data.
    #[serde(default)]
    pub blob_storage_path_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardRun {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    #[default]
    ValueTypeUnspecified,
    Scalar,
    Tensor,
    BlobSequence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardTimeSeries {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plugin_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTensorboardRunRequest {
    pub parent: String,
    pub tensorboard_run: TensorboardRun,
    pub tensorboard_run_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTensorboardTimeSeriesRequest {
    pub parent: String,
    pub tensorboard_time_series: TensorboardTimeSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_wire_names() {
        let state: JobState = serde_json::from_str(r#""JOB_STATE_CANCELLED""#).unwrap();
        assert_eq!(state, JobState::Cancelled);
        assert_eq!(state.to_string(), "JOB_STATE_CANCELLED");
        assert_eq!(serde_json::to_string(&JobState::Running).unwrap(), r#""JOB_STATE_RUNNING""#);
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        assert!(serde_json::from_str::<PipelineState>(r#""PIPELINE_STATE_SOMETHING_NEW""#).is_err());
    }

    #[test]
    fn test_completion_sets() {
        assert!(PipelineState::Paused.is_complete());
        assert!(!PipelineState::Running.is_complete());
        assert!(PipelineState::Failed.is_error());
        assert!(!PipelineState::Cancelled.is_error());
        assert!(JobState::Expired.is_complete());
        assert!(JobState::Expired.is_error());
        assert!(!JobState::Cancelling.is_complete());
    }

    #[test]
    fn test_training_pipeline_deserializes_sparse_response() {
        let json = r#"{
            "name": "projects/p/locations/l/trainingPipelines/7",
            "displayName": "run",
            "trainingTaskDefinition": "gs://google-cloud-platform/schema/trainingjob/definition/custom_task_1.0.0.yaml",
            "state": "PIPELINE_STATE_SUCCEEDED",
            "modelToUpload": {"name": "projects/p/locations/l/models/9", "displayName": "m"}
        }"#;
        let pipeline: TrainingPipeline = serde_json::from_str(json).unwrap();
        assert_eq!(pipeline.state, PipelineState::Succeeded);
        assert_eq!(pipeline.model_to_upload.unwrap().name, "projects/p/locations/l/models/9");
        assert!(pipeline.error.is_none());
    }

    #[test]
    fn test_input_config_shape() {
        let config = InputConfig::GcsSource { uri: vec!["gs://b/data.csv".to_string()] };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, serde_json::json!({"gcsSource": {"uri": ["gs://b/data.csv"]}}));
    }

    #[test]
    fn test_dataset_create_request_omits_server_fields() {
        let dataset = Dataset {
            display_name: "images".to_string(),
            metadata_schema_uri: "gs://schema/image.yaml".to_string(),
            ..Dataset::default()
        };
        let value = serde_json::to_value(&dataset).unwrap();
        assert!(value.get("name").is_none());
        assert!(value.get("createTime").is_none());
        assert_eq!(value["displayName"], "images");
    }

    #[test]
    fn test_status_display() {
        let status = Status { code: 13, message: "boom".to_string(), details: vec![] };
        assert!(!status.is_ok());
        assert_eq!(status.to_string(), "code: 13 message: boom");
    }
}
