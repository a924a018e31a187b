//! Training pipelines and their typed wrappers.

use crate::context::PlatformContext;
use crate::error::{SdkError, SdkResult};
use crate::handle::JobHandle;
use crate::operation::OperationHandle;
use crate::resource_name::ResourceName;
use crate::schema;
use crate::wait::{block_until_complete, CompletableJob, CompletedJob, WaitPolicy};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use stratus_abstraction::{
    EncryptionSpec, FractionSplit, InputDataConfig, Model, PipelineState, Status, TrainingPipeline,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    pub machine_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub image_uri: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPoolSpec {
    pub machine_spec: MachineSpec,
    pub replica_count: i64,
    pub container_spec: ContainerSpec,
}

impl WorkerPoolSpec {
    #[must_use]
    pub fn container(machine_type: &str, image_uri: &str, args: Vec<String>) -> Self {
        Self {
            machine_spec: MachineSpec {
                machine_type: machine_type.to_string(),
                accelerator_type: None,
                accelerator_count: None,
            },
            replica_count: 1,
            container_spec: ContainerSpec { image_uri: image_uri.to_string(), command: Vec::new(), args },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularPrediction {
    Classification,
    Regression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageObjective {
    Classification { multi_label: bool },
    ObjectDetection,
    Segmentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjective {
    Classification { multi_label: bool },
    Extraction,
    Sentiment { sentiment_max: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoObjective {
    Classification,
    ActionRecognition,
    ObjectTracking,
}

/// The training task of a pipeline; each variant maps to one schema URI.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingTaskInputs {
    Custom {
        worker_pool_specs: Vec<WorkerPoolSpec>,
        base_output_directory: Option<String>,
    },
    AutoMlTabular {
        prediction_type: TabularPrediction,
        target_column: String,
        optimization_objective: Option<String>,
        budget_milli_node_hours: i64,
    },
    AutoMlForecasting {
        target_column: String,
        time_column: String,
        time_series_identifier_column: String,
        forecast_horizon: i64,
        budget_milli_node_hours: i64,
    },
    AutoMlImage {
        objective: ImageObjective,
        model_type: String,
        budget_milli_node_hours: i64,
    },
    AutoMlText {
        objective: TextObjective,
    },
    AutoMlVideo {
        objective: VideoObjective,
        model_type: String,
    },
}

impl TrainingTaskInputs {
    #[must_use]
    pub const fn schema_uri(&self) -> &'static str {
        match self {
            Self::Custom { .. } => schema::CUSTOM_TASK,
            Self::AutoMlTabular { .. } => schema::AUTOML_TABULAR,
            Self::AutoMlForecasting { .. } => schema::AUTOML_FORECASTING,
            Self::AutoMlImage { objective, .. } => match objective {
                ImageObjective::Classification { .. } => schema::AUTOML_IMAGE_CLASSIFICATION,
                ImageObjective::ObjectDetection => schema::AUTOML_IMAGE_OBJECT_DETECTION,
                ImageObjective::Segmentation => schema::AUTOML_IMAGE_SEGMENTATION,
            },
            Self::AutoMlText { objective } => match objective {
                TextObjective::Classification { .. } => schema::AUTOML_TEXT_CLASSIFICATION,
                TextObjective::Extraction => schema::AUTOML_TEXT_EXTRACTION,
                TextObjective::Sentiment { .. } => schema::AUTOML_TEXT_SENTIMENT,
            },
            Self::AutoMlVideo { objective, .. } => match objective {
                VideoObjective::Classification => schema::AUTOML_VIDEO_CLASSIFICATION,
                VideoObjective::ActionRecognition => schema::AUTOML_VIDEO_ACTION_RECOGNITION,
                VideoObjective::ObjectTracking => schema::AUTOML_VIDEO_OBJECT_TRACKING,
            },
        }
    }

    #[must_use]
    pub const fn needs_dataset(&self) -> bool {
        !matches!(self, Self::Custom { .. })
    }

    /// The `trainingTaskInputs` payload.
    pub fn to_json(&self) -> SdkResult<serde_json::Value> {
        let value = match self {
            Self::Custom { worker_pool_specs, base_output_directory } => {
                let mut inputs =
                    serde_json::json!({ "workerPoolSpecs": serde_json::to_value(worker_pool_specs)? });
                if let Some(dir) = base_output_directory {
                    inputs["baseOutputDirectory"] = serde_json::json!({ "outputUriPrefix": dir });
                }
                inputs
            }
            Self::AutoMlTabular {
                prediction_type,
                target_column,
                optimization_objective,
                budget_milli_node_hours,
            } => {
                let mut inputs = serde_json::json!({
                    "predictionType": match prediction_type {
                        TabularPrediction::Classification => "classification",
                        TabularPrediction::Regression => "regression",
                    },
                    "targetColumn": target_column,
                    "trainBudgetMilliNodeHours": budget_milli_node_hours,
                });
                if let Some(objective) = optimization_objective {
                    inputs["optimizationObjective"] = serde_json::json!(objective);
                }
                inputs
            }
            Self::AutoMlForecasting {
                target_column,
                time_column,
                time_series_identifier_column,
                forecast_horizon,
                budget_milli_node_hours,
            } => serde_json::json!({
                "targetColumn": target_column,
                "timeColumn": time_column,
                "timeSeriesIdentifierColumn": time_series_identifier_column,
                "forecastHorizon": forecast_horizon,
                "trainBudgetMilliNodeHours": budget_milli_node_hours,
            }),
            Self::AutoMlImage { objective, model_type, budget_milli_node_hours } => {
                let mut inputs = serde_json::json!({
                    "modelType": model_type,
                    "budgetMilliNodeHours": budget_milli_node_hours,
                });
                if let ImageObjective::Classification { multi_label } = objective {
                    inputs["multiLabel"] = serde_json::json!(multi_label);
                }
                inputs
            }
            Self::AutoMlText { objective } => match objective {
                TextObjective::Classification { multi_label } => {
                    serde_json::json!({ "multiLabel": multi_label })
                }
                TextObjective::Extraction => serde_json::json!({}),
                TextObjective::Sentiment { sentiment_max } => {
                    serde_json::json!({ "sentimentMax": sentiment_max })
                }
            },
            Self::AutoMlVideo { model_type, .. } => serde_json::json!({ "modelType": model_type }),
        };
        Ok(value)
    }

    fn validate(&self) -> SdkResult<()> {
        let invalid = |msg: &str| Err(SdkError::Precondition(msg.to_string()));
        match self {
            Self::Custom { worker_pool_specs, .. } => {
                if worker_pool_specs.is_empty() {
                    return invalid("custom training requires at least one worker pool spec");
                }
                for pool in worker_pool_specs {
                    if pool.replica_count < 1 {
                        return invalid("worker pool replica_count must be >= 1");
                    }
                    if pool.container_spec.image_uri.trim().is_empty() {
                        return invalid("worker pool container image_uri is required");
                    }
                    if pool.machine_spec.machine_type.trim().is_empty() {
                        return invalid("worker pool machine_type is required");
                    }
                }
            }
            Self::AutoMlTabular { target_column, budget_milli_node_hours, .. } => {
                if target_column.trim().is_empty() {
                    return invalid("target_column is required");
                }
                if *budget_milli_node_hours <= 0 {
                    return invalid("budget_milli_node_hours must be > 0");
                }
            }
            Self::AutoMlForecasting { target_column, time_column, forecast_horizon, budget_milli_node_hours, .. } => {
                if target_column.trim().is_empty() || time_column.trim().is_empty() {
                    return invalid("target_column and time_column are required");
                }
                if *forecast_horizon <= 0 {
                    return invalid("forecast_horizon must be > 0");
                }
                if *budget_milli_node_hours <= 0 {
                    return invalid("budget_milli_node_hours must be > 0");
                }
            }
            Self::AutoMlImage { budget_milli_node_hours, .. } => {
                if *budget_milli_node_hours <= 0 {
                    return invalid("budget_milli_node_hours must be > 0");
                }
            }
            Self::AutoMlText { .. } | Self::AutoMlVideo { .. } => {}
        }
        Ok(())
    }
}

/// Everything needed to submit a training pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPipelineSpec {
    pub display_name: String,
    pub task: TrainingTaskInputs,
    /// Dataset id (not full name) to train on; required for AutoML tasks.
    pub dataset_id: Option<String>,
    pub fraction_split: Option<FractionSplit>,
    /// Display name of the model to upload on success.
    pub model_display_name: Option<String>,
    pub labels: HashMap<String, String>,
}

impl TrainingPipelineSpec {
    #[must_use]
    pub fn new(display_name: impl Into<String>, task: TrainingTaskInputs) -> Self {
        Self {
            display_name: display_name.into(),
            task,
            dataset_id: None,
            fraction_split: None,
            model_display_name: None,
            labels: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model_display_name: impl Into<String>) -> Self {
        self.model_display_name = Some(model_display_name.into());
        self
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.display_name.trim().is_empty() {
            return Err(SdkError::Precondition("training display_name is required".to_string()));
        }
        if self.task.needs_dataset() && self.dataset_id.is_none() {
            return Err(SdkError::Precondition(format!(
                "{} requires a dataset",
                self.task.schema_uri()
            )));
        }
        if let Some(split) = &self.fraction_split {
            let total = split.training_fraction + split.validation_fraction + split.test_fraction;
            if (total - 1.0).abs() > 1e-6 {
                return Err(SdkError::Precondition(format!("fraction split must sum to 1, got {total}")));
            }
        }
        self.task.validate()
    }

    fn to_request(&self, encryption_key: Option<&str>) -> SdkResult<TrainingPipeline> {
        Ok(TrainingPipeline {
            display_name: self.display_name.clone(),
            training_task_definition: self.task.schema_uri().to_string(),
            training_task_inputs: self.task.to_json()?,
            input_data_config: self.dataset_id.as_ref().map(|dataset_id| InputDataConfig {
                dataset_id: dataset_id.clone(),
                fraction_split: self.fraction_split.clone(),
            }),
            model_to_upload: self.model_display_name.as_ref().map(|display_name| Model {
                display_name: display_name.clone(),
                ..Model::default()
            }),
            labels: self.labels.clone(),
            encryption_spec: encryption_key.map(|k| EncryptionSpec { kms_key_name: k.to_string() }),
            ..TrainingPipeline::default()
        })
    }
}

/// A training pipeline on the platform.
#[derive(Debug, Clone)]
pub struct TrainingJob {
    ctx: PlatformContext,
    name: ResourceName,
    resource: TrainingPipeline,
}

impl TrainingJob {
    pub async fn get(ctx: &PlatformContext, name: &str) -> SdkResult<Self> {
        let parsed = ResourceName::parse(name)?;
        let resource = ctx.pipelines.get_training_pipeline(name).await?;
        Ok(Self { ctx: ctx.clone(), name: parsed, resource })
    }

    pub async fn list(ctx: &PlatformContext, filter: Option<&str>) -> SdkResult<Vec<Self>> {
        let parent = ctx.config().location_path();
        ctx.pipelines
            .list_training_pipelines(&parent, filter)
            .await?
            .into_iter()
            .map(|p| Self::from_resource(ctx, p))
            .collect()
    }

    pub(crate) fn from_resource(ctx: &PlatformContext, resource: TrainingPipeline) -> SdkResult<Self> {
        let name = ResourceName::parse(&resource.name)?;
        Ok(Self { ctx: ctx.clone(), name, resource })
    }

    /// Creates the pipeline and returns without waiting for it.
    pub async fn submit(ctx: &PlatformContext, spec: &TrainingPipelineSpec) -> SdkResult<Self> {
        spec.validate()?;
        let request = spec.to_request(ctx.config().encryption_spec_key_name.as_deref())?;
        let parent = ctx.config().location_path();
        info!(parent = %parent, display_name = %spec.display_name, "Creating TrainingPipeline");
        let created = ctx.pipelines.create_training_pipeline(&parent, &request).await?;
        info!(pipeline = %created.name, state = %created.state, "TrainingPipeline created");
        Self::from_resource(ctx, created)
    }

    /// Submits and waits on a background task; join the handle for the outcome.
    pub fn submit_in_background(
        ctx: &PlatformContext,
        spec: TrainingPipelineSpec,
        policy: WaitPolicy,
    ) -> JobHandle<CompletedJob> {
        let ctx = ctx.clone();
        JobHandle::spawn(async move {
            let mut job = Self::submit(&ctx, &spec).await?;
            job.wait(&policy).await
        })
    }

    #[must_use]
    pub const fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    #[must_use]
    pub const fn snapshot(&self) -> &TrainingPipeline {
        &self.resource
    }

    #[must_use]
    pub fn schema_uri(&self) -> &str {
        &self.resource.training_task_definition
    }

    /// State as of the last fetch.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.resource.state
    }

    #[must_use]
    pub const fn has_ended(&self) -> bool {
        self.resource.state.is_complete()
    }

    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.resource.state == PipelineState::Succeeded
    }

    #[must_use]
    pub const fn error(&self) -> Option<&Status> {
        self.resource.error.as_ref()
    }

    /// Resource name of the uploaded model, once the pipeline produced one.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.resource.model_to_upload.as_ref().map(|m| m.name.as_str()).filter(|n| !n.is_empty())
    }

    pub async fn refresh(&mut self) -> SdkResult<&TrainingPipeline> {
        self.resource = self.ctx.pipelines.get_training_pipeline(&self.name.to_string()).await?;
        Ok(&self.resource)
    }

    pub async fn cancel(&self) -> SdkResult<()> {
        info!(pipeline = %self.name, "Cancelling TrainingPipeline");
        self.ctx.pipelines.cancel_training_pipeline(&self.name.to_string()).await?;
        Ok(())
    }

    pub async fn delete(&self, timeout: Duration) -> SdkResult<()> {
        info!(pipeline = %self.name, "Deleting TrainingPipeline");
        let operation = self.ctx.pipelines.delete_training_pipeline(&self.name.to_string()).await?;
        OperationHandle::new(operation, self.ctx.operations.clone()).result(timeout).await?;
        Ok(())
    }

    /// Blocks until the pipeline completes.
    pub async fn wait(&mut self, policy: &WaitPolicy) -> SdkResult<CompletedJob> {
        block_until_complete(self, policy).await
    }
}

#[async_trait]
impl CompletableJob for TrainingJob {
    fn resource_name(&self) -> &str {
        &self.resource.name
    }

    async fn refresh(&mut self) -> SdkResult<()> {
        Self::refresh(self).await.map(|_| ())
    }

    fn state_label(&self) -> String {
        self.resource.state.to_string()
    }

    fn is_complete(&self) -> bool {
        self.has_ended()
    }

    fn failure(&self) -> Option<Status> {
        let error = self.resource.error.clone().filter(|s| !s.is_ok());
        if self.resource.state.is_error() {
            return Some(error.unwrap_or_else(|| Status {
                code: 2,
                message: "pipeline failed without an error status".to_string(),
                details: Vec::new(),
            }));
        }
        error
    }

    fn model_name(&self) -> Option<String> {
        Self::model_name(self).map(str::to_string)
    }
}

/// Submits a training spec at most once.
///
/// A submission that fails before the pipeline exists releases the claim, so
/// the runner can be retried.
#[derive(Debug)]
pub struct TrainingJobRunner {
    ctx: PlatformContext,
    spec: TrainingPipelineSpec,
    launched: Arc<Mutex<Option<String>>>,
}

fn lock_launch(launched: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    launched.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TrainingJobRunner {
    /// Validates `spec` up front so misconfiguration fails before any remote call.
    pub fn new(ctx: &PlatformContext, spec: TrainingPipelineSpec) -> SdkResult<Self> {
        spec.validate()?;
        Ok(Self { ctx: ctx.clone(), spec, launched: Arc::new(Mutex::new(None)) })
    }

    fn claim(&self) -> SdkResult<()> {
        let mut launched = lock_launch(&self.launched);
        if let Some(name) = launched.as_ref() {
            return Err(SdkError::Precondition(format!("training job already run as {name}")));
        }
        *launched = Some(self.spec.display_name.clone());
        Ok(())
    }

    /// Submits the pipeline and returns without waiting.
    pub async fn run(&mut self) -> SdkResult<TrainingJob> {
        self.claim()?;
        let submitted = TrainingJob::submit(&self.ctx, &self.spec).await;
        *lock_launch(&self.launched) = submitted.as_ref().ok().map(|job| job.resource_name().to_string());
        submitted
    }

    /// Submits and waits for completion on a background task.
    ///
    /// The returned handle must be joined to observe the outcome.
    pub fn run_in_background(&mut self, policy: WaitPolicy) -> SdkResult<JobHandle<CompletedJob>> {
        self.claim()?;
        let ctx = self.ctx.clone();
        let spec = self.spec.clone();
        let launched = Arc::clone(&self.launched);
        Ok(JobHandle::spawn(async move {
            let submitted = TrainingJob::submit(&ctx, &spec).await;
            *lock_launch(&launched) = submitted.as_ref().ok().map(|job| job.resource_name().to_string());
            submitted?.wait(&policy).await
        }))
    }
}

/// Custom container/python training.
#[derive(Debug, Clone)]
pub struct CustomTrainingJob {
    job: TrainingJob,
    logged_web_access: HashSet<String>,
}

impl CustomTrainingJob {
    #[must_use]
    pub fn new(job: TrainingJob) -> Self {
        Self { job, logged_web_access: HashSet::new() }
    }

    #[must_use]
    pub const fn job(&self) -> &TrainingJob {
        &self.job
    }

    /// Interactive shell URIs keyed by worker, once the service reports them.
    #[must_use]
    pub fn web_access_uris(&self) -> HashMap<String, String> {
        self.job
            .resource
            .training_task_metadata
            .get("webAccessUris")
            .and_then(serde_json::Value::as_object)
            .map(|uris| {
                uris.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn wait(&mut self, policy: &WaitPolicy) -> SdkResult<CompletedJob> {
        block_until_complete(self, policy).await
    }
}

#[async_trait]
impl CompletableJob for CustomTrainingJob {
    fn resource_name(&self) -> &str {
        CompletableJob::resource_name(&self.job)
    }

    async fn refresh(&mut self) -> SdkResult<()> {
        CompletableJob::refresh(&mut self.job).await
    }

    fn state_label(&self) -> String {
        self.job.state_label()
    }

    fn is_complete(&self) -> bool {
        self.job.has_ended()
    }

    fn failure(&self) -> Option<Status> {
        self.job.failure()
    }

    fn model_name(&self) -> Option<String> {
        CompletableJob::model_name(&self.job)
    }

    fn on_poll(&mut self) {
        for (worker, uri) in self.web_access_uris() {
            if self.logged_web_access.insert(worker.clone()) {
                info!(worker = %worker, uri = %uri, "Web access available");
            }
        }
    }
}

macro_rules! automl_wrapper {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(TrainingJob);

        impl $name {
            #[must_use]
            pub const fn new(job: TrainingJob) -> Self {
                Self(job)
            }

            #[must_use]
            pub const fn job(&self) -> &TrainingJob {
                &self.0
            }

            pub async fn wait(&mut self, policy: &WaitPolicy) -> SdkResult<CompletedJob> {
                self.0.wait(policy).await
            }
        }
    };
}

automl_wrapper!(
    /// AutoML classification/regression on tables.
    AutoMlTabularTrainingJob
);
automl_wrapper!(
    /// AutoML time-series forecasting.
    AutoMlForecastingTrainingJob
);
automl_wrapper!(AutoMlImageTrainingJob);
automl_wrapper!(AutoMlTextTrainingJob);
automl_wrapper!(AutoMlVideoTrainingJob);

impl AutoMlTabularTrainingJob {
    #[must_use]
    pub fn target_column(&self) -> Option<&str> {
        self.0.resource.training_task_inputs.get("targetColumn").and_then(serde_json::Value::as_str)
    }
}

impl AutoMlForecastingTrainingJob {
    #[must_use]
    pub fn forecast_horizon(&self) -> Option<i64> {
        self.0.resource.training_task_inputs.get("forecastHorizon").and_then(serde_json::Value::as_i64)
    }
}

/// A training job resolved to the wrapper that understands its schema.
#[derive(Debug, Clone)]
pub enum TypedTrainingJob {
    Custom(CustomTrainingJob),
    AutoMlTabular(AutoMlTabularTrainingJob),
    AutoMlForecasting(AutoMlForecastingTrainingJob),
    AutoMlImage(AutoMlImageTrainingJob),
    AutoMlText(AutoMlTextTrainingJob),
    AutoMlVideo(AutoMlVideoTrainingJob),
}

impl TypedTrainingJob {
    #[must_use]
    pub const fn job(&self) -> &TrainingJob {
        match self {
            Self::Custom(j) => j.job(),
            Self::AutoMlTabular(j) => j.job(),
            Self::AutoMlForecasting(j) => j.job(),
            Self::AutoMlImage(j) => j.job(),
            Self::AutoMlText(j) => j.job(),
            Self::AutoMlVideo(j) => j.job(),
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Custom(_) => "CustomTrainingJob",
            Self::AutoMlTabular(_) => "AutoMlTabularTrainingJob",
            Self::AutoMlForecasting(_) => "AutoMlForecastingTrainingJob",
            Self::AutoMlImage(_) => "AutoMlImageTrainingJob",
            Self::AutoMlText(_) => "AutoMlTextTrainingJob",
            Self::AutoMlVideo(_) => "AutoMlVideoTrainingJob",
        }
    }

    pub async fn wait(&mut self, policy: &WaitPolicy) -> SdkResult<CompletedJob> {
        debug!(kind = self.type_name(), "Waiting for typed training job");
        match self {
            Self::Custom(j) => j.wait(policy).await,
            Self::AutoMlTabular(j) => j.wait(policy).await,
            Self::AutoMlForecasting(j) => j.wait(policy).await,
            Self::AutoMlImage(j) => j.wait(policy).await,
            Self::AutoMlText(j) => j.wait(policy).await,
            Self::AutoMlVideo(j) => j.wait(policy).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_task() -> TrainingTaskInputs {
        TrainingTaskInputs::Custom {
            worker_pool_specs: vec![WorkerPoolSpec::container(
                "n1-standard-4",
                "us-docker.pkg.dev/proj/train:latest",
                vec!["--epochs=3".to_string()],
            )],
            base_output_directory: Some("gs://bucket/out".to_string()),
        }
    }

    #[test]
    fn test_custom_task_payload() {
        let inputs = custom_task().to_json().unwrap();
        assert_eq!(inputs["workerPoolSpecs"][0]["machineSpec"]["machineType"], "n1-standard-4");
        assert_eq!(inputs["workerPoolSpecs"][0]["replicaCount"], 1);
        assert_eq!(inputs["workerPoolSpecs"][0]["containerSpec"]["args"][0], "--epochs=3");
        assert_eq!(inputs["baseOutputDirectory"]["outputUriPrefix"], "gs://bucket/out");
        assert_eq!(custom_task().schema_uri(), schema::CUSTOM_TASK);
    }

    #[test]
    fn test_schema_follows_objective() {
        let text = TrainingTaskInputs::AutoMlText { objective: TextObjective::Sentiment { sentiment_max: 4 } };
        assert_eq!(text.schema_uri(), schema::AUTOML_TEXT_SENTIMENT);
        assert_eq!(text.to_json().unwrap(), serde_json::json!({"sentimentMax": 4}));

        let image = TrainingTaskInputs::AutoMlImage {
            objective: ImageObjective::ObjectDetection,
            model_type: "CLOUD".to_string(),
            budget_milli_node_hours: 20_000,
        };
        assert_eq!(image.schema_uri(), schema::AUTOML_IMAGE_OBJECT_DETECTION);
    }

    #[test]
    fn test_validate_fails_fast_on_missing_dataset() {
        let spec = TrainingPipelineSpec::new(
            "tabular",
            TrainingTaskInputs::AutoMlTabular {
                prediction_type: TabularPrediction::Regression,
                target_column: "price".to_string(),
                optimization_objective: None,
                budget_milli_node_hours: 1000,
            },
        );
        assert!(matches!(spec.validate(), Err(SdkError::Precondition(_))));
        assert!(spec.with_dataset("123").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_worker_pools_and_splits() {
        let empty = TrainingPipelineSpec::new(
            "custom",
            TrainingTaskInputs::Custom { worker_pool_specs: vec![], base_output_directory: None },
        );
        assert!(empty.validate().is_err());

        let mut spec = TrainingPipelineSpec::new("custom", custom_task());
        spec.fraction_split =
            Some(FractionSplit { training_fraction: 0.8, validation_fraction: 0.1, test_fraction: 0.2 });
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_request_carries_model_and_encryption() {
        let spec = TrainingPipelineSpec::new("custom", custom_task()).with_model("my-model");
        let request = spec.to_request(Some("projects/p/locations/l/keyRings/r/cryptoKeys/k")).unwrap();
        assert_eq!(request.model_to_upload.unwrap().display_name, "my-model");
        assert_eq!(
            request.encryption_spec.unwrap().kms_key_name,
            "projects/p/locations/l/keyRings/r/cryptoKeys/k"
        );
        assert!(request.input_data_config.is_none());
    }
}
