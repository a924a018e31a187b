//! Async service traits for the platform's remote RPC surface.
//!
//! Every method takes fully formatted resource names (`projects/.../...`)
//! and returns the mirrored message type or a [`ServiceError`]. Backends must
//! be `Send + Sync` so one client can be shared by all resource wrappers.

use crate::types::{
    CreateTensorboardRunRequest, CreateTensorboardTimeSeriesRequest, Dataset, ImportDataConfig,
    Model, Operation, Tensorboard, TensorboardRun, TensorboardTimeSeries, TrainingPipeline,
    TuningJob,
};
use crate::ServiceError;
use async_trait::async_trait;

/// Dataset CRUD and data import.
#[async_trait]
pub trait DatasetService: Send + Sync {
    /// Starts dataset creation under `parent` (`projects/{p}/locations/{l}`).
    async fn create_dataset(&self, parent: &str, dataset: &Dataset) -> Result<Operation, ServiceError>;

    async fn get_dataset(&self, name: &str) -> Result<Dataset, ServiceError>;

    async fn list_datasets(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<Dataset>, ServiceError>;

    /// Starts importing data items into the dataset `name`.
    async fn import_data(
        &self,
        name: &str,
        import_configs: &[ImportDataConfig],
    ) -> Result<Operation, ServiceError>;

    async fn delete_dataset(&self, name: &str) -> Result<Operation, ServiceError>;
}

/// Long-running operation lookup.
#[async_trait]
pub trait OperationsService: Send + Sync {
    async fn get_operation(&self, name: &str) -> Result<Operation, ServiceError>;
}

/// Training pipelines.
#[async_trait]
pub trait PipelineService: Send + Sync {
    async fn create_training_pipeline(
        &self,
        parent: &str,
        pipeline: &TrainingPipeline,
    ) -> Result<TrainingPipeline, ServiceError>;

    async fn get_training_pipeline(&self, name: &str) -> Result<TrainingPipeline, ServiceError>;

    async fn list_training_pipelines(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TrainingPipeline>, ServiceError>;

    /// Requests cancellation. Fails with `FailedPrecondition` once the
    /// pipeline has already reached a terminal state.
    async fn cancel_training_pipeline(&self, name: &str) -> Result<(), ServiceError>;

    async fn delete_training_pipeline(&self, name: &str) -> Result<Operation, ServiceError>;
}

/// Foundation-model tuning jobs.
#[async_trait]
pub trait TuningService: Send + Sync {
    async fn create_tuning_job(&self, parent: &str, job: &TuningJob) -> Result<TuningJob, ServiceError>;

    async fn get_tuning_job(&self, name: &str) -> Result<TuningJob, ServiceError>;

    async fn list_tuning_jobs(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TuningJob>, ServiceError>;

    async fn cancel_tuning_job(&self, name: &str) -> Result<(), ServiceError>;
}

/// Model registry.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn get_model(&self, name: &str) -> Result<Model, ServiceError>;

    async fn delete_model(&self, name: &str) -> Result<Operation, ServiceError>;
}

/// Tensorboard experiments, runs and time series.
#[async_trait]
pub trait TensorboardService: Send + Sync {
    async fn get_tensorboard(&self, name: &str) -> Result<Tensorboard, ServiceError>;

    async fn get_tensorboard_run(&self, name: &str) -> Result<TensorboardRun, ServiceError>;

    /// Creates a run under an experiment with an explicit run id.
    async fn create_tensorboard_run(
        &self,
        parent: &str,
        run: &TensorboardRun,
        run_id: &str,
    ) -> Result<TensorboardRun, ServiceError>;

    /// Creates several runs under the experiment `parent` in one call.
    async fn batch_create_tensorboard_runs(
        &self,
        parent: &str,
        requests: &[CreateTensorboardRunRequest],
    ) -> Result<Vec<TensorboardRun>, ServiceError>;

    async fn get_tensorboard_time_series(
        &self,
        name: &str,
    ) -> Result<TensorboardTimeSeries, ServiceError>;

    async fn list_tensorboard_time_series(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError>;

    async fn create_tensorboard_time_series(
        &self,
        parent: &str,
        time_series: &TensorboardTimeSeries,
    ) -> Result<TensorboardTimeSeries, ServiceError>;

    /// Creates time series for several runs of the experiment `parent`.
    async fn batch_create_tensorboard_time_series(
        &self,
        parent: &str,
        requests: &[CreateTensorboardTimeSeriesRequest],
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError>;
}
