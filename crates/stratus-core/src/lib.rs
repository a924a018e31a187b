//! Stratus Core - resource wrappers and job orchestration for the ML platform.
//!
//! This crate provides:
//! - Typed wrappers for datasets, training pipelines, tuning jobs and models
//! - Terminal-state polling and blocking waits
//! - Tensorboard run and time series name caches
//! - Schema URI dispatch to typed training job wrappers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stratus_client::RestClient;
//! use stratus_core::{ClientConfig, PlatformContext, TrainingJob, WaitPolicy};
//!
//! #[tokio::main]
//! async fn main() -> stratus_core::SdkResult<()> {
//!     let config = ClientConfig::new("my-project", "us-central1").apply_env();
//!     let client = Arc::new(RestClient::new(
//!         &config.base_url(),
//!         config.access_token.clone(),
//!         config.request_timeout(),
//!     )?);
//!     let ctx = PlatformContext::new(config, client);
//!
//!     let mut job = TrainingJob::get(&ctx, "projects/my-project/locations/us-central1/trainingPipelines/1").await?;
//!     let completed = job.wait(&WaitPolicy::default()).await?;
//!     println!("{}", completed.state);
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod handle;
pub mod model;
pub mod operation;
pub mod poller;
pub mod rate_limit;
pub mod registry;
pub mod resource_name;
pub mod schema;
pub mod storage;
pub mod tensorboard;
pub mod training;
pub mod tuning;
pub mod wait;

pub use cleanup::cancel_and_delete;
pub use config::{ApiVersion, ClientConfig};
pub use context::PlatformContext;
pub use dataset::{DatasetResource, DatasetSpec, ImportFormat};
pub use error::{SdkError, SdkResult};
pub use handle::JobHandle;
pub use model::ModelResource;
pub use operation::OperationHandle;
pub use poller::{wait_for_job_state, PollConfig, StatefulResource};
pub use rate_limit::RateLimiter;
pub use registry::{JobConstructor, SchemaRegistry};
pub use resource_name::ResourceName;
pub use storage::{source_bucket, StorageUri};
pub use tensorboard::{blob_storage_location, ExperimentResourceManager, RunTimeSeriesManager};
pub use training::{
    AutoMlForecastingTrainingJob, AutoMlImageTrainingJob, AutoMlTabularTrainingJob,
    AutoMlTextTrainingJob, AutoMlVideoTrainingJob, CustomTrainingJob, TrainingJob,
    TrainingJobRunner, TrainingPipelineSpec, TrainingTaskInputs, TypedTrainingJob, WorkerPoolSpec,
};
pub use tuning::{TuningJob, TuningJobSpec, TuningSpec};
pub use wait::{block_until_complete, CompletableJob, CompletedJob, WaitPolicy};

pub use stratus_abstraction as abstraction;
