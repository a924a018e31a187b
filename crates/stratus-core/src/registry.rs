//! Schema URI to training job wrapper dispatch.

use crate::context::PlatformContext;
use crate::error::{SdkError, SdkResult};
use crate::schema;
use crate::training::{
    AutoMlForecastingTrainingJob, AutoMlImageTrainingJob, AutoMlTabularTrainingJob,
    AutoMlTextTrainingJob, AutoMlVideoTrainingJob, CustomTrainingJob, TrainingJob, TypedTrainingJob,
};
use std::collections::HashMap;
use tracing::debug;

/// Wraps a fetched pipeline in its typed wrapper.
pub type JobConstructor = fn(TrainingJob) -> TypedTrainingJob;

#[derive(Clone, Copy)]
struct Registration {
    type_name: &'static str,
    construct: JobConstructor,
}

/// Maps each training task schema URI to exactly one wrapper type.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, Registration>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemas: Vec<_> = self.entries.keys().collect();
        schemas.sort();
        f.debug_struct("SchemaRegistry").field("schemas", &schemas).finish()
    }
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in wrapper type.
    #[must_use]
    pub fn with_defaults() -> Self {
        let defaults: [(&str, &'static str, JobConstructor); 15] = [
            (schema::CUSTOM_TASK, "CustomTrainingJob", custom),
            (schema::CUSTOM_PYTHON_PACKAGE_TASK, "CustomTrainingJob", custom),
            (schema::CUSTOM_CONTAINER_TASK, "CustomTrainingJob", custom),
            (schema::AUTOML_TABULAR, "AutoMlTabularTrainingJob", tabular),
            (schema::AUTOML_FORECASTING, "AutoMlForecastingTrainingJob", forecasting),
            (schema::AUTOML_IMAGE_CLASSIFICATION, "AutoMlImageTrainingJob", image),
            (schema::AUTOML_IMAGE_OBJECT_DETECTION, "AutoMlImageTrainingJob", image),
            (schema::AUTOML_IMAGE_SEGMENTATION, "AutoMlImageTrainingJob", image),
            (schema::AUTOML_TEXT_CLASSIFICATION, "AutoMlTextTrainingJob", text),
            (schema::AUTOML_TEXT_EXTRACTION, "AutoMlTextTrainingJob", text),
            (schema::AUTOML_TEXT_SENTIMENT, "AutoMlTextTrainingJob", text),
            (schema::AUTOML_VIDEO_CLASSIFICATION, "AutoMlVideoTrainingJob", video),
            (schema::AUTOML_VIDEO_ACTION_RECOGNITION, "AutoMlVideoTrainingJob", video),
            (schema::AUTOML_VIDEO_OBJECT_TRACKING, "AutoMlVideoTrainingJob", video),
            (schema::AUTOML_FORECASTING_SEQ2SEQ, "AutoMlForecastingTrainingJob", forecasting),
        ];

        let mut registry = Self::new();
        for (schema_uri, type_name, construct) in defaults {
            registry
                .entries
                .insert(schema_uri.to_string(), Registration { type_name, construct });
        }
        registry
    }

    /// Claims `schema_uri` for `type_name`.
    ///
    /// # Errors
    /// [`SdkError::AmbiguousSchema`] if another type already claims the URI.
    pub fn register(
        &mut self,
        schema_uri: &str,
        type_name: &'static str,
        construct: JobConstructor,
    ) -> SdkResult<()> {
        if let Some(existing) = self.entries.get(schema_uri) {
            return Err(SdkError::AmbiguousSchema {
                schema_uri: schema_uri.to_string(),
                existing: existing.type_name.to_string(),
            });
        }
        self.entries.insert(schema_uri.to_string(), Registration { type_name, construct });
        Ok(())
    }

    /// Name of the wrapper type claiming `schema_uri`.
    #[must_use]
    pub fn lookup(&self, schema_uri: &str) -> Option<&'static str> {
        self.entries.get(schema_uri).map(|r| r.type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wraps `job` in the type registered for its schema.
    ///
    /// # Errors
    /// [`SdkError::UnsupportedSchema`] if nothing claims the schema.
    pub fn construct(&self, job: TrainingJob) -> SdkResult<TypedTrainingJob> {
        let registration = self.entries.get(job.schema_uri()).ok_or_else(|| {
            SdkError::UnsupportedSchema { schema_uri: job.schema_uri().to_string() }
        })?;
        debug!(
            pipeline = %job.resource_name(),
            kind = registration.type_name,
            "Resolved training job type"
        );
        Ok((registration.construct)(job))
    }
}

fn custom(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::Custom(CustomTrainingJob::new(job))
}

fn tabular(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::AutoMlTabular(AutoMlTabularTrainingJob::new(job))
}

fn forecasting(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::AutoMlForecasting(AutoMlForecastingTrainingJob::new(job))
}

fn image(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::AutoMlImage(AutoMlImageTrainingJob::new(job))
}

fn text(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::AutoMlText(AutoMlTextTrainingJob::new(job))
}

fn video(job: TrainingJob) -> TypedTrainingJob {
    TypedTrainingJob::AutoMlVideo(AutoMlVideoTrainingJob::new(job))
}

impl TrainingJob {
    /// Fetches a pipeline once and wraps it in the type its schema selects.
    pub async fn get_typed(
        ctx: &PlatformContext,
        registry: &SchemaRegistry,
        name: &str,
    ) -> SdkResult<TypedTrainingJob> {
        let job = Self::get(ctx, name).await?;
        registry.construct(job)
    }
}
