//! Foundation model tuning jobs.

use crate::context::PlatformContext;
use crate::error::{SdkError, SdkResult};
use crate::resource_name::ResourceName;
use crate::wait::{block_until_complete, CompletableJob, CompletedJob, WaitPolicy};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use stratus_abstraction::{
    DistillationSpec, EncryptionSpec, JobState, Status, SupervisedTuningSpec,
    TuningJob as RemoteTuningJob,
};
use tracing::info;

const DISPLAY_NAME_PREFIX: &str = "tuned-model";

/// How the base model is tuned.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningSpec {
    Supervised(SupervisedTuningSpec),
    Distillation(DistillationSpec),
}

impl TuningSpec {
    fn training_dataset_uri(&self) -> &str {
        match self {
            Self::Supervised(spec) => &spec.training_dataset_uri,
            Self::Distillation(spec) => &spec.training_dataset_uri,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TuningJobSpec {
    pub base_model: String,
    pub tuning: TuningSpec,
    /// Generated from the current UTC time when absent.
    pub tuned_model_display_name: Option<String>,
    pub description: String,
    pub labels: HashMap<String, String>,
}

impl TuningJobSpec {
    #[must_use]
    pub fn new(base_model: impl Into<String>, tuning: TuningSpec) -> Self {
        Self {
            base_model: base_model.into(),
            tuning,
            tuned_model_display_name: None,
            description: String::new(),
            labels: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.tuned_model_display_name = Some(name.into());
        self
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.base_model.trim().is_empty() {
            return Err(SdkError::Precondition("tuning base_model is required".to_string()));
        }
        if self.tuning.training_dataset_uri().trim().is_empty() {
            return Err(SdkError::Precondition("tuning training_dataset_uri is required".to_string()));
        }
        Ok(())
    }

    fn to_request(&self, encryption_key: Option<&str>) -> RemoteTuningJob {
        let tuned_model_display_name = self
            .tuned_model_display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(generate_display_name);

        let (supervised_tuning_spec, distillation_spec) = match &self.tuning {
            TuningSpec::Supervised(spec) => (Some(spec.clone()), None),
            TuningSpec::Distillation(spec) => (None, Some(spec.clone())),
        };

        RemoteTuningJob {
            base_model: self.base_model.clone(),
            tuned_model_display_name,
            description: self.description.clone(),
            supervised_tuning_spec,
            distillation_spec,
            labels: self.labels.clone(),
            encryption_spec: encryption_key.map(|k| EncryptionSpec { kms_key_name: k.to_string() }),
            ..RemoteTuningJob::default()
        }
    }
}

fn generate_display_name() -> String {
    format!("{DISPLAY_NAME_PREFIX}-{}", Utc::now().format("%Y-%m-%d-%H%M%S"))
}

/// A tuning job on the platform.
#[derive(Debug, Clone)]
pub struct TuningJob {
    ctx: PlatformContext,
    name: ResourceName,
    resource: RemoteTuningJob,
    experiment_logged: bool,
}

impl TuningJob {
    pub async fn create(ctx: &PlatformContext, spec: &TuningJobSpec) -> SdkResult<Self> {
        spec.validate()?;
        let request = spec.to_request(ctx.config().encryption_spec_key_name.as_deref());
        let parent = ctx.config().location_path();
        info!(
            parent = %parent,
            base_model = %request.base_model,
            display_name = %request.tuned_model_display_name,
            "Creating TuningJob"
        );

        let created = ctx.tuning.create_tuning_job(&parent, &request).await?;
        let mut job = Self::from_resource(ctx, created)?;
        info!(tuning_job = %job.name, "TuningJob created");
        info!(url = %job.dashboard_url(), "View Tuning Job");
        job.log_experiment_once();
        Ok(job)
    }

    pub async fn get(ctx: &PlatformContext, name: &str) -> SdkResult<Self> {
        let parsed = ResourceName::parse(name)?;
        let resource = ctx.tuning.get_tuning_job(name).await?;
        Ok(Self { ctx: ctx.clone(), name: parsed, resource, experiment_logged: false })
    }

    pub async fn list(ctx: &PlatformContext, filter: Option<&str>) -> SdkResult<Vec<Self>> {
        let parent = ctx.config().location_path();
        ctx.tuning
            .list_tuning_jobs(&parent, filter)
            .await?
            .into_iter()
            .map(|job| Self::from_resource(ctx, job))
            .collect()
    }

    fn from_resource(ctx: &PlatformContext, resource: RemoteTuningJob) -> SdkResult<Self> {
        let name = ResourceName::parse(&resource.name)?;
        Ok(Self { ctx: ctx.clone(), name, resource, experiment_logged: false })
    }

    #[must_use]
    pub const fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    #[must_use]
    pub const fn snapshot(&self) -> &RemoteTuningJob {
        &self.resource
    }

    #[must_use]
    pub const fn state(&self) -> JobState {
        self.resource.state
    }

    #[must_use]
    pub const fn has_ended(&self) -> bool {
        self.resource.state.is_complete()
    }

    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.resource.state == JobState::Succeeded
    }

    #[must_use]
    pub const fn error(&self) -> Option<&Status> {
        self.resource.error.as_ref()
    }

    #[must_use]
    pub fn tuned_model_name(&self) -> Option<&str> {
        self.resource.tuned_model.as_ref().map(|m| m.model.as_str()).filter(|m| !m.is_empty())
    }

    #[must_use]
    pub fn tuned_model_endpoint_name(&self) -> Option<&str> {
        self.resource.tuned_model.as_ref().map(|m| m.endpoint.as_str()).filter(|e| !e.is_empty())
    }

    /// Resource name of the attached experiment context.
    #[must_use]
    pub fn experiment(&self) -> Option<&str> {
        self.resource.experiment.as_deref().filter(|e| !e.is_empty())
    }

    #[must_use]
    pub const fn tuning_data_statistics(&self) -> Option<&serde_json::Value> {
        self.resource.tuning_data_stats.as_ref()
    }

    /// Console page for this job.
    #[must_use]
    pub fn dashboard_url(&self) -> String {
        format!(
            "https://console.cloud.google.com/vertex-ai/generative/language/locations/{}/tuning/tuningJob/{}?project={}",
            self.name.location_id(),
            self.name.resource_id().unwrap_or_default(),
            self.name.project(),
        )
    }

    pub async fn refresh(&mut self) -> SdkResult<&RemoteTuningJob> {
        self.resource = self.ctx.tuning.get_tuning_job(&self.name.to_string()).await?;
        self.log_experiment_once();
        Ok(&self.resource)
    }

    pub async fn cancel(&self) -> SdkResult<()> {
        info!(tuning_job = %self.name, "Cancelling TuningJob");
        self.ctx.tuning.cancel_tuning_job(&self.name.to_string()).await?;
        Ok(())
    }

    pub async fn wait(&mut self, policy: &WaitPolicy) -> SdkResult<CompletedJob> {
        block_until_complete(self, policy).await
    }

    fn log_experiment_once(&mut self) {
        if self.experiment_logged {
            return;
        }
        let Some(experiment) = self.experiment() else { return };
        let url = match ResourceName::parse(experiment) {
            Ok(parsed) => format!(
                "https://console.cloud.google.com/vertex-ai/experiments/locations/{}/experiments/{}/runs?project={}",
                parsed.location_id(),
                parsed.resource_id().unwrap_or_default(),
                parsed.project(),
            ),
            Err(_) => experiment.to_string(),
        };
        info!(url = %url, "View experiment");
        self.experiment_logged = true;
    }
}

#[async_trait]
impl CompletableJob for TuningJob {
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
                message: format!("tuning job ended in {}", self.resource.state),
                details: Vec::new(),
            }));
        }
        error
    }

    fn model_name(&self) -> Option<String> {
        self.tuned_model_name().map(str::to_string)
    }
}
