//! The explicit session object threaded through every wrapper.

use crate::config::ClientConfig;
use std::sync::Arc;
use stratus_abstraction::{
    DatasetService, ModelService, OperationsService, PipelineService, TensorboardService,
    TuningService,
};

/// Configuration plus the service handles wrappers call into.
///
/// Cloning is cheap; all handles are shared.
#[derive(Clone)]
pub struct PlatformContext {
    config: Arc<ClientConfig>,
    pub datasets: Arc<dyn DatasetService>,
    pub operations: Arc<dyn OperationsService>,
    pub pipelines: Arc<dyn PipelineService>,
    pub tuning: Arc<dyn TuningService>,
    pub models: Arc<dyn ModelService>,
    pub tensorboards: Arc<dyn TensorboardService>,
}

impl PlatformContext {
    /// Builds a context where one backend serves every service.
    pub fn new<B>(config: ClientConfig, backend: Arc<B>) -> Self
    where
        B: DatasetService
            + OperationsService
            + PipelineService
            + TuningService
            + ModelService
            + TensorboardService
            + 'static,
    {
        Self {
            config: Arc::new(config),
            datasets: backend.clone(),
            operations: backend.clone(),
            pipelines: backend.clone(),
            tuning: backend.clone(),
            models: backend.clone(),
            tensorboards: backend,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a copy of this context with a different configuration.
    ///
    /// Used for per-call project/location overrides.
    #[must_use]
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self { config: Arc::new(config), ..self.clone() }
    }
}

impl std::fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContext")
            .field("project", &self.config.project)
            .field("location", &self.config.location)
            .finish_non_exhaustive()
    }
}
