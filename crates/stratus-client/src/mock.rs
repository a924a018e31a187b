//! In-memory platform for tests and offline demos.
//!
//! Every service trait is backed by maps guarded by one async mutex. Job
//! state progressions are scripted: each `get` of a pipeline or tuning job
//! advances it one step through its script, the last state sticking.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use stratus_abstraction::{
    CreateTensorboardRunRequest, CreateTensorboardTimeSeriesRequest, Dataset, DatasetService,
    ImportDataConfig, JobState, Model, ModelService, Operation, OperationsService,
    PipelineService, PipelineState, ServiceError, Status, Tensorboard, TensorboardRun,
    TensorboardService, TensorboardTimeSeries, TrainingPipeline, TunedModel, TuningJob,
    TuningService,
};
use tokio::sync::Mutex;
use tracing::debug;

/// Per-RPC call counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcCounts(HashMap<&'static str, usize>);

impl RpcCounts {
    #[must_use]
    pub fn get(&self, rpc: &str) -> usize {
        self.0.get(rpc).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

#[derive(Debug)]
struct PendingOperation {
    lookups_left: usize,
    response: Option<serde_json::Value>,
    error: Option<Status>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    calls: HashMap<&'static str, usize>,
    operation_lookups: usize,
    operations: HashMap<String, PendingOperation>,

    datasets: HashMap<String, Dataset>,
    imports: HashMap<String, Vec<ImportDataConfig>>,

    pipelines: HashMap<String, TrainingPipeline>,
    pipeline_scripts: HashMap<String, VecDeque<PipelineState>>,
    default_pipeline_script: Vec<PipelineState>,
    pipeline_failure: Option<Status>,
    pipeline_create_error: Option<ServiceError>,

    tuning_jobs: HashMap<String, TuningJob>,
    tuning_scripts: HashMap<String, VecDeque<JobState>>,
    default_tuning_script: Vec<JobState>,

    models: HashMap<String, Model>,

    tensorboards: HashMap<String, Tensorboard>,
    runs: HashMap<String, TensorboardRun>,
    time_series: HashMap<String, TensorboardTimeSeries>,
    rejected_tags: HashSet<String>,
}

impl State {
    fn record(&mut self, rpc: &'static str) {
        *self.calls.entry(rpc).or_insert(0) += 1;
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn start_operation(
        &mut self,
        parent: &str,
        response: Option<serde_json::Value>,
        error: Option<Status>,
    ) -> Operation {
        let name = format!("{}/operations/{}", location_of(parent), self.next_id());
        let lookups_left = self.operation_lookups;
        if lookups_left == 0 {
            return Operation { name, done: true, error, response, metadata: None };
        }
        self.operations.insert(name.clone(), PendingOperation { lookups_left, response, error });
        Operation { name, ..Operation::default() }
    }
}

/// `projects/{p}/locations/{l}` prefix of any resource name.
fn location_of(name: &str) -> String {
    name.split('/').take(4).collect::<Vec<_>>().join("/")
}

/// Extracts `x` from a `display_name = "x"` filter.
fn display_name_filter(filter: Option<&str>) -> Option<String> {
    let filter = filter?;
    let (_, value) = filter.split_once('=')?;
    Some(value.trim().trim_matches('"').to_string())
}

/// An in-memory implementation of every platform service.
#[derive(Debug)]
pub struct MockPlatform {
    state: Mutex<State>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Operations complete on their first lookup; jobs succeed on first fetch.
    #[must_use]
    pub fn new() -> Self {
        let state = State {
            operation_lookups: 1,
            default_pipeline_script: vec![PipelineState::Succeeded],
            default_tuning_script: vec![JobState::Succeeded],
            ..State::default()
        };
        Self { state: Mutex::new(state) }
    }

    /// Operations report done after `lookups` calls to `get_operation`
    /// (0 returns them already done).
    #[must_use]
    pub fn with_operation_lookups(mut self, lookups: usize) -> Self {
        self.state.get_mut().operation_lookups = lookups;
        self
    }

    /// States every newly created pipeline walks through.
    #[must_use]
    pub fn with_pipeline_script(mut self, states: Vec<PipelineState>) -> Self {
        self.state.get_mut().default_pipeline_script = states;
        self
    }

    /// States every newly created tuning job walks through.
    #[must_use]
    pub fn with_tuning_script(mut self, states: Vec<JobState>) -> Self {
        self.state.get_mut().default_tuning_script = states;
        self
    }

    /// Status attached to pipelines once they reach `PIPELINE_STATE_FAILED`.
    #[must_use]
    pub fn with_pipeline_failure(mut self, status: Status) -> Self {
        self.state.get_mut().pipeline_failure = Some(status);
        self
    }

    /// Makes the next `create_training_pipeline` call fail with `error`.
    pub async fn fail_next_pipeline_create(&self, error: ServiceError) {
        self.state.lock().await.pipeline_create_error = Some(error);
    }

    /// Seeds an existing pipeline with its own state script.
    pub async fn insert_training_pipeline(&self, pipeline: TrainingPipeline, script: Vec<PipelineState>) {
        let mut state = self.state.lock().await;
        state.pipeline_scripts.insert(pipeline.name.clone(), script.into());
        state.pipelines.insert(pipeline.name.clone(), pipeline);
    }

    /// Replaces the task metadata the service reports for an existing pipeline.
    pub async fn set_training_task_metadata(&self, name: &str, metadata: serde_json::Value) {
        if let Some(pipeline) = self.state.lock().await.pipelines.get_mut(name) {
            pipeline.training_task_metadata = metadata;
        }
    }

    pub async fn insert_model(&self, model: Model) {
        self.state.lock().await.models.insert(model.name.clone(), model);
    }

    pub async fn insert_tensorboard(&self, tensorboard: Tensorboard) {
        self.state.lock().await.tensorboards.insert(tensorboard.name.clone(), tensorboard);
    }

    pub async fn insert_tensorboard_run(&self, run: TensorboardRun) {
        self.state.lock().await.runs.insert(run.name.clone(), run);
    }

    /// Makes `create_tensorboard_time_series` reject `tag` as an invalid argument.
    pub async fn reject_time_series_tag(&self, tag: &str) {
        self.state.lock().await.rejected_tags.insert(tag.to_string());
    }

    pub async fn calls(&self) -> RpcCounts {
        RpcCounts(self.state.lock().await.calls.clone())
    }

    pub async fn dataset_count(&self) -> usize {
        self.state.lock().await.datasets.len()
    }

    pub async fn imports(&self, dataset: &str) -> Vec<ImportDataConfig> {
        self.state.lock().await.imports.get(dataset).cloned().unwrap_or_default()
    }

    pub async fn run_count(&self) -> usize {
        self.state.lock().await.runs.len()
    }

    pub async fn time_series_count(&self) -> usize {
        self.state.lock().await.time_series.len()
    }
}

#[async_trait]
impl OperationsService for MockPlatform {
    async fn get_operation(&self, name: &str) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_operation");
        let pending = state
            .operations
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("operation {name}")))?;

        pending.lookups_left = pending.lookups_left.saturating_sub(1);
        if pending.lookups_left > 0 {
            return Ok(Operation { name: name.to_string(), ..Operation::default() });
        }
        Ok(Operation {
            name: name.to_string(),
            done: true,
            error: pending.error.clone(),
            response: pending.response.clone(),
            metadata: None,
        })
    }
}

#[async_trait]
impl DatasetService for MockPlatform {
    async fn create_dataset(&self, parent: &str, dataset: &Dataset) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("create_dataset");
        if dataset.display_name.is_empty() {
            return Err(ServiceError::InvalidArgument("display_name is required".to_string()));
        }
        let id = state.next_id();
        let created = Dataset { name: format!("{parent}/datasets/{id}"), ..dataset.clone() };
        debug!(dataset = %created.name, "MockPlatform created dataset");
        state.datasets.insert(created.name.clone(), created.clone());
        let response = serde_json::to_value(&created)
            .map_err(|e| ServiceError::Serialization(e.to_string()))?;
        Ok(state.start_operation(parent, Some(response), None))
    }

    async fn get_dataset(&self, name: &str) -> Result<Dataset, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_dataset");
        state.datasets.get(name).cloned().ok_or_else(|| ServiceError::NotFound(format!("dataset {name}")))
    }

    async fn list_datasets(&self, parent: &str, filter: Option<&str>) -> Result<Vec<Dataset>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("list_datasets");
        let wanted = display_name_filter(filter);
        let mut datasets: Vec<_> = state
            .datasets
            .values()
            .filter(|d| d.name.starts_with(parent))
            .filter(|d| wanted.as_ref().is_none_or(|w| &d.display_name == w))
            .cloned()
            .collect();
        datasets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(datasets)
    }

    async fn import_data(
        &self,
        name: &str,
        import_configs: &[ImportDataConfig],
    ) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("import_data");
        if !state.datasets.contains_key(name) {
            return Err(ServiceError::NotFound(format!("dataset {name}")));
        }
        state.imports.entry(name.to_string()).or_default().extend_from_slice(import_configs);
        Ok(state.start_operation(name, Some(serde_json::json!({})), None))
    }

    async fn delete_dataset(&self, name: &str) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("delete_dataset");
        state.datasets.remove(name).ok_or_else(|| ServiceError::NotFound(format!("dataset {name}")))?;
        state.imports.remove(name);
        Ok(state.start_operation(name, None, None))
    }
}

#[async_trait]
impl PipelineService for MockPlatform {
    async fn create_training_pipeline(
        &self,
        parent: &str,
        pipeline: &TrainingPipeline,
    ) -> Result<TrainingPipeline, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("create_training_pipeline");
        if let Some(error) = state.pipeline_create_error.take() {
            return Err(error);
        }
        let id = state.next_id();
        let created = TrainingPipeline {
            name: format!("{parent}/trainingPipelines/{id}"),
            state: PipelineState::Pending,
            ..pipeline.clone()
        };
        let script = state.default_pipeline_script.clone().into();
        state.pipeline_scripts.insert(created.name.clone(), script);
        state.pipelines.insert(created.name.clone(), created.clone());
        Ok(created)
    }

    async fn get_training_pipeline(&self, name: &str) -> Result<TrainingPipeline, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_training_pipeline");
        if !state.pipelines.contains_key(name) {
            return Err(ServiceError::NotFound(format!("training pipeline {name}")));
        }

        let next = state.pipeline_scripts.get_mut(name).and_then(|script| {
            if script.len() > 1 { script.pop_front() } else { script.front().copied() }
        });
        let failure = state.pipeline_failure.clone();
        let model_id = state.next_id();
        let pipeline = state
            .pipelines
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("training pipeline {name}")))?;

        if let Some(next) = next {
            if pipeline.state != PipelineState::Cancelled {
                pipeline.state = next;
            }
        }
        if pipeline.state == PipelineState::Failed && pipeline.error.is_none() {
            pipeline.error = failure;
        }
        if pipeline.state == PipelineState::Succeeded {
            if let Some(model) = pipeline.model_to_upload.as_mut().filter(|m| m.name.is_empty()) {
                model.name = format!("{}/models/{model_id}", location_of(name));
            }
        }
        Ok(pipeline.clone())
    }

    async fn list_training_pipelines(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TrainingPipeline>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("list_training_pipelines");
        let wanted = display_name_filter(filter);
        let mut pipelines: Vec<_> = state
            .pipelines
            .values()
            .filter(|p| p.name.starts_with(parent))
            .filter(|p| wanted.as_ref().is_none_or(|w| &p.display_name == w))
            .cloned()
            .collect();
        pipelines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pipelines)
    }

    async fn cancel_training_pipeline(&self, name: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        state.record("cancel_training_pipeline");
        let pipeline = state
            .pipelines
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("training pipeline {name}")))?;
        if pipeline.state.is_complete() {
            return Err(ServiceError::FailedPrecondition(format!(
                "training pipeline {name} is already in state {}",
                pipeline.state
            )));
        }
        pipeline.state = PipelineState::Cancelled;
        Ok(())
    }

    async fn delete_training_pipeline(&self, name: &str) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("delete_training_pipeline");
        state
            .pipelines
            .remove(name)
            .ok_or_else(|| ServiceError::NotFound(format!("training pipeline {name}")))?;
        state.pipeline_scripts.remove(name);
        Ok(state.start_operation(name, None, None))
    }
}

#[async_trait]
impl TuningService for MockPlatform {
    async fn create_tuning_job(&self, parent: &str, job: &TuningJob) -> Result<TuningJob, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("create_tuning_job");
        let id = state.next_id();
        let created = TuningJob {
            name: format!("{parent}/tuningJobs/{id}"),
            state: JobState::Pending,
            ..job.clone()
        };
        let script = state.default_tuning_script.clone().into();
        state.tuning_scripts.insert(created.name.clone(), script);
        state.tuning_jobs.insert(created.name.clone(), created.clone());
        Ok(created)
    }

    async fn get_tuning_job(&self, name: &str) -> Result<TuningJob, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_tuning_job");
        let next = state.tuning_scripts.get_mut(name).and_then(|script| {
            if script.len() > 1 { script.pop_front() } else { script.front().copied() }
        });
        let model_id = state.next_id();
        let job = state
            .tuning_jobs
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("tuning job {name}")))?;

        if let Some(next) = next {
            if job.state != JobState::Cancelled {
                job.state = next;
            }
        }
        if job.state == JobState::Succeeded && job.tuned_model.is_none() {
            let location = location_of(name);
            job.tuned_model = Some(TunedModel {
                model: format!("{location}/models/{model_id}"),
                endpoint: format!("{location}/endpoints/{model_id}"),
            });
        }
        Ok(job.clone())
    }

    async fn list_tuning_jobs(&self, parent: &str, _filter: Option<&str>) -> Result<Vec<TuningJob>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("list_tuning_jobs");
        let mut jobs: Vec<_> =
            state.tuning_jobs.values().filter(|j| j.name.starts_with(parent)).cloned().collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(jobs)
    }

    async fn cancel_tuning_job(&self, name: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        state.record("cancel_tuning_job");
        let job = state
            .tuning_jobs
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("tuning job {name}")))?;
        if job.state.is_complete() {
            return Err(ServiceError::FailedPrecondition(format!(
                "tuning job {name} is already in state {}",
                job.state
            )));
        }
        job.state = JobState::Cancelled;
        Ok(())
    }
}

#[async_trait]
impl ModelService for MockPlatform {
    async fn get_model(&self, name: &str) -> Result<Model, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_model");
        state.models.get(name).cloned().ok_or_else(|| ServiceError::NotFound(format!("model {name}")))
    }

    async fn delete_model(&self, name: &str) -> Result<Operation, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("delete_model");
        state.models.remove(name).ok_or_else(|| ServiceError::NotFound(format!("model {name}")))?;
        Ok(state.start_operation(name, None, None))
    }
}

fn create_run(
    state: &mut State,
    parent: &str,
    run: &TensorboardRun,
    run_id: &str,
) -> Result<TensorboardRun, ServiceError> {
    let name = format!("{parent}/runs/{run_id}");
    if state.runs.contains_key(&name) {
        return Err(ServiceError::AlreadyExists(format!("tensorboard run {name}")));
    }
    let created = TensorboardRun { name: name.clone(), ..run.clone() };
    state.runs.insert(name, created.clone());
    Ok(created)
}

fn create_time_series(
    state: &mut State,
    parent: &str,
    time_series: &TensorboardTimeSeries,
) -> Result<TensorboardTimeSeries, ServiceError> {
    if !state.runs.contains_key(parent) {
        return Err(ServiceError::NotFound(format!("tensorboard run {parent}")));
    }
    if state.rejected_tags.contains(&time_series.display_name) {
        return Err(ServiceError::InvalidArgument(format!(
            "time series {} cannot be created",
            time_series.display_name
        )));
    }
    let id = state.next_id();
    let created = TensorboardTimeSeries { name: format!("{parent}/timeSeries/{id}"), ..time_series.clone() };
    state.time_series.insert(created.name.clone(), created.clone());
    Ok(created)
}

#[async_trait]
impl TensorboardService for MockPlatform {
    async fn get_tensorboard(&self, name: &str) -> Result<Tensorboard, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_tensorboard");
        state.tensorboards.get(name).cloned().ok_or_else(|| ServiceError::NotFound(format!("tensorboard {name}")))
    }

    async fn get_tensorboard_run(&self, name: &str) -> Result<TensorboardRun, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_tensorboard_run");
        state.runs.get(name).cloned().ok_or_else(|| ServiceError::NotFound(format!("tensorboard run {name}")))
    }

    async fn create_tensorboard_run(
        &self,
        parent: &str,
        run: &TensorboardRun,
        run_id: &str,
    ) -> Result<TensorboardRun, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("create_tensorboard_run");
        create_run(&mut state, parent, run, run_id)
    }

    async fn batch_create_tensorboard_runs(
        &self,
        parent: &str,
        requests: &[CreateTensorboardRunRequest],
    ) -> Result<Vec<TensorboardRun>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("batch_create_tensorboard_runs");
        requests
            .iter()
            .map(|r| {
                if r.parent != parent {
                    return Err(ServiceError::InvalidArgument(format!(
                        "request parent {} does not match {parent}",
                        r.parent
                    )));
                }
                create_run(&mut state, &r.parent, &r.tensorboard_run, &r.tensorboard_run_id)
            })
            .collect()
    }

    async fn get_tensorboard_time_series(&self, name: &str) -> Result<TensorboardTimeSeries, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("get_tensorboard_time_series");
        state
            .time_series
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("tensorboard time series {name}")))
    }

    async fn list_tensorboard_time_series(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("list_tensorboard_time_series");
        let prefix = format!("{parent}/timeSeries/");
        let wanted = display_name_filter(filter);
        Ok(state
            .time_series
            .values()
            .filter(|ts| ts.name.starts_with(&prefix))
            .filter(|ts| wanted.as_ref().is_none_or(|w| &ts.display_name == w))
            .cloned()
            .collect())
    }

    async fn create_tensorboard_time_series(
        &self,
        parent: &str,
        time_series: &TensorboardTimeSeries,
    ) -> Result<TensorboardTimeSeries, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("create_tensorboard_time_series");
        create_time_series(&mut state, parent, time_series)
    }

    async fn batch_create_tensorboard_time_series(
        &self,
        parent: &str,
        requests: &[CreateTensorboardTimeSeriesRequest],
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError> {
        let mut state = self.state.lock().await;
        state.record("batch_create_tensorboard_time_series");
        requests
            .iter()
            .map(|r| {
                if !r.parent.starts_with(parent) {
                    return Err(ServiceError::InvalidArgument(format!(
                        "run {} is not under {parent}",
                        r.parent
                    )));
                }
                create_time_series(&mut state, &r.parent, &r.tensorboard_time_series)
            })
            .collect()
    }
}
