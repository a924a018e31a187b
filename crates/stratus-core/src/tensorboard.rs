//! Tensorboard experiment resources and their name caches.
//!
//! Uploads address runs and time series by display name while the service
//! addresses them by resource name. The managers here resolve each name at
//! most once, creating the resource when it does not exist yet.

use crate::context::PlatformContext;
use crate::error::{SdkError, SdkResult};
use crate::resource_name::ResourceName;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stratus_abstraction::{
    CreateTensorboardRunRequest, CreateTensorboardTimeSeriesRequest, ServiceError,
    TensorboardRun, TensorboardService, TensorboardTimeSeries,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const CREATE_RUN_BATCH_SIZE: usize = 1000;
pub const CREATE_TIME_SERIES_BATCH_SIZE: usize = 1000;

const MAX_RUN_ID_LEN: usize = 128;

/// Run id derived from a display name: lowercase, `[a-z0-9-]` only.
#[must_use]
pub fn run_id(run_name: &str) -> String {
    let id: String = run_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' { c } else { '-' })
        .take(MAX_RUN_ID_LEN)
        .collect();
    id.trim_matches('-').to_string()
}

/// Splits a tensorboard's `blob_storage_path_prefix` into `(bucket, folder)`.
///
/// The folder keeps a trailing `/` and is empty when the prefix is a bare
/// bucket.
pub async fn blob_storage_location(
    ctx: &PlatformContext,
    tensorboard_name: &str,
) -> SdkResult<(String, String)> {
    let tensorboard = ctx.tensorboards.get_tensorboard(tensorboard_name).await.map_err(|e| match e {
        ServiceError::NotFound(msg) => {
            ServiceError::NotFound(format!("Tensorboard {tensorboard_name} not found: {msg}"))
        }
        other => other,
    })?;

    let prefix = tensorboard.blob_storage_path_prefix.trim_start_matches("gs://");
    if prefix.is_empty() {
        return Err(SdkError::Precondition(format!(
            "Tensorboard {tensorboard_name} has no blob storage location; it is obsolete, create a new one"
        )));
    }

    let path = format!("{prefix}/");
    let (bucket, folder) = path.split_once('/').unwrap_or((path.as_str(), ""));
    Ok((bucket.to_string(), folder.to_string()))
}

async fn find_or_create_time_series<F>(
    service: &dyn TensorboardService,
    run_resource_name: &str,
    tag: &str,
    creator: F,
) -> SdkResult<TensorboardTimeSeries>
where
    F: FnOnce() -> TensorboardTimeSeries + Send,
{
    let filter = format!("display_name = \"{tag}\"");
    let mut existing: Vec<_> = service
        .list_tensorboard_time_series(run_resource_name, Some(&filter))
        .await?
        .into_iter()
        .filter(|ts| ts.display_name == tag)
        .collect();

    match existing.len() {
        0 => {}
        1 => return Ok(existing.remove(0)),
        n => {
            return Err(SdkError::Precondition(format!(
                "found {n} time series with display name {tag} under {run_resource_name}"
            )))
        }
    }

    let mut template = creator();
    template.display_name = tag.to_string();
    debug!(run = %run_resource_name, tag = %tag, "Creating TensorboardTimeSeries");
    service
        .create_tensorboard_time_series(run_resource_name, &template)
        .await
        .map_err(|e| match e {
            ServiceError::InvalidArgument(_) => {
                SdkError::TimeSeriesNotFound { display_name: tag.to_string(), source: e }
            }
            other => other.into(),
        })
}

/// Resolves run and time series resource names under one experiment.
pub struct ExperimentResourceManager {
    experiment: String,
    service: Arc<dyn TensorboardService>,
    run_batch_size: usize,
    time_series_batch_size: usize,
    runs: Mutex<HashMap<String, String>>,
    time_series: Mutex<HashMap<(String, String), String>>,
}

impl std::fmt::Debug for ExperimentResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentResourceManager")
            .field("experiment", &self.experiment)
            .field("run_batch_size", &self.run_batch_size)
            .field("time_series_batch_size", &self.time_series_batch_size)
            .finish_non_exhaustive()
    }
}

impl ExperimentResourceManager {
    /// `experiment` must be `projects/*/locations/*/tensorboards/*/experiments/*`.
    pub fn new(experiment: &str, service: Arc<dyn TensorboardService>) -> SdkResult<Self> {
        let parsed = ResourceName::parse(experiment)?;
        if parsed.collection() != Some("experiments") || parsed.segment("tensorboards").is_none() {
            return Err(SdkError::InvalidResourceName {
                name: experiment.to_string(),
                reason: "expected a tensorboard experiment".to_string(),
            });
        }
        Ok(Self {
            experiment: experiment.to_string(),
            service,
            run_batch_size: CREATE_RUN_BATCH_SIZE,
            time_series_batch_size: CREATE_TIME_SERIES_BATCH_SIZE,
            runs: Mutex::new(HashMap::new()),
            time_series: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn with_batch_sizes(mut self, runs: usize, time_series: usize) -> Self {
        self.run_batch_size = runs.max(1);
        self.time_series_batch_size = time_series.max(1);
        self
    }

    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    fn run_resource_name(&self, run_name: &str) -> SdkResult<(String, String)> {
        let id = run_id(run_name);
        if id.is_empty() {
            return Err(SdkError::Precondition(format!("run name '{run_name}' has no usable characters")));
        }
        let name = format!("{}/runs/{id}", self.experiment);
        Ok((id, name))
    }

    /// Resource name of `run_name`, creating the run if needed.
    pub async fn get_run_resource_name(&self, run_name: &str) -> SdkResult<String> {
        let mut runs = self.runs.lock().await;
        if let Some(name) = runs.get(run_name) {
            return Ok(name.clone());
        }

        let (id, name) = self.run_resource_name(run_name)?;
        let resolved = match self.service.get_tensorboard_run(&name).await {
            Ok(run) if !run.name.is_empty() => run.name,
            Ok(_) => name,
            Err(e) if e.is_not_found() => {
                info!(experiment = %self.experiment, run = %run_name, "Creating TensorboardRun");
                let run = TensorboardRun { display_name: run_name.to_string(), ..TensorboardRun::default() };
                let created = self.service.create_tensorboard_run(&self.experiment, &run, &id).await?;
                if created.name.is_empty() { name } else { created.name }
            }
            Err(e) => return Err(e.into()),
        };

        runs.insert(run_name.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Resource name of the time series for `(run_name, tag)`.
    ///
    /// Looks the series up by display name first; otherwise creates one from
    /// `creator` with its display name set to `tag`.
    pub async fn get_time_series_resource_name<F>(
        &self,
        run_name: &str,
        tag: &str,
        creator: F,
    ) -> SdkResult<String>
    where
        F: FnOnce() -> TensorboardTimeSeries + Send,
    {
        let key = (run_name.to_string(), tag.to_string());
        if let Some(name) = self.time_series.lock().await.get(&key) {
            return Ok(name.clone());
        }

        let run_resource_name = self.get_run_resource_name(run_name).await?;

        let mut cache = self.time_series.lock().await;
        if let Some(name) = cache.get(&key) {
            return Ok(name.clone());
        }
        let time_series =
            find_or_create_time_series(self.service.as_ref(), &run_resource_name, tag, creator).await?;
        cache.insert(key, time_series.name.clone());
        Ok(time_series.name)
    }

    /// Creates every uncached run, `run_batch_size` per call.
    ///
    /// Runs that already exist remotely are looked up by their derived id and
    /// reused. Returns one entry per distinct input name.
    pub async fn batch_create_runs(&self, run_names: &[String]) -> SdkResult<HashMap<String, String>> {
        let mut runs = self.runs.lock().await;

        let mut seen = HashSet::new();
        let uncached: Vec<&String> = run_names
            .iter()
            .filter(|name| seen.insert(name.as_str()) && !runs.contains_key(name.as_str()))
            .collect();

        let mut pending = Vec::with_capacity(uncached.len());
        for name in uncached {
            let (_, resource) = self.run_resource_name(name)?;
            match self.service.get_tensorboard_run(&resource).await {
                Ok(run) => {
                    let resolved = if run.name.is_empty() { resource } else { run.name };
                    runs.insert(name.clone(), resolved);
                }
                Err(e) if e.is_not_found() => pending.push(name),
                Err(e) => return Err(e.into()),
            }
        }

        for chunk in pending.chunks(self.run_batch_size) {
            let requests = chunk
                .iter()
                .map(|name| -> SdkResult<CreateTensorboardRunRequest> {
                    let (id, _) = self.run_resource_name(name)?;
                    Ok(CreateTensorboardRunRequest {
                        parent: self.experiment.clone(),
                        tensorboard_run: TensorboardRun {
                            display_name: (*name).clone(),
                            ..TensorboardRun::default()
                        },
                        tensorboard_run_id: id,
                    })
                })
                .collect::<SdkResult<Vec<_>>>()?;

            debug!(experiment = %self.experiment, count = requests.len(), "Batch creating TensorboardRuns");
            let created = self.service.batch_create_tensorboard_runs(&self.experiment, &requests).await?;
            let by_display_name: HashMap<_, _> =
                created.into_iter().map(|run| (run.display_name, run.name)).collect();

            for name in chunk {
                let resource = by_display_name.get(name.as_str()).ok_or_else(|| {
                    ServiceError::Internal(format!("batch create returned no run for {name}"))
                })?;
                runs.insert((*name).clone(), resource.clone());
            }
        }

        Ok(seen
            .into_iter()
            .filter_map(|name| runs.get(name).map(|resource| (name.to_string(), resource.clone())))
            .collect())
    }

    /// Creates time series for already resolved runs,
    /// `time_series_batch_size` per call.
    ///
    /// Keys already cached are skipped. Each series is created with its tag as
    /// display name. Returns the created series.
    pub async fn batch_create_time_series(
        &self,
        entries: HashMap<(String, String), TensorboardTimeSeries>,
    ) -> SdkResult<Vec<TensorboardTimeSeries>> {
        let run_names = self.runs.lock().await.clone();
        let run_by_resource: HashMap<&str, &str> =
            run_names.iter().map(|(run, resource)| (resource.as_str(), run.as_str())).collect();

        let mut cache = self.time_series.lock().await;
        let mut pending: Vec<_> = entries.into_iter().filter(|(key, _)| !cache.contains_key(key)).collect();
        pending.sort_by(|a, b| a.0.cmp(&b.0));

        let mut requests = Vec::with_capacity(pending.len());
        for ((run, tag), mut time_series) in pending {
            let parent = run_names.get(&run).ok_or_else(|| {
                SdkError::Precondition(format!("run {run} must be created before its time series"))
            })?;
            time_series.display_name = tag;
            requests.push(CreateTensorboardTimeSeriesRequest {
                parent: parent.clone(),
                tensorboard_time_series: time_series,
            });
        }

        let mut created_all = Vec::with_capacity(requests.len());
        for chunk in requests.chunks(self.time_series_batch_size) {
            debug!(experiment = %self.experiment, count = chunk.len(), "Batch creating TensorboardTimeSeries");
            let created = self.service.batch_create_tensorboard_time_series(&self.experiment, chunk).await?;
            for ts in &created {
                let Some(run_resource) = ts.name.find("/timeSeries").map(|idx| &ts.name[..idx]) else {
                    warn!(name = %ts.name, "Unexpected time series name in batch response");
                    continue;
                };
                if let Some(run) = run_by_resource.get(run_resource) {
                    cache.insert(((*run).to_string(), ts.display_name.clone()), ts.name.clone());
                }
            }
            created_all.extend(created);
        }

        Ok(created_all)
    }
}

/// Tag to time series cache for a single run.
pub struct RunTimeSeriesManager {
    run: String,
    service: Arc<dyn TensorboardService>,
    by_tag: Mutex<HashMap<String, TensorboardTimeSeries>>,
}

impl std::fmt::Debug for RunTimeSeriesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunTimeSeriesManager").field("run", &self.run).finish_non_exhaustive()
    }
}

impl RunTimeSeriesManager {
    #[must_use]
    pub fn new(run_resource_name: impl Into<String>, service: Arc<dyn TensorboardService>) -> Self {
        Self { run: run_resource_name.into(), service, by_tag: Mutex::new(HashMap::new()) }
    }

    pub async fn get_or_create<F>(&self, tag: &str, creator: F) -> SdkResult<TensorboardTimeSeries>
    where
        F: FnOnce() -> TensorboardTimeSeries + Send,
    {
        let mut by_tag = self.by_tag.lock().await;
        if let Some(ts) = by_tag.get(tag) {
            return Ok(ts.clone());
        }
        let time_series = find_or_create_time_series(self.service.as_ref(), &self.run, tag, creator).await?;
        by_tag.insert(tag.to_string(), time_series.clone());
        Ok(time_series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_is_sanitized() {
        assert_eq!(run_id("Train/Loss_v2"), "train-loss-v2");
        assert_eq!(run_id("--eval--"), "eval");
        assert_eq!(run_id(&"a".repeat(300)).len(), MAX_RUN_ID_LEN);
    }
}
