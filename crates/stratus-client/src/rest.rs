//! REST transport for the platform services.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stratus_abstraction::{
    CreateTensorboardRunRequest, CreateTensorboardTimeSeriesRequest, Dataset, DatasetService,
    ImportDataConfig, Model, ModelService, Operation, OperationsService, PipelineService,
    ServiceError, Tensorboard, TensorboardRun, TensorboardService, TensorboardTimeSeries,
    TrainingPipeline, TuningJob, TuningService,
};
use tracing::{debug, error};

const PAGE_SIZE: &str = "100";

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportDataRequest<'a> {
    import_configs: &'a [ImportDataConfig],
}

#[derive(Serialize)]
struct BatchCreateRequest<'a, T> {
    requests: &'a [T],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateRunsResponse {
    #[serde(default)]
    tensorboard_runs: Vec<TensorboardRun>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateTimeSeriesResponse {
    #[serde(default)]
    tensorboard_time_series: Vec<TensorboardTimeSeries>,
}

/// Client for `https://{endpoint}/{version}/...`.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl RestClient {
    /// Creates a client rooted at `base_url` (scheme, host and API version).
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ServiceError::Transport(format!("Failed to create HTTP client: {e}"))
        })?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), access_token, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ServiceError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Calling platform API");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to send request");
            if e.is_timeout() {
                ServiceError::DeadlineExceeded(format!("{url}: {e}"))
            } else {
                ServiceError::Transport(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let err = map_http_error(status, &text);
            debug!(status = %status, error = %err, url = %url, "Platform API returned error status");
            return Err(err);
        }

        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ServiceError::Serialization(format!("Failed to parse response from {url}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        self.send::<(), T>(Method::GET, path, &[], None).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Operation, ServiceError> {
        self.send::<(), Operation>(Method::DELETE, path, &[], None).await
    }

    /// Follows `nextPageToken` until the listing is exhausted.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        filter: Option<&str>,
    ) -> Result<Vec<T>, ServiceError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE)];
            if let Some(filter) = filter {
                query.push(("filter", filter));
            }
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let mut page: serde_json::Value =
                self.send::<(), _>(Method::GET, path, &query, None).await?;
            if let Some(values) = page.get_mut(key).map(serde_json::Value::take) {
                let batch: Vec<T> = serde_json::from_value(values)
                    .map_err(|e| ServiceError::Serialization(format!("Failed to parse {key}: {e}")))?;
                items.extend(batch);
            }

            match page.get("nextPageToken").and_then(serde_json::Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(items)
    }
}

/// Maps an error response to a [`ServiceError`].
///
/// The canonical `status` in the body wins; the HTTP status is the fallback.
pub fn map_http_error(status: StatusCode, body: &str) -> ServiceError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.error.status.is_empty() {
            return ServiceError::from_status(&parsed.error.status, parsed.error.message);
        }
        return from_http_status(status, parsed.error.message);
    }
    from_http_status(status, format!("{status}: {body}"))
}

fn from_http_status(status: StatusCode, message: String) -> ServiceError {
    match status {
        StatusCode::BAD_REQUEST => ServiceError::InvalidArgument(message),
        StatusCode::UNAUTHORIZED => ServiceError::Unauthenticated(message),
        StatusCode::FORBIDDEN => ServiceError::PermissionDenied(message),
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::CONFLICT => ServiceError::AlreadyExists(message),
        StatusCode::PRECONDITION_FAILED => ServiceError::FailedPrecondition(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::ResourceExhausted(message),
        StatusCode::SERVICE_UNAVAILABLE => ServiceError::Unavailable(message),
        StatusCode::GATEWAY_TIMEOUT => ServiceError::DeadlineExceeded(message),
        _ => ServiceError::Internal(message),
    }
}

#[async_trait]
impl DatasetService for RestClient {
    async fn create_dataset(&self, parent: &str, dataset: &Dataset) -> Result<Operation, ServiceError> {
        self.post(&format!("{parent}/datasets"), dataset).await
    }

    async fn get_dataset(&self, name: &str) -> Result<Dataset, ServiceError> {
        self.get(name).await
    }

    async fn list_datasets(&self, parent: &str, filter: Option<&str>) -> Result<Vec<Dataset>, ServiceError> {
        self.list_all(&format!("{parent}/datasets"), "datasets", filter).await
    }

    async fn import_data(
        &self,
        name: &str,
        import_configs: &[ImportDataConfig],
    ) -> Result<Operation, ServiceError> {
        self.post(&format!("{name}:import"), &ImportDataRequest { import_configs }).await
    }

    async fn delete_dataset(&self, name: &str) -> Result<Operation, ServiceError> {
        self.delete(name).await
    }
}

#[async_trait]
impl OperationsService for RestClient {
    async fn get_operation(&self, name: &str) -> Result<Operation, ServiceError> {
        self.get(name).await
    }
}

#[async_trait]
impl PipelineService for RestClient {
    async fn create_training_pipeline(
        &self,
        parent: &str,
        pipeline: &TrainingPipeline,
    ) -> Result<TrainingPipeline, ServiceError> {
        self.post(&format!("{parent}/trainingPipelines"), pipeline).await
    }

    async fn get_training_pipeline(&self, name: &str) -> Result<TrainingPipeline, ServiceError> {
        self.get(name).await
    }

    async fn list_training_pipelines(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TrainingPipeline>, ServiceError> {
        self.list_all(&format!("{parent}/trainingPipelines"), "trainingPipelines", filter).await
    }

    async fn cancel_training_pipeline(&self, name: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self.post(&format!("{name}:cancel"), &serde_json::json!({})).await?;
        Ok(())
    }

    async fn delete_training_pipeline(&self, name: &str) -> Result<Operation, ServiceError> {
        self.delete(name).await
    }
}

#[async_trait]
impl TuningService for RestClient {
    async fn create_tuning_job(&self, parent: &str, job: &TuningJob) -> Result<TuningJob, ServiceError> {
        self.post(&format!("{parent}/tuningJobs"), job).await
    }

    async fn get_tuning_job(&self, name: &str) -> Result<TuningJob, ServiceError> {
        self.get(name).await
    }

    async fn list_tuning_jobs(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TuningJob>, ServiceError> {
        self.list_all(&format!("{parent}/tuningJobs"), "tuningJobs", filter).await
    }

    async fn cancel_tuning_job(&self, name: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self.post(&format!("{name}:cancel"), &serde_json::json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl ModelService for RestClient {
    async fn get_model(&self, name: &str) -> Result<Model, ServiceError> {
        self.get(name).await
    }

    async fn delete_model(&self, name: &str) -> Result<Operation, ServiceError> {
        self.delete(name).await
    }
}

#[async_trait]
impl TensorboardService for RestClient {
    async fn get_tensorboard(&self, name: &str) -> Result<Tensorboard, ServiceError> {
        self.get(name).await
    }

    async fn get_tensorboard_run(&self, name: &str) -> Result<TensorboardRun, ServiceError> {
        self.get(name).await
    }

    async fn create_tensorboard_run(
        &self,
        parent: &str,
        run: &TensorboardRun,
        run_id: &str,
    ) -> Result<TensorboardRun, ServiceError> {
        self.send(Method::POST, &format!("{parent}/runs"), &[("tensorboardRunId", run_id)], Some(run))
            .await
    }

    async fn batch_create_tensorboard_runs(
        &self,
        parent: &str,
        requests: &[CreateTensorboardRunRequest],
    ) -> Result<Vec<TensorboardRun>, ServiceError> {
        let response: BatchCreateRunsResponse =
            self.post(&format!("{parent}/runs:batchCreate"), &BatchCreateRequest { requests }).await?;
        Ok(response.tensorboard_runs)
    }

    async fn get_tensorboard_time_series(&self, name: &str) -> Result<TensorboardTimeSeries, ServiceError> {
        self.get(name).await
    }

    async fn list_tensorboard_time_series(
        &self,
        parent: &str,
        filter: Option<&str>,
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError> {
        self.list_all(&format!("{parent}/timeSeries"), "tensorboardTimeSeries", filter).await
    }

    async fn create_tensorboard_time_series(
        &self,
        parent: &str,
        time_series: &TensorboardTimeSeries,
    ) -> Result<TensorboardTimeSeries, ServiceError> {
        self.post(&format!("{parent}/timeSeries"), time_series).await
    }

    async fn batch_create_tensorboard_time_series(
        &self,
        parent: &str,
        requests: &[CreateTensorboardTimeSeriesRequest],
    ) -> Result<Vec<TensorboardTimeSeries>, ServiceError> {
        let response: BatchCreateTimeSeriesResponse =
            self.post(&format!("{parent}:batchCreate"), &BatchCreateRequest { requests }).await?;
        Ok(response.tensorboard_time_series)
    }
}
