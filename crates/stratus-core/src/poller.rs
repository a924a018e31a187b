//! Terminal-state polling.
//!
//! [`wait_for_job_state`] calls a getter at a fixed interval until the
//! resource's rendered state contains one of the target strings, or the
//! timeout elapses. The interval never grows; progress logging with backoff
//! lives in [`crate::wait`].

use crate::error::{SdkError, SdkResult};
use std::future::Future;
use std::time::Duration;
use stratus_abstraction::{Operation, ServiceError, TrainingPipeline, TuningJob};
use tracing::debug;

/// A remote resource that exposes a state field.
pub trait StatefulResource {
    /// The state rendered as a string; matching is by substring.
    fn state_label(&self) -> String;
}

impl StatefulResource for TrainingPipeline {
    fn state_label(&self) -> String {
        self.state.to_string()
    }
}

impl StatefulResource for TuningJob {
    fn state_label(&self) -> String {
        self.state.to_string()
    }
}

impl StatefulResource for Operation {
    fn state_label(&self) -> String {
        match (self.done, &self.error) {
            (false, _) => "OPERATION_RUNNING".to_string(),
            (true, Some(status)) if !status.is_ok() => "OPERATION_FAILED".to_string(),
            (true, _) => "OPERATION_DONE".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Any of these contained in the state label ends the wait.
    pub expected_states: Vec<String>,
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            expected_states: vec!["CANCELLED".to_string()],
            timeout: Duration::from_secs(90),
            interval: Duration::from_millis(1500),
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn expecting(states: &[&str]) -> Self {
        Self { expected_states: states.iter().map(|s| (*s).to_string()).collect(), ..Self::default() }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Number of getter calls before giving up; always at least one.
    fn attempts(&self) -> u64 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_secs_f64() / self.interval.as_secs_f64();
        (attempts as u64).max(1)
    }

    fn matches(&self, label: &str) -> bool {
        self.expected_states.iter().any(|expected| label.contains(expected.as_str()))
    }
}

/// Polls `getter(name)` until the returned resource reaches an expected state.
///
/// Returns the matching resource. Getter errors are returned as-is; nothing
/// is retried.
///
/// # Errors
/// [`SdkError::Timeout`] carrying the last observed state when no attempt
/// matched, or [`SdkError::Service`] if a getter call failed.
pub async fn wait_for_job_state<T, F, Fut>(
    mut getter: F,
    name: &str,
    config: &PollConfig,
) -> SdkResult<T>
where
    T: StatefulResource,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let attempts = config.attempts();
    let mut last_state = String::from("<never observed>");

    for attempt in 0..attempts {
        let resource = getter(name.to_string()).await?;
        let label = resource.state_label();
        if config.matches(&label) {
            debug!(name = %name, state = %label, attempt, "Reached expected state");
            return Ok(resource);
        }
        debug!(name = %name, state = %label, attempt, "Waiting for expected state");
        last_state = label;
        if attempt + 1 < attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(SdkError::Timeout {
        expected: config.expected_states.join("|"),
        timeout: config.timeout,
        last_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FakeJob(&'static str);

    impl StatefulResource for FakeJob {
        fn state_label(&self) -> String {
            self.0.to_string()
        }
    }

    fn scripted(
        states: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut(String) -> std::future::Ready<Result<FakeJob, ServiceError>> {
        move |_name| {
            let idx = calls.fetch_add(1, Ordering::SeqCst);
            let state = states.get(idx).or(states.last()).copied().unwrap_or("");
            std::future::ready(Ok(FakeJob(state)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_once_state_contains_expected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = scripted(
            vec!["JobState.JOB_STATE_RUNNING", "JobState.JOB_STATE_CANCELLING", "JobState.JOB_STATE_CANCELLED"],
            calls.clone(),
        );
        let config = PollConfig::default();
        let start = tokio::time::Instant::now();

        let job = wait_for_job_state(getter, "projects/p/locations/l/jobs/1", &config).await.unwrap();

        assert_eq!(job.0, "JobState.JOB_STATE_CANCELLED");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < config.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = scripted(vec!["JOB_STATE_RUNNING"], calls.clone());
        let config = PollConfig::default().with_timeout(Duration::from_secs(9));

        let err = wait_for_job_state(getter, "projects/p/locations/l/jobs/1", &config)
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        let msg = err.to_string();
        assert!(msg.contains("Last recorded state: JOB_STATE_RUNNING"), "{msg}");
        assert!(matches!(err, SdkError::Timeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_of_several_expected_states() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = scripted(vec!["JOB_STATE_QUEUED", "JOB_STATE_FAILED"], calls);
        let config = PollConfig::expecting(&["SUCCEEDED", "FAILED"]);

        let job = wait_for_job_state(getter, "n", &config).await.unwrap();
        assert_eq!(job.0, "JOB_STATE_FAILED");
    }

    #[tokio::test]
    async fn test_getter_errors_propagate_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let getter = move |name: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err::<FakeJob, _>(ServiceError::NotFound(name)))
        };

        let err = wait_for_job_state(getter, "projects/p/locations/l/jobs/9", &PollConfig::default())
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.service_error().is_some_and(ServiceError::is_not_found));
    }

    #[tokio::test]
    async fn test_timeout_shorter_than_interval_still_polls_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = scripted(vec!["JOB_STATE_CANCELLED"], calls.clone());
        let config = PollConfig::default().with_timeout(Duration::from_millis(100));

        assert!(wait_for_job_state(getter, "n", &config).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_operation_labels() {
        let running = Operation { name: "op".to_string(), ..Operation::default() };
        assert_eq!(running.state_label(), "OPERATION_RUNNING");
        let done = Operation { done: true, ..running.clone() };
        assert_eq!(done.state_label(), "OPERATION_DONE");
    }
}
