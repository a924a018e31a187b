//! Blocking wait for job and pipeline completion.
//!
//! The job is re-fetched at a fixed interval. Progress messages are emitted
//! on a separate cadence that doubles after each message, up to a cap, so a
//! job running for hours does not flood the log.

use crate::error::{SdkError, SdkResult};
use crate::resource_name::ResourceName;
use async_trait::async_trait;
use std::time::Duration;
use stratus_abstraction::Status;
use tokio::time::Instant;
use tracing::info;

/// A remote job that can be re-fetched and inspected for completion.
#[async_trait]
pub trait CompletableJob: Send {
    fn resource_name(&self) -> &str;

    /// Re-fetches the remote representation.
    async fn refresh(&mut self) -> SdkResult<()>;

    fn state_label(&self) -> String;

    /// True once the state is succeeded, failed, cancelled or paused.
    fn is_complete(&self) -> bool;

    /// The failure status when the job ended in an error state or carries a
    /// non-OK status.
    fn failure(&self) -> Option<Status>;

    /// Resource name of the model the job produced, if any.
    fn model_name(&self) -> Option<String> {
        None
    }

    /// Runs once per poll iteration, after each refresh.
    fn on_poll(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub initial_log_interval: Duration,
    pub log_multiplier: u32,
    pub max_log_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            initial_log_interval: Duration::from_secs(5),
            log_multiplier: 2,
            max_log_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Decides when the next progress message is due.
#[derive(Debug)]
pub struct LogCadence {
    interval: Duration,
    multiplier: u32,
    max: Duration,
    last: Instant,
}

impl LogCadence {
    #[must_use]
    pub fn new(policy: &WaitPolicy, start: Instant) -> Self {
        Self {
            interval: policy.initial_log_interval,
            multiplier: policy.log_multiplier.max(1),
            max: policy.max_log_interval,
            last: start,
        }
    }

    /// Returns true when a message is due at `now`, and backs off if so.
    pub fn should_log(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) < self.interval {
            return false;
        }
        self.interval = (self.interval * self.multiplier).min(self.max);
        self.last = now;
        true
    }

    #[must_use]
    pub const fn current_interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub resource_name: String,
    pub state: String,
    pub model: Option<ResourceName>,
}

/// Blocks until `job` completes.
///
/// # Errors
/// [`SdkError::JobFailed`] if the job ended in an error state, or any error
/// from refreshing it.
pub async fn block_until_complete<J>(job: &mut J, policy: &WaitPolicy) -> SdkResult<CompletedJob>
where
    J: CompletableJob + ?Sized,
{
    let mut cadence = LogCadence::new(policy, Instant::now());

    loop {
        job.refresh().await?;
        job.on_poll();
        if job.is_complete() {
            break;
        }
        if cadence.should_log(Instant::now()) {
            info!(
                resource = %job.resource_name(),
                state = %job.state_label(),
                "Job still running"
            );
        }
        tokio::time::sleep(policy.poll_interval).await;
    }

    if let Some(status) = job.failure() {
        return Err(SdkError::JobFailed { resource: job.resource_name().to_string(), status });
    }

    let model = job.model_name().map(|name| ResourceName::parse(&name)).transpose()?;
    info!(resource = %job.resource_name(), state = %job.state_label(), "Job completed");
    if let Some(model) = &model {
        info!(model = %model, "Job produced a model");
    }

    Ok(CompletedJob {
        resource_name: job.resource_name().to_string(),
        state: job.state_label(),
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_abstraction::PipelineState;

    struct ScriptedJob {
        states: Vec<PipelineState>,
        refreshes: usize,
        polls: usize,
        error: Option<Status>,
        model: Option<String>,
    }

    impl ScriptedJob {
        fn new(states: Vec<PipelineState>) -> Self {
            Self { states, refreshes: 0, polls: 0, error: None, model: None }
        }

        fn state(&self) -> PipelineState {
            let idx = self.refreshes.saturating_sub(1).min(self.states.len() - 1);
            self.states[idx]
        }
    }

    #[async_trait]
    impl CompletableJob for ScriptedJob {
        fn resource_name(&self) -> &str {
            "projects/p/locations/l/trainingPipelines/1"
        }

        async fn refresh(&mut self) -> SdkResult<()> {
            self.refreshes += 1;
            Ok(())
        }

        fn state_label(&self) -> String {
            self.state().to_string()
        }

        fn is_complete(&self) -> bool {
            self.state().is_complete()
        }

        fn failure(&self) -> Option<Status> {
            let error = self.error.clone().filter(|s| !s.is_ok());
            if self.state().is_error() {
                return Some(error.unwrap_or_default());
            }
            error
        }

        fn model_name(&self) -> Option<String> {
            self.model.clone()
        }

        fn on_poll(&mut self) {
            self.polls += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_raises() {
        let mut job = ScriptedJob::new(vec![PipelineState::Running, PipelineState::Failed]);
        job.error = Some(Status { code: 13, message: "worker crashed".to_string(), details: vec![] });

        let err = block_until_complete(&mut job, &WaitPolicy::default()).await.unwrap_err();

        match err {
            SdkError::JobFailed { status, .. } => assert_eq!(status.message, "worker crashed"),
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_job_returns_model() {
        let mut job = ScriptedJob::new(vec![
            PipelineState::Pending,
            PipelineState::Running,
            PipelineState::Succeeded,
        ]);
        job.model = Some("projects/p/locations/l/models/42".to_string());

        let completed = block_until_complete(&mut job, &WaitPolicy::default()).await.unwrap();

        assert_eq!(completed.model.unwrap().to_string(), "projects/p/locations/l/models/42");
        assert_eq!(completed.state, "PIPELINE_STATE_SUCCEEDED");
        assert_eq!(job.refreshes, 3);
        assert_eq!(job.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_without_error_returns_normally() {
        let mut job = ScriptedJob::new(vec![PipelineState::Cancelled]);
        let completed = block_until_complete(&mut job, &WaitPolicy::default()).await.unwrap();
        assert!(completed.model.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_interval_is_fixed() {
        let mut job = ScriptedJob::new(vec![
            PipelineState::Running,
            PipelineState::Running,
            PipelineState::Running,
            PipelineState::Running,
            PipelineState::Succeeded,
        ]);
        let start = Instant::now();
        block_until_complete(&mut job, &WaitPolicy::default()).await.unwrap();
        assert_eq!(start.elapsed().as_secs(), 20);
    }

    #[test]
    fn test_log_cadence_doubles_up_to_cap() {
        let policy = WaitPolicy {
            initial_log_interval: Duration::from_secs(5),
            max_log_interval: Duration::from_secs(30),
            ..WaitPolicy::default()
        };
        let start = Instant::now();
        let mut cadence = LogCadence::new(&policy, start);

        assert!(!cadence.should_log(start + Duration::from_secs(4)));
        assert!(cadence.should_log(start + Duration::from_secs(5)));
        assert_eq!(cadence.current_interval(), Duration::from_secs(10));
        assert!(!cadence.should_log(start + Duration::from_secs(14)));
        assert!(cadence.should_log(start + Duration::from_secs(15)));
        assert_eq!(cadence.current_interval(), Duration::from_secs(20));
        assert!(cadence.should_log(start + Duration::from_secs(35)));
        assert_eq!(cadence.current_interval(), Duration::from_secs(30));
        assert!(cadence.should_log(start + Duration::from_secs(65)));
        assert_eq!(cadence.current_interval(), Duration::from_secs(30));
    }
}
