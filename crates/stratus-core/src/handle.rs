//! Background work with an explicit join point.

use crate::error::SdkResult;
use std::future::Future;
use tokio::task::JoinHandle;

/// A spawned job wait.
///
/// Dropping the handle detaches the task; call [`join`](Self::join) to
/// observe its outcome.
#[derive(Debug)]
pub struct JobHandle<T> {
    inner: JoinHandle<SdkResult<T>>,
}

impl<T: Send + 'static> JobHandle<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = SdkResult<T>> + Send + 'static,
    {
        Self { inner: tokio::spawn(future) }
    }

    /// Waits for the task and returns its result.
    ///
    /// A panicked or aborted task surfaces as [`SdkError::Join`](crate::SdkError::Join).
    pub async fn join(self) -> SdkResult<T> {
        self.inner.await?
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn abort(&self) {
        self.inner.abort();
    }
}
