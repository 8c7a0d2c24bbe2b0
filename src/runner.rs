//! Background task execution
//!
//! Thin wrapper over the tokio runtime handle giving the pipeline its
//! submit/schedule/cancel surface. The runner may legitimately be absent
//! (no runtime where the caller sits); callers treat that as "log a
//! warning and skip the work", never as a reason to panic.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle to the execution substrate for background work
#[derive(Debug, Clone)]
pub struct TaskRunner {
    handle: Handle,
}

impl TaskRunner {
    /// Runner for the current runtime, if one is active
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(|handle| Self { handle })
    }

    /// Runner for an explicit runtime handle
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Submit a one-shot background task
    ///
    /// Dropping the returned handle detaches the task.
    pub fn submit<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TaskHandle {
            inner: self.handle.spawn(task),
        }
    }

    /// Schedule a repeating task with a fixed delay between runs
    pub fn schedule<F>(&self, mut task: F, initial_delay: Duration, period: Duration) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        TaskHandle {
            inner: self.handle.spawn(async move {
                tokio::time::sleep(initial_delay).await;
                loop {
                    task();
                    tokio::time::sleep(period).await;
                }
            }),
        }
    }
}

/// Cancellable handle to a submitted task
#[derive(Debug)]
pub struct TaskHandle {
    inner: JoinHandle<()>,
}

impl TaskHandle {
    /// Request cooperative cancellation of the task
    pub fn cancel(&self) {
        self.inner.abort();
    }

    /// Whether the task has finished (completed or cancelled)
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}
