//! Host notification glue
//!
//! The service is what the host runtime talks to: it receives the
//! publish-start notification, never gates publishing, and schedules the
//! attach work on its own task runner as a side effect. It also exposes
//! the registry query surface used by status and diagnostics callers.

use std::sync::Arc;

use crate::attach::AttachCoordinator;
use crate::config::CaptureConfig;
use crate::registry::{PublishKey, PublisherRegistry};
use crate::runner::TaskRunner;
use crate::session::SessionDirectory;

/// Entry point wiring host notifications to the capture pipeline
pub struct CaptureService {
    config: CaptureConfig,
    registry: Arc<PublisherRegistry>,
    directory: Arc<dyn SessionDirectory>,
    runner: Option<TaskRunner>,
}

impl CaptureService {
    /// Create a service using the current runtime as task runner
    ///
    /// When constructed outside a runtime the runner is absent and
    /// publish-start notifications become logged no-ops.
    pub fn new(config: CaptureConfig, directory: Arc<dyn SessionDirectory>) -> Self {
        Self::with_runner(config, directory, TaskRunner::current())
    }

    /// Create a service with an explicit (possibly absent) task runner
    pub fn with_runner(
        config: CaptureConfig,
        directory: Arc<dyn SessionDirectory>,
        runner: Option<TaskRunner>,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(PublisherRegistry::new()),
            directory,
            runner,
        }
    }

    /// The publisher registry backing this service
    pub fn registry(&self) -> &Arc<PublisherRegistry> {
        &self.registry
    }

    /// A publisher is being set up in the host runtime
    ///
    /// Always allows the publish to proceed; capturing is a side effect
    /// scheduled on a background task, and its absence (attach give-up,
    /// missing runner) is observable only via logs and the registry.
    pub fn on_publish_start(&self, key: PublishKey) -> bool {
        tracing::debug!(stream = %key, "Publish starting");

        let Some(runner) = self.runner.clone() else {
            tracing::warn!(stream = %key, "Task runner unavailable, publish will not be captured");
            return true;
        };

        let coordinator = AttachCoordinator::new(
            Arc::clone(&self.directory),
            Arc::clone(&self.registry),
            self.config.clone(),
            runner.clone(),
        );
        let _detached = runner.submit(async move {
            coordinator.attach(key).await;
        });

        true
    }

    /// Whether a publisher is currently active
    pub fn is_publisher_active(&self, key: &PublishKey) -> bool {
        self.registry.contains(key)
    }

    /// Snapshot of all active publishers
    pub fn list_active_publishers(&self) -> Vec<PublishKey> {
        self.registry.list_active()
    }
}
