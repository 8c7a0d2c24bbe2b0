//! Session termination handling
//!
//! When the host reports that a publish session stopped, the watcher
//! unhooks the capture pipeline, gives the buffered backlog a bounded
//! chance to flush, and then tears everything down. The whole sequence
//! runs on a background task; the host's notification thread only flips
//! a flag and spawns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::capture::CaptureWorker;
use crate::config::CaptureConfig;
use crate::registry::{PublishKey, PublisherRegistry};
use crate::runner::TaskRunner;
use crate::session::{PacketObserver, PublishSession, TerminationObserver};

/// Bounded drain wait for a given queue backlog
///
/// `per_packet` approximates one video-frame interval, so the wait is a
/// heuristic flush allowance, not a guarantee that a slow consumer
/// finishes the backlog.
pub fn drain_wait(queue_depth: usize, per_packet: Duration, cap: Duration) -> Duration {
    let depth = u32::try_from(queue_depth).unwrap_or(u32::MAX);
    cap.min(per_packet.saturating_mul(depth))
}

/// One-shot teardown handler bound to a single publish session
pub struct TerminationWatcher {
    this: Weak<TerminationWatcher>,
    key: PublishKey,
    worker: Arc<CaptureWorker>,
    registry: Arc<PublisherRegistry>,
    runner: TaskRunner,
    drain_per_packet: Duration,
    drain_wait_cap: Duration,
    fired: AtomicBool,
}

impl TerminationWatcher {
    /// Create a watcher for the given session pipeline
    pub fn new(
        key: PublishKey,
        worker: Arc<CaptureWorker>,
        registry: Arc<PublisherRegistry>,
        config: &CaptureConfig,
        runner: TaskRunner,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            key,
            worker,
            registry,
            runner,
            drain_per_packet: config.drain_per_packet,
            drain_wait_cap: config.drain_wait_cap,
            fired: AtomicBool::new(false),
        })
    }

    async fn finish(self: Arc<Self>, session: Arc<dyn PublishSession>) {
        // Unhook first so no further packets are delivered
        session.remove_packet_observer(&(Arc::clone(&self.worker) as Arc<dyn PacketObserver>));
        session.remove_termination_observer(&(Arc::clone(&self) as Arc<dyn TerminationObserver>));

        let depth = self.worker.queue_depth();
        if depth > 0 {
            let wait = drain_wait(depth, self.drain_per_packet, self.drain_wait_cap);
            tracing::debug!(
                stream = %self.key,
                depth,
                wait_ms = wait.as_millis() as u64,
                "Waiting for queued packets to be processed"
            );
            tokio::time::sleep(wait).await;
        }

        self.worker.shutdown().await;
        self.registry.remove(&self.key);
        tracing::debug!(stream = %self.key, "Capture pipeline stopped");
    }
}

impl TerminationObserver for TerminationWatcher {
    fn on_session_stopped(&self, session: &Arc<dyn PublishSession>) {
        if self.fired.swap(true, Ordering::SeqCst) {
            tracing::trace!(stream = %self.key, "Termination already handled");
            return;
        }
        tracing::debug!(stream = %self.key, "Publish session stopped");

        let Some(this) = self.this.upgrade() else {
            return;
        };
        let session = Arc::clone(session);
        // Teardown runs off the host's notification thread
        let _detached = self.runner.submit(this.finish(session));
    }
}
