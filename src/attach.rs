//! Attach coordination
//!
//! A publish-start notification arrives before the session object is
//! necessarily visible in the directory, and the host offers no
//! "session created" event to subscribe to. The coordinator therefore
//! polls: a bounded number of lookups spaced a fixed delay apart, run on
//! a background task so the host's publish-setup path is never blocked.
//! Exhausting the budget is not an error; the session is simply never
//! captured, observable only in the logs and the registry.

use std::sync::Arc;

use crate::capture::CaptureWorker;
use crate::config::CaptureConfig;
use crate::registry::{PublishKey, PublisherRegistry};
use crate::runner::TaskRunner;
use crate::session::{PacketObserver, PublishSession, SessionDirectory, TerminationObserver};
use crate::terminate::TerminationWatcher;

/// Outcome of an attach attempt sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// Still polling for the session to appear
    Searching,
    /// Capture pipeline is wired to the session
    Attached,
    /// Retry budget exhausted without finding the session
    GaveUp,
}

/// Waits for a publish session to become attachable, then wires the
/// capture pipeline to it
pub struct AttachCoordinator {
    directory: Arc<dyn SessionDirectory>,
    registry: Arc<PublisherRegistry>,
    config: CaptureConfig,
    runner: TaskRunner,
}

impl AttachCoordinator {
    /// Create a coordinator
    pub fn new(
        directory: Arc<dyn SessionDirectory>,
        registry: Arc<PublisherRegistry>,
        config: CaptureConfig,
        runner: TaskRunner,
    ) -> Self {
        Self {
            directory,
            registry,
            config,
            runner,
        }
    }

    /// Poll for the session and attach to it
    ///
    /// Makes up to `attach_max_attempts` lookups spaced
    /// `attach_retry_delay` apart. On success the capture worker is
    /// registered as the session's packet observer, a one-shot
    /// termination watcher is installed, and the key is added to the
    /// publisher registry.
    pub async fn attach(&self, key: PublishKey) -> AttachState {
        let mut state = AttachState::Searching;
        let max_attempts = self.config.attach_max_attempts;

        for attempt in 1..=max_attempts {
            if let Some(session) = self.directory.lookup(&key) {
                self.wire(&key, session).await;
                tracing::debug!(stream = %key, attempt, "Attached to publish session");
                state = AttachState::Attached;
                break;
            }

            tracing::trace!(stream = %key, attempt, max_attempts, "Session not yet attachable");
            if attempt < max_attempts {
                tokio::time::sleep(self.config.attach_retry_delay).await;
            }
        }

        if state == AttachState::Searching {
            tracing::warn!(
                stream = %key,
                attempts = max_attempts,
                "Giving up, publish session never became attachable"
            );
            state = AttachState::GaveUp;
        }

        state
    }

    async fn wire(&self, key: &PublishKey, session: Arc<dyn PublishSession>) {
        let worker = CaptureWorker::new(key, &self.config, self.runner.clone()).await;
        worker.start();
        session.add_packet_observer(Arc::clone(&worker) as Arc<dyn PacketObserver>);

        let watcher = TerminationWatcher::new(
            key.clone(),
            Arc::clone(&worker),
            Arc::clone(&self.registry),
            &self.config,
            self.runner.clone(),
        );
        session.add_termination_observer(watcher as Arc<dyn TerminationObserver>);

        self.registry.add(key.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::session::PacketRef;

    use super::*;

    #[derive(Default)]
    struct FakeSession {
        packet_observers: Mutex<Vec<Arc<dyn PacketObserver>>>,
        termination_observers: Mutex<Vec<Arc<dyn TerminationObserver>>>,
    }

    impl PublishSession for FakeSession {
        fn key(&self) -> PublishKey {
            PublishKey::new("demo", "alice")
        }

        fn add_packet_observer(&self, observer: Arc<dyn PacketObserver>) {
            self.packet_observers.lock().unwrap().push(observer);
        }

        fn remove_packet_observer(&self, observer: &Arc<dyn PacketObserver>) {
            self.packet_observers
                .lock()
                .unwrap()
                .retain(|o| !crate::session::observer_eq(o, observer));
        }

        fn add_termination_observer(&self, observer: Arc<dyn TerminationObserver>) {
            self.termination_observers.lock().unwrap().push(observer);
        }

        fn remove_termination_observer(&self, observer: &Arc<dyn TerminationObserver>) {
            self.termination_observers
                .lock()
                .unwrap()
                .retain(|o| !crate::session::observer_eq(o, observer));
        }
    }

    /// Directory that yields the session only after a number of failed lookups
    struct FlakyDirectory {
        session: Arc<FakeSession>,
        lookups: AtomicUsize,
        ready_after: usize,
    }

    impl SessionDirectory for FlakyDirectory {
        fn lookup(&self, _key: &PublishKey) -> Option<Arc<dyn PublishSession>> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            if n < self.ready_after {
                None
            } else {
                Some(Arc::clone(&self.session) as Arc<dyn PublishSession>)
            }
        }
    }

    fn test_config() -> CaptureConfig {
        CaptureConfig::default()
            .dump_enabled(false)
            .attach_retry_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_attach_succeeds_on_third_attempt() {
        let directory = Arc::new(FlakyDirectory {
            session: Arc::new(FakeSession::default()),
            lookups: AtomicUsize::new(0),
            ready_after: 2,
        });
        let registry = Arc::new(PublisherRegistry::new());
        let coordinator = AttachCoordinator::new(
            Arc::clone(&directory) as Arc<dyn SessionDirectory>,
            Arc::clone(&registry),
            test_config(),
            TaskRunner::current().unwrap(),
        );

        let key = PublishKey::new("demo", "alice");
        let state = coordinator.attach(key.clone()).await;

        assert_eq!(state, AttachState::Attached);
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 3);
        assert!(registry.contains(&key));
        assert_eq!(directory.session.packet_observers.lock().unwrap().len(), 1);
        assert_eq!(
            directory.session.termination_observers.lock().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_attach_gives_up_after_budget() {
        let directory = Arc::new(FlakyDirectory {
            session: Arc::new(FakeSession::default()),
            lookups: AtomicUsize::new(0),
            ready_after: usize::MAX,
        });
        let registry = Arc::new(PublisherRegistry::new());
        let coordinator = AttachCoordinator::new(
            Arc::clone(&directory) as Arc<dyn SessionDirectory>,
            Arc::clone(&registry),
            test_config(),
            TaskRunner::current().unwrap(),
        );

        let key = PublishKey::new("demo", "ghost");
        let state = coordinator.attach(key.clone()).await;

        assert_eq!(state, AttachState::GaveUp);
        // Exactly the configured number of lookups, no more
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 3);
        assert!(!registry.contains(&key));
        assert!(directory.session.packet_observers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attached_worker_receives_packets() {
        let session = Arc::new(FakeSession::default());
        let directory = Arc::new(FlakyDirectory {
            session: Arc::clone(&session),
            lookups: AtomicUsize::new(0),
            ready_after: 0,
        });
        let registry = Arc::new(PublisherRegistry::new());
        let coordinator = AttachCoordinator::new(
            directory as Arc<dyn SessionDirectory>,
            registry,
            test_config(),
            TaskRunner::current().unwrap(),
        );

        coordinator.attach(PublishKey::new("demo", "alice")).await;

        let observers = session.packet_observers.lock().unwrap();
        observers[0].on_packet_received(PacketRef::video(0, &[0x17, 0x01]));
    }
}
