//! Capture worker
//!
//! Owns one packet queue and its consumption loop for a single publish
//! session, and routes audio/video payloads to the dump sinks. The worker
//! is the crate's [`PacketObserver`]: `on_packet_received` runs on the
//! host's delivery thread and must stay non-blocking, so it only
//! snapshots, enqueues, and spawns detached dump writes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::CaptureConfig;
use crate::registry::PublishKey;
use crate::runner::{TaskHandle, TaskRunner};
use crate::session::{CapturedPacket, MediaKind, PacketObserver, PacketRef};

use super::queue::{packet_queue, PacketQueue, PacketReceiver};
use super::sink::DumpSink;

/// Captures packets from one publish session
pub struct CaptureWorker {
    stream_name: String,

    /// Producer side; cleared by `request_stop`, after which arrivals drop
    queue: Mutex<Option<PacketQueue>>,

    /// Consumer side; taken by `start` when the loop task spawns
    receiver: Mutex<Option<PacketReceiver>>,

    audio_sink: Option<Arc<DumpSink>>,
    video_sink: Option<Arc<DumpSink>>,

    loop_task: Mutex<Option<TaskHandle>>,

    /// Unix millis of the latest packet arrival (0 = never)
    last_receive_ms: AtomicU64,

    runner: TaskRunner,
}

impl CaptureWorker {
    /// Create a worker for the given session key
    ///
    /// Dump sinks are opened here when dumping is enabled; a sink that
    /// fails to open is logged and skipped, capture continues without it.
    pub async fn new(key: &PublishKey, config: &CaptureConfig, runner: TaskRunner) -> Arc<Self> {
        let (queue, receiver) = packet_queue();

        let (audio_sink, video_sink) = if config.dump_enabled {
            (
                open_sink(MediaKind::Audio, config, &key.name).await,
                open_sink(MediaKind::Video, config, &key.name).await,
            )
        } else {
            (None, None)
        };

        Arc::new(Self {
            stream_name: key.to_string(),
            queue: Mutex::new(Some(queue)),
            receiver: Mutex::new(Some(receiver)),
            audio_sink,
            video_sink,
            loop_task: Mutex::new(None),
            last_receive_ms: AtomicU64::new(0),
            runner,
        })
    }

    /// Spawn the queue consumption loop
    ///
    /// Runs until [`request_stop`](Self::request_stop) cancels it. Calling
    /// `start` twice is a logged no-op.
    pub fn start(self: &Arc<Self>) {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(receiver) = receiver else {
            tracing::warn!(stream = %self.stream_name, "Capture worker already started");
            return;
        };

        let worker = Arc::clone(self);
        let handle = self.runner.submit(worker.run_loop(receiver));
        *self
            .loop_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    async fn run_loop(self: Arc<Self>, mut receiver: PacketReceiver) {
        tracing::debug!(stream = %self.stream_name, "Packet queue processor started");
        while let Some(packet) = receiver.recv().await {
            self.process(&packet);
        }
        tracing::debug!(stream = %self.stream_name, "Packet queue processor exited");
    }

    /// Downstream processing hook for dequeued packets
    fn process(&self, packet: &CapturedPacket) {
        tracing::trace!(
            stream = %self.stream_name,
            kind = packet.kind.label(),
            timestamp_ms = packet.timestamp_ms,
            len = packet.len(),
            "Processing packet from queue"
        );
    }

    /// Cancel the consumption loop and release buffered packets
    ///
    /// Idempotent; packets arriving afterwards are silently dropped.
    pub fn request_stop(&self) {
        if let Some(handle) = self
            .loop_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.cancel();
        }

        if self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            tracing::debug!(stream = %self.stream_name, "Packet queue released");
        }

        // A never-started receiver still holds buffered packets
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Close the dump sinks and stop the worker
    ///
    /// Idempotent, like the pieces it is built from.
    pub async fn shutdown(&self) {
        if let Some(sink) = &self.audio_sink {
            sink.close().await;
        }
        if let Some(sink) = &self.video_sink {
            sink.close().await;
        }
        self.request_stop();
    }

    /// Current packet backlog (0 once stopped)
    pub fn queue_depth(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(PacketQueue::len)
            .unwrap_or(0)
    }

    /// Unix millis of the latest packet arrival, if any packet arrived
    pub fn last_receive_ms(&self) -> Option<u64> {
        match self.last_receive_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(ms),
        }
    }

    /// Audio dump sink, when dumping is enabled
    pub fn audio_sink(&self) -> Option<&Arc<DumpSink>> {
        self.audio_sink.as_ref()
    }

    /// Video dump sink, when dumping is enabled
    pub fn video_sink(&self) -> Option<&Arc<DumpSink>> {
        self.video_sink.as_ref()
    }
}

impl PacketObserver for CaptureWorker {
    fn on_packet_received(&self, packet: PacketRef<'_>) {
        tracing::trace!(
            stream = %self.stream_name,
            kind = packet.kind.label(),
            data_type = packet.data_type,
            "Packet received"
        );
        self.last_receive_ms.store(epoch_ms(), Ordering::Relaxed);

        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = queue.as_ref() else {
            tracing::trace!(stream = %self.stream_name, "Worker stopped, packet dropped");
            return;
        };

        let captured = CapturedPacket::snapshot(&packet);
        let payload = captured.payload.clone();
        if !queue.push(captured) {
            tracing::debug!(stream = %self.stream_name, "Queue consumer gone, packet dropped");
            return;
        }

        let sink = match packet.kind {
            MediaKind::Audio => self.audio_sink.as_ref(),
            MediaKind::Video => self.video_sink.as_ref(),
            MediaKind::Metadata => {
                tracing::debug!(
                    stream = %self.stream_name,
                    timestamp_ms = packet.timestamp_ms,
                    "Metadata packet received"
                );
                None
            }
        };

        if let Some(sink) = sink {
            let sink = Arc::clone(sink);
            let stream_name = self.stream_name.clone();
            // Fire-and-forget; the sink serializes concurrent writes itself
            let _detached = self.runner.submit(async move {
                if let Err(e) = sink.write(&payload).await {
                    tracing::warn!(
                        stream = %stream_name,
                        kind = sink.kind().label(),
                        error = %e,
                        "Failed to write packet to dump"
                    );
                }
            });
        }
    }
}

impl std::fmt::Debug for CaptureWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureWorker")
            .field("stream_name", &self.stream_name)
            .field("queue_depth", &self.queue_depth())
            .finish()
    }
}

async fn open_sink(kind: MediaKind, config: &CaptureConfig, stream_name: &str) -> Option<Arc<DumpSink>> {
    match DumpSink::create(kind, &config.dump_dir, stream_name).await {
        Ok(sink) => Some(Arc::new(sink)),
        Err(e) => {
            tracing::warn!(
                stream = stream_name,
                kind = kind.label(),
                error = %e,
                "Dump sink unavailable, continuing without it"
            );
            None
        }
    }
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
