//! Attach-and-capture pipeline for live publish sessions
//!
//! This crate observes publish sessions owned by a host media runtime:
//! it waits for a session to become attachable, captures its packets
//! without ever blocking the host's delivery path, optionally dumps raw
//! audio/video payloads to disk for diagnostics, and unwinds cleanly when
//! the session stops. A shared registry tracks which publishers are live.
//!
//! # Architecture
//!
//! ```text
//! on_publish_start ──► AttachCoordinator (bounded retry lookup)
//!                           │ found
//!                           ▼
//!                  ┌─ CaptureWorker ◄── on_packet_received (host thread)
//!                  │      │ snapshot + non-blocking enqueue
//!                  │      ▼
//!                  │  PacketQueue ──► run_loop (sole consumer)
//!                  │      │
//!                  │      └──► DumpSink audio / DumpSink video
//!                  │
//!                  └─ TerminationWatcher ◄── on_session_stopped
//!                         │ drain wait = min(cap, depth × per-packet)
//!                         ▼
//!                     close sinks, stop worker, update registry
//! ```
//!
//! # Design invariant
//!
//! No host notification thread ever blocks or sees a failure from this
//! crate. Retry sleeps, the queue take, and the drain wait all live on
//! crate-owned tokio tasks; everything fallible at the boundary is caught
//! and logged, and the worst case is "this packet or session was not
//! captured".

pub mod attach;
pub mod capture;
pub mod config;
pub mod error;
pub mod registry;
pub mod runner;
pub mod service;
pub mod session;
pub mod terminate;

pub use attach::{AttachCoordinator, AttachState};
pub use capture::{packet_queue, CaptureWorker, DumpSink, PacketQueue, PacketReceiver};
pub use config::CaptureConfig;
pub use error::{CaptureError, Result};
pub use registry::{PublishKey, PublisherRegistry};
pub use runner::{TaskHandle, TaskRunner};
pub use service::CaptureService;
pub use session::{
    CapturedPacket, MediaKind, PacketObserver, PacketRef, PublishSession, SessionDirectory,
    TerminationObserver,
};
pub use terminate::{drain_wait, TerminationWatcher};
