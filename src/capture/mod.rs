//! Packet capture pipeline
//!
//! ```text
//!  host delivery thread                core-owned tasks
//!  ────────────────────                ────────────────
//!  on_packet_received()
//!    │ snapshot + non-blocking push
//!    ▼
//!  PacketQueue ──────────────────────► run_loop (sole consumer, FIFO)
//!    │
//!    └─ per-packet fire-and-forget ──► DumpSink (audio)
//!                                  └─► DumpSink (video)
//! ```
//!
//! The ingestion path never blocks and never propagates a failure back to
//! the host: the queue is unbounded, dump writes run as detached tasks,
//! and every fallible step is logged instead of returned.

pub mod queue;
pub mod sink;
pub mod worker;

pub use queue::{packet_queue, PacketQueue, PacketReceiver};
pub use sink::DumpSink;
pub use worker::CaptureWorker;
