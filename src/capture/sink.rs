//! Best-effort dump sinks
//!
//! A dump sink persists raw payload bytes for one media kind to one
//! destination file, for diagnostics only. Writes are best-effort: an I/O
//! failure is logged and the sink stays open. Per-packet dump tasks carry
//! no ordering guarantee between themselves, so the sink serializes its
//! own writes internally.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{CaptureError, Result};
use crate::session::MediaKind;

/// Build the dump file name for a stream and media kind
///
/// Audio dumps as raw AAC, video as raw H.264 Annex B; anything else gets
/// a generic binary extension.
pub fn dump_file_name(kind: MediaKind, stream_name: &str) -> String {
    let extension = match kind {
        MediaKind::Audio => "aac",
        MediaKind::Video => "h264",
        MediaKind::Metadata => "bin",
    };
    format!("{}_{}_dump.{}", stream_name, kind.label(), extension)
}

/// Append-only persistence target for one media kind
///
/// Open from construction until [`close`](DumpSink::close); close is
/// idempotent and writes after close are dropped with a log line.
pub struct DumpSink {
    kind: MediaKind,
    path: PathBuf,
    file: Mutex<Option<File>>,
    closed: AtomicBool,
}

impl DumpSink {
    /// Create a sink writing to `<dir>/<stream>_<kind>_dump.<ext>`
    pub async fn create(kind: MediaKind, dir: &Path, stream_name: &str) -> Result<Self> {
        let path = dir.join(dump_file_name(kind, stream_name));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| CaptureError::DumpOpen {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(kind = kind.label(), path = %path.display(), "Dump sink opened");

        Ok(Self {
            kind,
            path,
            file: Mutex::new(Some(file)),
            closed: AtomicBool::new(false),
        })
    }

    /// Destination path of this sink
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Media kind this sink persists
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Append bytes to the dump file
    ///
    /// A write after close is a logged no-op, not an error; only a real
    /// I/O failure is returned (callers log it, the sink stays open).
    pub async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut file = self.file.lock().await;
        let Some(file) = file.as_mut() else {
            tracing::debug!(
                kind = self.kind.label(),
                dropped_bytes = bytes.len(),
                "Write after close dropped"
            );
            return Ok(());
        };

        file.write_all(bytes)
            .await
            .map_err(|source| CaptureError::DumpWrite {
                path: self.path.clone(),
                source,
            })
    }

    /// Close the sink, flushing buffered bytes
    ///
    /// Safe to call multiple times. Flush failures are logged, never
    /// returned.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut file = self.file.lock().await;
        if let Some(mut file) = file.take() {
            if let Err(e) = file.flush().await {
                tracing::warn!(
                    kind = self.kind.label(),
                    path = %self.path.display(),
                    error = %e,
                    "Failed to flush dump sink"
                );
            }
            tracing::debug!(kind = self.kind.label(), path = %self.path.display(), "Dump sink closed");
        }
    }

    /// Whether the sink has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for DumpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpSink")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
