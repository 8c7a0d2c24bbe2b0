//! Crate error types
//!
//! Almost everything in the capture pipeline is best-effort: runtime
//! failures are logged at the point they occur rather than returned.
//! The error type below covers the few operations that can fail at
//! setup time (opening a dump destination) or that a caller may want
//! to observe (a failed dump write inside its own writer task).

use std::path::PathBuf;

/// Convenience result alias for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Error type for capture operations
#[derive(Debug)]
pub enum CaptureError {
    /// A dump destination file could not be created or opened
    DumpOpen {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// An append to a dump destination failed
    DumpWrite {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::DumpOpen { path, source } => {
                write!(f, "Failed to open dump file {}: {}", path.display(), source)
            }
            CaptureError::DumpWrite { path, source } => {
                write!(f, "Failed to write dump file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CaptureError {}
