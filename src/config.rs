//! Capture configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for the capture pipeline
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Whether to persist raw audio/video payloads to dump files
    pub dump_enabled: bool,

    /// Directory dump files are written to
    pub dump_dir: PathBuf,

    /// Maximum number of session lookups before attach gives up
    pub attach_max_attempts: u32,

    /// Delay between attach attempts
    pub attach_retry_delay: Duration,

    /// Upper bound on the drain wait performed at session stop
    pub drain_wait_cap: Duration,

    /// Per-queued-packet drain allowance (roughly one video frame interval)
    pub drain_per_packet: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            dump_enabled: true,
            dump_dir: std::env::temp_dir(),
            attach_max_attempts: 3,
            attach_retry_delay: Duration::from_millis(500),
            drain_wait_cap: Duration::from_secs(10),
            drain_per_packet: Duration::from_millis(16),
        }
    }
}

impl CaptureConfig {
    /// Enable or disable audio/video dump files
    pub fn dump_enabled(mut self, enabled: bool) -> Self {
        self.dump_enabled = enabled;
        self
    }

    /// Set the dump directory
    pub fn dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    /// Set the maximum number of attach attempts
    pub fn attach_max_attempts(mut self, attempts: u32) -> Self {
        self.attach_max_attempts = attempts;
        self
    }

    /// Set the delay between attach attempts
    pub fn attach_retry_delay(mut self, delay: Duration) -> Self {
        self.attach_retry_delay = delay;
        self
    }

    /// Set the drain wait cap
    pub fn drain_wait_cap(mut self, cap: Duration) -> Self {
        self.drain_wait_cap = cap;
        self
    }

    /// Set the per-packet drain allowance
    pub fn drain_per_packet(mut self, per_packet: Duration) -> Self {
        self.drain_per_packet = per_packet;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();

        assert!(config.dump_enabled);
        assert_eq!(config.dump_dir, std::env::temp_dir());
        assert_eq!(config.attach_max_attempts, 3);
        assert_eq!(config.attach_retry_delay, Duration::from_millis(500));
        assert_eq!(config.drain_wait_cap, Duration::from_secs(10));
        assert_eq!(config.drain_per_packet, Duration::from_millis(16));
    }

    #[test]
    fn test_builder_chaining() {
        let config = CaptureConfig::default()
            .dump_enabled(false)
            .dump_dir("/var/tmp/captures")
            .attach_max_attempts(5)
            .attach_retry_delay(Duration::from_millis(250))
            .drain_wait_cap(Duration::from_secs(2))
            .drain_per_packet(Duration::from_millis(33));

        assert!(!config.dump_enabled);
        assert_eq!(config.dump_dir, PathBuf::from("/var/tmp/captures"));
        assert_eq!(config.attach_max_attempts, 5);
        assert_eq!(config.attach_retry_delay, Duration::from_millis(250));
        assert_eq!(config.drain_wait_cap, Duration::from_secs(2));
        assert_eq!(config.drain_per_packet, Duration::from_millis(33));
    }
}
