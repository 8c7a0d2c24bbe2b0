//! Packet types crossing the host boundary
//!
//! Incoming packets are borrowed views over host-owned buffers; the
//! pipeline snapshots them into [`CapturedPacket`]s at arrival time so the
//! host may mutate or reclaim the original immediately after delivery.

use bytes::Bytes;

/// Kind of media a packet carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Audio payload
    Audio,
    /// Video payload
    Video,
    /// Stream metadata
    Metadata,
}

impl MediaKind {
    /// Lowercase label used in file names and log fields
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Metadata => "metadata",
        }
    }
}

/// Borrowed view of an incoming packet
///
/// Valid only for the duration of the delivery callback.
#[derive(Debug, Clone, Copy)]
pub struct PacketRef<'a> {
    /// Media kind
    pub kind: MediaKind,
    /// Timestamp in milliseconds
    pub timestamp_ms: u32,
    /// Raw data type tag from the host (FLV-style: 8 audio, 9 video, 18 script)
    pub data_type: u8,
    /// Payload bytes, owned by the host
    pub payload: &'a [u8],
}

impl<'a> PacketRef<'a> {
    /// Create an audio packet view
    pub fn audio(timestamp_ms: u32, payload: &'a [u8]) -> Self {
        Self {
            kind: MediaKind::Audio,
            timestamp_ms,
            data_type: 8,
            payload,
        }
    }

    /// Create a video packet view
    pub fn video(timestamp_ms: u32, payload: &'a [u8]) -> Self {
        Self {
            kind: MediaKind::Video,
            timestamp_ms,
            data_type: 9,
            payload,
        }
    }

    /// Create a metadata packet view
    pub fn metadata(timestamp_ms: u32, payload: &'a [u8]) -> Self {
        Self {
            kind: MediaKind::Metadata,
            timestamp_ms,
            data_type: 18,
            payload,
        }
    }
}

/// Immutable snapshot of a packet taken at arrival time
#[derive(Debug, Clone)]
pub struct CapturedPacket {
    /// Media kind
    pub kind: MediaKind,
    /// Timestamp in milliseconds
    pub timestamp_ms: u32,
    /// Copied payload bytes (reference-counted, cheap to clone)
    pub payload: Bytes,
}

impl CapturedPacket {
    /// Snapshot an incoming packet, copying its payload
    pub fn snapshot(packet: &PacketRef<'_>) -> Self {
        Self {
            kind: packet.kind,
            timestamp_ms: packet.timestamp_ms,
            payload: Bytes::copy_from_slice(packet.payload),
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_payload() {
        let mut host_buffer = vec![1u8, 2, 3, 4];
        let packet = CapturedPacket::snapshot(&PacketRef::video(40, &host_buffer));

        // Host reclaims its buffer; the snapshot is unaffected
        host_buffer.clear();

        assert_eq!(packet.kind, MediaKind::Video);
        assert_eq!(packet.timestamp_ms, 40);
        assert_eq!(&packet.payload[..], &[1, 2, 3, 4]);
        assert_eq!(packet.len(), 4);
    }

    #[test]
    fn test_data_type_tags() {
        assert_eq!(PacketRef::audio(0, &[]).data_type, 8);
        assert_eq!(PacketRef::video(0, &[]).data_type, 9);
        assert_eq!(PacketRef::metadata(0, &[]).data_type, 18);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(MediaKind::Audio.label(), "audio");
        assert_eq!(MediaKind::Video.label(), "video");
        assert_eq!(MediaKind::Metadata.label(), "metadata");
    }
}
