//! Unbounded packet transfer queue
//!
//! Multi-producer/single-consumer queue decoupling packet arrival from
//! processing. Producers never block; the sole consumer suspends while the
//! queue is empty. A shared depth counter lets the producer side (and the
//! termination path) observe the backlog without owning the receiver.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::session::CapturedPacket;

/// Create a linked producer/consumer pair
pub fn packet_queue() -> (PacketQueue, PacketReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));

    (
        PacketQueue {
            tx,
            depth: Arc::clone(&depth),
        },
        PacketReceiver { rx, depth },
    )
}

/// Producer handle for the packet queue
#[derive(Debug, Clone)]
pub struct PacketQueue {
    tx: mpsc::UnboundedSender<CapturedPacket>,
    depth: Arc<AtomicUsize>,
}

impl PacketQueue {
    /// Enqueue a packet without blocking
    ///
    /// Returns `false` if the consumer is gone and the packet was dropped.
    pub fn push(&self, packet: CapturedPacket) -> bool {
        // Increment before send so the counter never underflows when the
        // consumer races ahead; a failed send undoes it.
        self.depth.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(packet).is_err() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Number of packets currently buffered
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sole consumer of the packet queue
#[derive(Debug)]
pub struct PacketReceiver {
    rx: mpsc::UnboundedReceiver<CapturedPacket>,
    depth: Arc<AtomicUsize>,
}

impl PacketReceiver {
    /// Take the next packet, suspending while the queue is empty
    ///
    /// Returns `None` once every producer handle has been dropped.
    pub async fn recv(&mut self) -> Option<CapturedPacket> {
        let packet = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(packet)
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{CapturedPacket, PacketRef};

    use super::*;

    fn packet(timestamp_ms: u32) -> CapturedPacket {
        CapturedPacket::snapshot(&PacketRef::video(timestamp_ms, &[0x17, 0x01]))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, mut rx) = packet_queue();

        for ts in 0..50 {
            assert!(queue.push(packet(ts)));
        }

        for ts in 0..50 {
            let received = rx.recv().await.unwrap();
            assert_eq!(received.timestamp_ms, ts);
        }
    }

    #[tokio::test]
    async fn test_depth_tracking() {
        let (queue, mut rx) = packet_queue();
        assert!(queue.is_empty());

        for ts in 0..20 {
            queue.push(packet(ts));
        }
        assert_eq!(queue.len(), 20);

        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        assert_eq!(queue.len(), 18);
    }

    #[tokio::test]
    async fn test_push_after_consumer_dropped() {
        let (queue, rx) = packet_queue();
        drop(rx);

        assert!(!queue.push(packet(0)));
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_recv_after_producers_dropped() {
        let (queue, mut rx) = packet_queue();
        queue.push(packet(0));
        drop(queue);

        // Buffered packet is still delivered, then the channel closes
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
