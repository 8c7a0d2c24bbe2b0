//! Host session interface boundary
//!
//! The host runtime owns publish sessions outright; this crate only
//! observes them. The traits here describe that boundary:
//!
//! - [`PublishSession`] — the session object, held behind a shared handle
//!   and used only to register/unregister observers
//! - [`PacketObserver`] — receives every packet the session delivers;
//!   implementations must return quickly and never panic back into the
//!   host's delivery thread
//! - [`TerminationObserver`] — notified once when the session stops
//! - [`SessionDirectory`] — lookup of a live session by key, polled during
//!   attach because the host exposes no push-based "session created" event
//!
//! Observer registration is identity-based: removal compares the `Arc`
//! allocation address (see [`observer_eq`]), mirroring listener-list
//! semantics on the host side.

pub mod packet;

use std::sync::Arc;

use crate::registry::PublishKey;

pub use packet::{CapturedPacket, MediaKind, PacketRef};

/// A live publish session owned by the host runtime
///
/// The capture pipeline holds this handle only to attach and detach
/// observers; it never controls the session's lifetime.
pub trait PublishSession: Send + Sync {
    /// Key identifying this session
    fn key(&self) -> PublishKey;

    /// Register a packet observer
    fn add_packet_observer(&self, observer: Arc<dyn PacketObserver>);

    /// Unregister a packet observer by identity
    fn remove_packet_observer(&self, observer: &Arc<dyn PacketObserver>);

    /// Register a termination observer
    fn add_termination_observer(&self, observer: Arc<dyn TerminationObserver>);

    /// Unregister a termination observer by identity
    fn remove_termination_observer(&self, observer: &Arc<dyn TerminationObserver>);
}

/// Receives packets delivered by a publish session
///
/// Called on the host's own delivery thread. Implementations must be
/// non-blocking and must not propagate failures to the caller.
pub trait PacketObserver: Send + Sync {
    /// A packet arrived from the session
    ///
    /// The packet view is only valid for the duration of the call; the
    /// host may reuse or reclaim the underlying buffer afterwards.
    fn on_packet_received(&self, packet: PacketRef<'_>);
}

/// Notified when a publish session stops
pub trait TerminationObserver: Send + Sync {
    /// The session has stopped delivering packets
    fn on_session_stopped(&self, session: &Arc<dyn PublishSession>);
}

/// Lookup of live publish sessions by key
///
/// Returns `None` while the session is still being set up; attach polls
/// until the session appears or its retry budget runs out.
pub trait SessionDirectory: Send + Sync {
    /// Find the live session for a key, if it exists yet
    fn lookup(&self, key: &PublishKey) -> Option<Arc<dyn PublishSession>>;
}

/// Identity comparison for observer handles
///
/// Compares the allocation address only, ignoring vtable metadata, so the
/// comparison is reliable for `Arc<dyn Trait>` handles cloned from the
/// same allocation.
pub fn observer_eq<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
