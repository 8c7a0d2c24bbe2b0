//! Active publisher registry
//!
//! Tracks which publish sessions are currently live. The registry is pure
//! bookkeeping: a thread-safe set of [`PublishKey`]s that attach adds to
//! and session teardown removes from. Presence in the set is the only
//! signal it carries; there are no error conditions.
//!
//! The registry is the one piece of state shared by unrelated sessions,
//! so its operations are atomic with respect to concurrent callers and
//! never hold a lock across a blocking call.

pub mod key;
pub mod store;

pub use key::PublishKey;
pub use store::PublisherRegistry;
