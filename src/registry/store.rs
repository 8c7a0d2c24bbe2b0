//! Publisher registry implementation

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use super::key::PublishKey;

/// Thread-safe set of active publish sessions
///
/// Membership operations are O(1) and lock-local. The lock is a sync
/// `RwLock` rather than an async one because callers include host
/// notification threads that must not await.
#[derive(Debug, Default)]
pub struct PublisherRegistry {
    active: RwLock<HashSet<PublishKey>>,
}

impl PublisherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publisher key
    ///
    /// Returns `true` if the key was newly added.
    pub fn add(&self, key: PublishKey) -> bool {
        let added = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        if added {
            tracing::debug!(stream = %key, "Publisher added");
        }
        added
    }

    /// Remove a publisher key
    ///
    /// Returns `true` if the key was present.
    pub fn remove(&self, key: &PublishKey) -> bool {
        let removed = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed {
            tracing::debug!(stream = %key, "Publisher removed");
        }
        removed
    }

    /// Check whether a publisher is active
    pub fn contains(&self, key: &PublishKey) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Snapshot of all active publisher keys
    pub fn list_active(&self) -> Vec<PublishKey> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of active publishers
    pub fn len(&self) -> usize {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no publisher is active
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_add_contains_remove() {
        let registry = PublisherRegistry::new();
        let key = PublishKey::new("demo", "alice");

        assert!(!registry.contains(&key));
        assert!(registry.add(key.clone()));
        assert!(registry.contains(&key));

        // Duplicate add reports not-newly-added
        assert!(!registry.add(key.clone()));

        assert!(registry.remove(&key));
        assert!(!registry.contains(&key));

        // Removing an absent key reports absence
        assert!(!registry.remove(&key));
    }

    #[test]
    fn test_list_active() {
        let registry = PublisherRegistry::new();
        registry.add(PublishKey::new("demo", "alice"));
        registry.add(PublishKey::new("demo", "bob"));

        let mut active = registry.list_active();
        active.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(active.len(), 2);
        assert_eq!(active[0].name, "alice");
        assert_eq!(active[1].name, "bob");
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let registry = Arc::new(PublisherRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let keep = PublishKey::new("demo", format!("keep_{i}"));
                    let drop = PublishKey::new("demo", format!("drop_{i}"));
                    assert!(registry.add(keep));
                    assert!(registry.add(drop.clone()));
                    assert!(registry.remove(&drop));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Net result: only the kept keys remain
        assert_eq!(registry.len(), 8);
        for i in 0..8 {
            assert!(registry.contains(&PublishKey::new("demo", format!("keep_{i}"))));
            assert!(!registry.contains(&PublishKey::new("demo", format!("drop_{i}"))));
        }
    }
}
