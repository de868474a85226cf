use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{config::OffloadConfig, ports::ConfigStore};

/// Live-reloadable offload configuration.
///
/// Wraps [`OffloadConfig`] in an `ArcSwap`: readers take a whole snapshot
/// without blocking and a reload swaps the pointer in one store, so an
/// in-flight offload never sees old and new values mixed.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<ArcSwap<OffloadConfig>>,
}

impl ConfigHandle {
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current snapshot. Hold on to it for the whole message.
    pub fn snapshot(&self) -> Arc<OffloadConfig> {
        self.inner.load_full()
    }

    /// Re-read the declared keys from `store` and swap the snapshot.
    pub fn reload(&self, store: &dyn ConfigStore) -> Arc<OffloadConfig> {
        let fresh = Arc::new(OffloadConfig::from_store(store));
        fresh.log_summary();
        self.inner.store(Arc::clone(&fresh));
        tracing::debug!("largetextpaste config swapped");
        fresh
    }

    /// Swap in an already-built config.
    pub fn store(&self, config: OffloadConfig) {
        self.inner.store(Arc::new(config));
    }
}

impl std::fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("current", &*self.inner.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyValueStore;

    #[test]
    fn reload_replaces_whole_snapshot() {
        let handle = ConfigHandle::new(OffloadConfig::default());
        let before = handle.snapshot();

        let store = KeyValueStore::from_pairs([("cutofflen", "10"), ("apikey", "k2")]);
        let after = handle.reload(&store);

        assert_eq!(before.cutoff_length, 300);
        assert!(before.api_key.is_empty());
        assert_eq!(after.cutoff_length, 10);
        assert_eq!(handle.snapshot().api_key, "k2");
    }

    #[test]
    fn reload_resets_unset_keys_to_defaults() {
        let handle = ConfigHandle::new(OffloadConfig {
            snippet_length: 5,
            ..OffloadConfig::default()
        });
        handle.reload(&KeyValueStore::default());
        assert_eq!(handle.snapshot().snippet_length, 60);
    }
}
