//! Snapshots held in memory, encoded exactly as they would be on disk.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode_snapshot, encode_snapshot};
use crate::scene::Scene;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Keeps encoded snapshot documents in a map. Useful for tests and for sessions that must
/// not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.documents().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn documents(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        self.documents
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>> {
        let entry = encode_snapshot(scene).map(|text| (key.to_string(), text));
        Box::pin(async move {
            let (key, text) = entry?;
            self.documents()?.insert(key, text);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Scene>>> {
        let key = key.to_string();
        Box::pin(async move {
            let text = self.documents()?.get(&key).cloned();
            text.as_deref().map(decode_snapshot).transpose()
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.documents()?.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementDraft;
    use crate::scene::SceneStore;
    use pollster::block_on;

    #[test]
    fn test_saved_snapshot_loads_back() {
        let storage = MemoryStorage::new();
        let mut store = SceneStore::new();
        let id = store.add_element(ElementDraft::rectangle(0.0, 0.0, 40.0, 40.0));
        store.set_highlighted(id, true);

        block_on(storage.save("scene", store.scene())).unwrap();
        let loaded = block_on(storage.load("scene")).unwrap().unwrap();
        assert_eq!(loaded, store.scene().snapshot());
        assert!(!loaded.elements()[0].is_highlighted);
    }

    #[test]
    fn test_missing_key_is_absent() {
        let storage = MemoryStorage::new();
        assert!(block_on(storage.load("missing")).unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_and_remove_forgets() {
        let storage = MemoryStorage::new();
        let mut store = SceneStore::new();
        block_on(storage.save("draft", store.scene())).unwrap();
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 40.0, 40.0));
        block_on(storage.save("draft", store.scene())).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(block_on(storage.load("draft")).unwrap().unwrap().len(), 1);

        block_on(storage.remove("draft")).unwrap();
        block_on(storage.remove("draft")).unwrap();
        assert!(storage.is_empty());
    }
}
