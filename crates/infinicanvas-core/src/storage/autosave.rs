//! Autosave of the working scene.
//!
//! The manager is polled by the host loop; it writes a snapshot when the scene changed and
//! the interval has elapsed since the last write.

use crate::scene::{Scene, SceneStore};
use crate::storage::{FileStorage, Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key the working scene is stored under.
pub const LAST_SCENE_KEY: &str = "__last_scene__";

/// Default autosave interval.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(2);

/// Periodically persists the scene to a storage backend.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    key: String,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    /// Store revision captured by the last save.
    saved_revision: Option<u64>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: LAST_SCENE_KEY.to_string(),
            interval: DEFAULT_AUTOSAVE_INTERVAL,
            last_save: None,
            dirty: false,
            saved_revision: None,
        }
    }

    /// Store the scene under `key` instead of [`LAST_SCENE_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty and the interval has elapsed (or nothing was saved yet).
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save the store's scene if it changed since the last save and the interval elapsed.
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, store: &SceneStore) -> StorageResult<bool> {
        if self.saved_revision != Some(store.revision()) {
            self.dirty = true;
        }
        if !self.should_save() {
            return Ok(false);
        }
        self.save(store).await?;
        Ok(true)
    }

    /// Save the store's scene now and remember its revision.
    pub async fn save(&mut self, store: &SceneStore) -> StorageResult<()> {
        let scene = store.scene();
        self.storage.save(&self.key, scene).await?;
        log::debug!("Autosaved {} element(s) to {}", scene.len(), self.key);
        self.last_save = Some(Instant::now());
        self.saved_revision = Some(store.revision());
        self.dirty = false;
        Ok(())
    }

    /// Load the previously autosaved scene, if any. An unreadable autosave is logged and
    /// treated as absent.
    pub async fn load_last(&mut self) -> Option<Scene> {
        match self.storage.load(&self.key).await {
            Ok(Some(scene)) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(scene)
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("Ignoring autosave {}: {}", self.key, err);
                None
            }
        }
    }

    /// Remove the autosaved scene.
    pub async fn discard(&mut self) -> StorageResult<()> {
        self.dirty = false;
        self.saved_revision = None;
        self.storage.remove(&self.key).await
    }
}

/// Storage in the platform's local data directory.
pub fn create_default_storage() -> StorageResult<Arc<FileStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementDraft;
    use crate::storage::MemoryStorage;
    use pollster::block_on;

    #[test]
    fn test_autosave_manager_creation() {
        let manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
        assert_eq!(manager.key(), LAST_SCENE_KEY);
    }

    #[test]
    fn test_maybe_save_tracks_revisions() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_interval(Duration::ZERO);
        let mut store = SceneStore::new();

        assert!(block_on(manager.maybe_save(&store)).unwrap());
        assert!(!block_on(manager.maybe_save(&store)).unwrap());

        store.add_element(ElementDraft::rectangle(0.0, 0.0, 30.0, 30.0));
        assert!(block_on(manager.maybe_save(&store)).unwrap());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_explicit_save_counts_as_saved() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_interval(Duration::ZERO);
        let mut store = SceneStore::new();
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 30.0, 30.0));

        block_on(manager.save(&store)).unwrap();
        assert!(!block_on(manager.maybe_save(&store)).unwrap());

        store.move_selected(5.0, 0.0);
        assert!(block_on(manager.maybe_save(&store)).unwrap());
    }

    #[test]
    fn test_interval_throttles_saves() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_interval(Duration::from_secs(3600));
        let mut store = SceneStore::new();

        assert!(block_on(manager.maybe_save(&store)).unwrap());
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 30.0, 30.0));
        assert!(!block_on(manager.maybe_save(&store)).unwrap());
        assert!(manager.is_dirty());
    }

    #[test]
    fn test_autosave_load_last() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let mut store = SceneStore::new();
        store.add_element(ElementDraft::rectangle(0.0, 0.0, 30.0, 30.0));
        store.set_dragging(true);
        block_on(manager.save(&store)).unwrap();

        let mut restored = AutoSaveManager::new(storage);
        let scene = block_on(restored.load_last()).unwrap();
        assert_eq!(scene.len(), 1);
        assert!(!scene.elements()[0].is_dragging);
    }

    #[test]
    fn test_discard() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone()).with_key("draft");
        block_on(manager.save(&SceneStore::new())).unwrap();
        assert_eq!(storage.len(), 1);

        block_on(manager.discard()).unwrap();
        assert!(storage.is_empty());
        assert!(block_on(manager.load_last()).is_none());
    }
}
