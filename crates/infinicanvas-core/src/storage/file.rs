//! Snapshots as JSON files in a directory.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode_snapshot, encode_snapshot};
use crate::scene::Scene;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One `<key>.json` file per snapshot.
///
/// A save writes a sibling temporary file and renames it over the target, so an interrupted
/// save leaves the previous snapshot intact.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self { dir })
    }

    /// The platform's local data directory, e.g. `~/.local/share/infinicanvas/scenes` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Unavailable("no data or home directory".to_string()))?;
        Self::new(base.join("infinicanvas").join("scenes"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the snapshot for `key`. Anything but ASCII letters, digits, `-` and `_`
    /// becomes `_`, so keys cannot leave the directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if name.is_empty() {
            name.push('_');
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl Storage for FileStorage {
    fn save(&self, key: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>> {
        let target = self.path_for(key);
        let text = encode_snapshot(scene);
        Box::pin(async move {
            let partial = target.with_extension("json.partial");
            fs::write(&partial, text?).map_err(io_error(&partial))?;
            fs::rename(&partial, &target).map_err(io_error(&target))?;
            log::info!("Saved scene snapshot to {}", target.display());
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Scene>>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::read_to_string(&path) {
                Ok(text) => decode_snapshot(&text).map(Some),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(io_error(&path)(err)),
            }
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(err) if err.kind() != ErrorKind::NotFound => Err(io_error(&path)(err)),
                _ => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementDraft;
    use crate::scene::SceneStore;
    use pollster::block_on;
    use tempfile::tempdir;

    fn sample_store() -> SceneStore {
        let mut store = SceneStore::new();
        store.add_element(ElementDraft::rectangle(5.0, 5.0, 60.0, 30.0));
        store.add_element(ElementDraft::rectangle(100.0, 5.0, 60.0, 30.0));
        store
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let store = sample_store();

        block_on(storage.save("working", store.scene())).unwrap();
        let loaded = block_on(storage.load("working")).unwrap().unwrap();
        assert_eq!(loaded, store.scene().snapshot());
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        assert!(storage.dir().is_dir());
        assert!(block_on(storage.load("never-saved")).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(storage.path_for("broken"), "{ nope").unwrap();
        assert!(matches!(
            block_on(storage.load("broken")),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut store = sample_store();
        block_on(storage.save("working", store.scene())).unwrap();
        store.delete_selected();
        block_on(storage.save("working", store.scene())).unwrap();

        let loaded = block_on(storage.load("working")).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_keys_stay_inside_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.path_for("../escape:me"), dir.path().join("___escape_me.json"));
        assert_eq!(storage.path_for(""), dir.path().join("_.json"));
        block_on(storage.save("../escape:me", sample_store().scene())).unwrap();
        assert!(block_on(storage.load("../escape:me")).unwrap().is_some());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        block_on(storage.save("working", sample_store().scene())).unwrap();

        block_on(storage.remove("working")).unwrap();
        block_on(storage.remove("working")).unwrap();
        assert!(block_on(storage.load("working")).unwrap().is_none());
    }
}
