//! Persistence of scene snapshots.
//!
//! A backend keeps one snapshot per key. Snapshots never carry transient interaction flags,
//! and loading a key that was never saved yields `None` rather than an error. Every backend
//! stores the same versioned JSON document, produced by [`encode_snapshot`].

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL, LAST_SCENE_KEY, create_default_storage};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Snapshot document version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Snapshot version {0} is newer than this build supports")]
    UnsupportedVersion(u32),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by storage backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where scene snapshots are kept.
pub trait Storage: Send + Sync {
    /// Store a snapshot of `scene` under `key`, replacing any previous one.
    fn save(&self, key: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<()>>;

    /// The snapshot under `key`, repaired into a valid scene, or `None` if there is none.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Scene>>>;

    /// Forget the snapshot under `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    scene: &'a Scene,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    scene: Scene,
}

/// Encode `scene` as a snapshot document, dropping transient flags.
pub fn encode_snapshot(scene: &Scene) -> StorageResult<String> {
    let scene = scene.snapshot();
    let document = SnapshotOut {
        version: SNAPSHOT_VERSION,
        scene: &scene,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Decode a snapshot document. The scene is sanitized, since the text may have been edited
/// or written by another build.
pub fn decode_snapshot(text: &str) -> StorageResult<Scene> {
    let document: SnapshotIn = serde_json::from_str(text)?;
    if document.version > SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion(document.version));
    }
    Ok(document.scene.sanitized())
}
