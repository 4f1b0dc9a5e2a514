//! In-memory Q-table repository for testing.
//!
//! This adapter keeps encoded snapshots in a shared map, enabling fast tests
//! without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::QTableRepository, q_learning::SavedQTable};

/// In-memory repository for testing.
///
/// Snapshots go through the same MessagePack encoding as the file adapter.
/// All clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use planewar::adapters::InMemoryRepository;
/// use planewar::ports::QTableRepository;
/// use planewar::q_learning::{QTable, SavedQTable, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let snapshot = SavedQTable::from_q_table(&QTable::new(), TrainingMetadata::default());
///
/// repo.save(&snapshot, Path::new("q_table"))?;
/// assert!(repo.load(Path::new("q_table"))?.is_some());
/// assert!(repo.load(Path::new("other"))?.is_none());
/// # Ok::<(), planewar::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // a poisoned map still holds valid bytes
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Check if a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    /// Store raw bytes at `path`, bypassing encoding.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage().insert(key(path), bytes);
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        self.storage().clear();
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl QTableRepository for InMemoryRepository {
    fn save(&self, snapshot: &SavedQTable, path: &Path) -> Result<()> {
        let bytes = snapshot.to_bytes()?;
        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Option<SavedQTable>> {
        match self.storage().get(&key(path)) {
            Some(bytes) => SavedQTable::from_bytes(bytes, path).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("count", &self.count())
            .finish()
    }
}
