//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage used for learned tables.

use std::path::Path;

use crate::{Result, q_learning::SavedQTable};

/// Port for persisting and loading Q-table snapshots.
///
/// # Examples
///
/// ```no_run
/// use planewar::ports::QTableRepository;
/// use planewar::q_learning::{QTable, SavedQTable, TrainingMetadata};
/// use std::path::Path;
///
/// fn checkpoint<R: QTableRepository>(repo: &R, table: &QTable, path: &Path) -> planewar::Result<()> {
///     repo.save(&SavedQTable::from_q_table(table, TrainingMetadata::default()), path)
/// }
/// ```
pub trait QTableRepository {
    /// Save a snapshot, replacing whatever is stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the destination cannot be written.
    fn save(&self, snapshot: &SavedQTable, path: &Path) -> Result<()>;

    /// Load the snapshot stored at `path`.
    ///
    /// Returns `Ok(None)` when nothing is stored there.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CorruptState`] when something is stored but
    /// cannot be read or decoded.
    fn load(&self, path: &Path) -> Result<Option<SavedQTable>>;
}
