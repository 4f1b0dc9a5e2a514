//! Persisted snapshot format for Q-tables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    q_table::{ActionValues, QTable},
    state::State,
};
use crate::{Error, Result};

/// Bookkeeping stored next to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Episodes trained across every session that wrote this file
    pub episodes_trained: usize,
    /// Ticks trained across every session that wrote this file
    pub ticks_trained: u64,
    /// Random seed of the last session (if any)
    pub seed: Option<u64>,
    /// Exploration rate when the snapshot was taken
    pub epsilon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: State,
    pub values: ActionValues,
}

/// Versioned on-disk representation of a [`QTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQTable {
    pub version: u32,
    entries: Vec<QEntry>,
    pub metadata: TrainingMetadata,
}

impl SavedQTable {
    pub const VERSION: u32 = 1;

    pub fn from_q_table(table: &QTable, metadata: TrainingMetadata) -> Self {
        let entries = table
            .sorted_entries()
            .into_iter()
            .map(|(state, values)| QEntry { state, values })
            .collect();
        Self {
            version: Self::VERSION,
            entries,
            metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the table, rejecting snapshots written by another format version.
    pub fn to_q_table(&self, path: &Path) -> Result<QTable> {
        if self.version != Self::VERSION {
            return Err(Error::CorruptState {
                path: path.to_path_buf(),
                message: format!(
                    "unsupported Q-table format version {} (expected {})",
                    self.version,
                    Self::VERSION
                ),
            });
        }

        Ok(self
            .entries
            .iter()
            .map(|entry| (entry.state, entry.values))
            .collect())
    }

    /// Encode as MessagePack.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::SerializationContext {
            operation: "serialize Q-table to MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    /// Decode MessagePack bytes read from `path`; any decode failure is corruption.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::CorruptState {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
