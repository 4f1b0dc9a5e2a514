//! MessagePack implementation of the Q-table repository.
//!
//! This adapter implements the QTableRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{Result, error::Error, ports::QTableRepository, q_learning::SavedQTable};

/// MessagePack-based Q-table repository.
///
/// # Examples
///
/// ```no_run
/// use planewar::adapters::MsgPackRepository;
/// use planewar::ports::QTableRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// match repo.load(Path::new("q_table.msgpack"))? {
///     Some(saved) => println!("{} states", saved.len()),
///     None => println!("starting fresh"),
/// }
/// # Ok::<(), planewar::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

/// Replace the file at `path` with whatever `write` produces.
///
/// The content goes to a temporary file in the same directory, which is
/// synced and then renamed over `path`. A failed or interrupted write leaves
/// the previous file untouched.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
        operation: format!("create temporary file in {dir:?}"),
        source,
    })?;

    write(temp.as_file_mut()).map_err(|source| Error::Io {
        operation: format!("write {path:?}"),
        source,
    })?;
    temp.as_file().sync_all().map_err(|source| Error::Io {
        operation: format!("sync {path:?}"),
        source,
    })?;
    temp.persist(path).map_err(|e| Error::Io {
        operation: format!("replace {path:?}"),
        source: e.error,
    })?;
    Ok(())
}

impl QTableRepository for MsgPackRepository {
    fn save(&self, snapshot: &SavedQTable, path: &Path) -> Result<()> {
        let bytes = snapshot.to_bytes()?;
        replace_file(path, |file| file.write_all(&bytes))?;

        info!(path = %path.display(), states = snapshot.len(), "Q-table saved");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Option<SavedQTable>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no Q-table file");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::CorruptState {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                });
            }
        };

        let saved = SavedQTable::from_bytes(&bytes, path)?;
        info!(path = %path.display(), states = saved.len(), "Q-table loaded");
        Ok(Some(saved))
    }
}
