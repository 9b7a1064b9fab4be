//! File-based storage backend.
//!
//! One file per key inside a root directory. This is the closest native
//! analogue to browser-local storage: a small per-application key-value
//! area that survives restarts and is private to one machine.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{StorageBackend, StoreError};

/// Stores each key as a file under a root directory.
///
/// Writes go through a temporary file followed by a rename, so a crash
/// mid-write leaves either the old value or the new one, never a torn
/// record.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`. The directory is created on
    /// first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a key to its file path, rejecting anything that could escape
    /// the root directory.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key.contains("..")
            || Path::new(key).is_absolute()
        {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(key))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
