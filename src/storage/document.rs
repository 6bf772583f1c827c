//! Single-document JSON persistence
//!
//! Every store in this crate is one pretty-printed UTF-8 JSON file that is
//! read whole, mutated in memory and written whole. `JsonDocument` owns the
//! file path and a write lock so that at most one read-modify-write cycle is
//! in flight per document. Writes go to a sibling `.tmp` file which is
//! renamed over the target, so readers only ever observe a complete
//! document.

use crate::storage::error::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A JSON file holding one value of type `T`
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the scratch file used for atomic rewrites
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the document. `Ok(None)` means the file does not exist yet.
    pub fn read(&self) -> StorageResult<Option<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Create the document with `init()` unless it already exists.
    ///
    /// Returns `true` if a new file was written.
    pub fn initialize(&self, init: impl FnOnce() -> T) -> StorageResult<bool> {
        let _guard = self.lock()?;
        if self.exists() {
            return Ok(false);
        }
        self.write_unlocked(&init())?;
        Ok(true)
    }

    /// Overwrite the whole document
    pub fn replace(&self, value: &T) -> StorageResult<()> {
        let _guard = self.lock()?;
        self.write_unlocked(value)
    }

    /// Overwrite the document only if `pred` accepts its current value
    /// (`None` when the file is missing). Returns `true` if written.
    pub fn replace_if(
        &self,
        pred: impl FnOnce(Option<&T>) -> bool,
        value: &T,
    ) -> StorageResult<bool> {
        let _guard = self.lock()?;
        let current = self.read()?;
        if !pred(current.as_ref()) {
            return Ok(false);
        }
        self.write_unlocked(value)?;
        Ok(true)
    }

    /// Read-modify-write under the document lock.
    ///
    /// A missing file starts from `init()`. A file that exists but does not
    /// parse is left untouched and the error is returned.
    pub fn update<R>(
        &self,
        init: impl FnOnce() -> T,
        op: impl FnOnce(&mut T) -> R,
    ) -> StorageResult<R> {
        let _guard = self.lock()?;
        let mut value = match self.read()? {
            Some(value) => value,
            None => init(),
        };
        let result = op(&mut value);
        self.write_unlocked(&value)?;
        Ok(result)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| StorageError::Lock(format!("{:?}: {}", self.path, e)))
    }

    fn write_unlocked(&self, value: &T) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(value)?;
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
