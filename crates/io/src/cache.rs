//! Named-item persistence under one cache directory.
//!
//! Each item is one JSON file, `<dir>/<item>.json`. Callers pick which items
//! they persist; the store knows nothing about their shape.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::IoError;

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn item_path(&self, item: &str) -> PathBuf {
        self.dir.join(format!("{item}.json"))
    }

    /// Write one item, replacing any previous copy.
    pub fn save<T: Serialize>(&self, item: &str, value: &T) -> Result<(), IoError> {
        fs::create_dir_all(&self.dir).map_err(|e| IoError::cache(item, e.to_string()))?;
        let json = serde_json::to_string(value).map_err(|e| IoError::cache(item, e.to_string()))?;

        let path = self.item_path(item);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| IoError::cache(item, e.to_string()))?;
        fs::rename(&tmp_path, &path).map_err(|e| IoError::cache(item, e.to_string()))
    }

    pub fn load<T: DeserializeOwned>(&self, item: &str) -> Result<T, IoError> {
        let path = self.item_path(item);
        let json = fs::read_to_string(&path).map_err(|e| IoError::cache(item, e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| IoError::cache(item, e.to_string()))
    }

    /// Delete items. Missing items are not an error.
    pub fn remove(&self, items: &[&str]) -> Result<(), IoError> {
        for item in items {
            match fs::remove_file(self.item_path(item)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(IoError::cache(item, e.to_string())),
            }
        }
        Ok(())
    }
}
