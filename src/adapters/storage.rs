use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Files under a data directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Option<String>> {
        let full_path = self.base_path.join(path);
        match fs::read_to_string(&full_path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, path: &str, data: &str) -> Result<()> {
        let full_path = self.base_path.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file, then rename over the target.
        let temp_path = self.base_path.join(format!("{}.tmp", path));
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &full_path)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.base_path.join(path).try_exists()?)
    }

    fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }
}

/// In-process storage. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_file(&self, path: &str) -> Option<String> {
        self.files().get(path).cloned()
    }

    pub fn put_file(&self, path: &str, data: &str) {
        self.files().insert(path.to_string(), data.to_string());
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self, path: &str) -> Result<Option<String>> {
        Ok(self.get_file(path))
    }

    fn write_file(&self, path: &str, data: &str) -> Result<()> {
        self.put_file(path, data);
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files().contains_key(path))
    }
}
