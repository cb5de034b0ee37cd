//! Persistence: an opaque key-value store plus the codecs layered on it.
//!
//! The engine reads and writes whole values only. The habit collection,
//! the settings record and the undo slot each live under one key.

mod config;
pub mod database;
pub mod repository;
mod settings;

pub use config::Config;
pub use database::Database;
pub use settings::Settings;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Read-all / write-all key-value storage.
pub trait KvStore {
    /// Value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Apply several writes (`Some`) and removals (`None`) together.
    ///
    /// Stores that support transactions override this so either every change
    /// lands or none does.
    fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        for (key, value) in changes {
            match value {
                Some(v) => self.write(key, v)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        (**self).apply(changes)
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one raw entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Raw value, bypassing decoding.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KvStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `HABITKIT_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/habitkit/`, or `~/.config/habitkit-dev/` when `HABITKIT_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITKIT_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitkit-dev")
            } else {
                base_dir.join("habitkit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
