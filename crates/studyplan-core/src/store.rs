use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Storage keys, one JSON document per collection (or singleton). These
/// names are the on-disk file stems under the data directory.
pub const TASKS: &str = "tasks";
pub const CALENDAR_EVENTS: &str = "calendar-events";
pub const NOTES: &str = "notes";
pub const SUBJECTS: &str = "subjects";
pub const STREAK: &str = "streak";
pub const TIMETABLE: &str = "timetable";

/// Flat key-value store over a single data directory. Every save rewrites
/// the whole collection; there are no partial updates, no transactions and
/// no schema migration. Each collection has exactly one logical writer per
/// process, and concurrent processes race with last-write-wins.
#[derive(Debug)]
pub struct Store {
    pub data_dir: PathBuf,
}

impl Store {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .map_err(|err| anyhow!("failed to create {}: {err}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened store");
        Ok(Self { data_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    /// Loads a collection, falling back to the seed when the file is
    /// missing, unreadable or does not parse. Parse failure is logged but
    /// never surfaced; the stored value is simply replaced on the next
    /// save.
    #[tracing::instrument(skip(self, seed))]
    pub fn load<T, F>(&self, key: &str, seed: F) -> Vec<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        self.load_value(key, seed)
    }

    /// Like `load`, but writes the seed back when nothing usable was
    /// stored, so seeded record ids stay stable across invocations.
    #[tracing::instrument(skip(self, seed))]
    pub fn load_or_init<T, F>(&self, key: &str, seed: F) -> anyhow::Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match self.load_stored(key) {
            Some(items) => Ok(items),
            None => {
                let items = seed();
                self.save(key, &items)?;
                Ok(items)
            }
        }
    }

    /// `load_or_init` for singletons (the streak record).
    pub fn load_value_or_init<T, F>(&self, key: &str, seed: F) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.load_stored(key) {
            Some(value) => Ok(value),
            None => {
                let value = seed();
                self.save_value(key, &value)?;
                Ok(value)
            }
        }
    }

    #[tracing::instrument(skip(self, items))]
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> anyhow::Result<()> {
        self.save_value(key, &items)
    }

    /// Same contract as `load`, for singletons.
    pub fn load_value<T, F>(&self, key: &str, seed: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.load_stored(key) {
            Some(value) => value,
            None => seed(),
        }
    }

    fn load_stored<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(key, "no stored value, using seed");
            return None;
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "failed reading stored value, using seed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "loaded stored value");
                Some(value)
            }
            Err(err) => {
                warn!(key, error = %err, "stored value failed to parse, using seed");
                None
            }
        }
    }

    pub fn save_value<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let path = self.path_for(key);
        debug!(key, file = %path.display(), "saving");

        let serialized = serde_json::to_string_pretty(value)?;
        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(serialized.as_bytes())?;
        writeln!(temp)?;
        temp.flush()?;
        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {err}", path.display()))?;
        Ok(())
    }
}
