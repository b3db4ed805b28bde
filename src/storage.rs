//! Named JSON persistence slots, one file per slot.
//!
//! This stands in for the key/value store the board lives in: every slot is
//! a key holding one JSON-serialized value under the data directory. A
//! missing slot reads as `None`; a malformed slot is logged and also reads
//! as `None`, so callers degrade to their default instead of failing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Slot holding the ordered task collection.
pub const TASKS_SLOT: &str = "taskboard:v1";
/// Slot holding the registered users.
pub const USERS_SLOT: &str = "users";
/// Slot holding the current session user, absent when logged out.
pub const SESSION_SLOT: &str = "session_user";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Opens (and creates if needed) the slot directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| Error::DataDir(root.clone(), err))?;
        Ok(Self { root })
    }

    /// Platform data directory for the board, e.g. `~/.local/share/taskboard`.
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::data_dir().ok_or(Error::NoDataDir)?.join("taskboard"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Slot keys may carry a ':' (not a legal filename everywhere).
    fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key.replace(':', ".")))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.slot_path(key).exists()
    }

    /// Reads a slot. Missing and malformed slots both yield `None`; the
    /// malformed case is logged, never propagated.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.slot_path(key);
        if !path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, %err, "failed to read slot, falling back to default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, %err, "malformed slot, falling back to default");
                None
            }
        }
    }

    /// Serializes the whole value into the slot via a temp file and rename,
    /// so a crash never leaves a half-written slot behind.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Removes a slot; clearing an absent slot is a no-op.
    pub fn clear(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
