// Durable key-value slots holding serialized task lists

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence port: one whole value per key, read in full and overwritten in full
pub trait Slot {
    /// Read the value stored under `key`, or `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory slot, used by tests and embedders that don't need durability
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-seeded with a value, as if written by an earlier run
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut slot = Self::new();
        slot.values.insert(key.to_string(), value.to_string());
        slot
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of writes performed since creation
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// File-backed slot: each key is a `{key}.json` file in the store directory
#[derive(Debug, Clone)]
pub struct FileSlot {
    base_path: PathBuf,
}

impl FileSlot {
    /// Open a slot directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(eyre!("Slot key cannot be empty"));
        }
        if key.len() > 64 {
            return Err(eyre!("Slot key too long: {} (max 64 chars)", key));
        }
        if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(eyre!("Invalid slot key: {} (must be alphanumeric with _/-)", key));
        }
        Ok(())
    }
}

impl Slot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Self::validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read slot file {:?}", path))?;
        Ok(Some(content))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;
        let path = self.path_for(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(format!("{}.lock", key)))
            .context("Failed to open slot lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = File::create(&tmp_path).context("Failed to create temporary slot file")?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?; // Ensure data is flushed to disk
        fs::rename(&tmp_path, &path).context("Failed to replace slot file")?;

        debug!(file = ?path, bytes = value.len(), "Wrote slot");

        // Lock is released when `lock` is dropped
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_slot_read_write() {
        let mut slot = MemorySlot::new();
        assert_eq!(slot.read("todos").unwrap(), None);

        slot.write("todos", "[]").unwrap();
        slot.write("todos", "[1]").unwrap();
        assert_eq!(slot.read("todos").unwrap().as_deref(), Some("[1]"));
        assert_eq!(slot.get("todos"), Some("[1]"));
        assert_eq!(slot.writes(), 2);
    }

    #[test]
    fn test_file_slot_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("store");

        let slot = FileSlot::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(slot.base_path(), dir.as_path());
    }

    #[test]
    fn test_file_slot_missing_key() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::open(temp.path()).unwrap();

        assert_eq!(slot.read("todos").unwrap(), None);
    }

    #[test]
    fn test_file_slot_overwrites_wholesale() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path()).unwrap();

        slot.write("todos", r#"[{"id":1}]"#).unwrap();
        slot.write("todos", "[]").unwrap();

        assert_eq!(slot.read("todos").unwrap().as_deref(), Some("[]"));
        assert_eq!(fs::read_to_string(temp.path().join("todos.json")).unwrap(), "[]");
        assert!(!temp.path().join("todos.json.tmp").exists());
    }

    #[test]
    fn test_file_slot_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut slot = FileSlot::open(temp.path()).unwrap();
            slot.write("todos", "[]").unwrap();
        }
        let slot = FileSlot::open(temp.path()).unwrap();
        assert_eq!(slot.read("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_slot_rejects_bad_keys() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path()).unwrap();

        assert!(slot.write("", "[]").is_err());
        assert!(slot.write("../escape", "[]").is_err());
        assert!(slot.read(&"a".repeat(65)).is_err());
        assert!(FileSlot::validate_key("my-todos_2").is_ok());
    }
}
