//! Key-value stores backing the liveness cache, the sheet fingerprint and
//! the last rendered document.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{PostgenError, PostgenResult};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> PostgenResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> PostgenResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> PostgenResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> PostgenResult<()> {
        (**self).put(key, value)
    }
}

/// Volatile store, lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PostgenResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> PostgenResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All entries in a single JSON object file.
///
/// The file is read once on open and rewritten on every `put`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> PostgenResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                PostgenError::Serialization(format!("{}: {e}", path.display()))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(JsonFileStore { path, entries })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> PostgenResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> PostgenResult<()> {
        self.entries.insert(key.to_string(), value.to_string());

        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| PostgenError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &content)
    }
}

/// One text file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStore { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PostgenResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(PostgenError::Store(format!("Invalid store key '{key}'")));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> PostgenResult<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn put(&mut self, key: &str, value: &str) -> PostgenResult<()> {
        let path = self.key_path(key)?;
        write_atomic(&path, value)
    }
}

/// Write through a sibling temp file so readers never see a torn file.
fn write_atomic(path: &Path, content: &str) -> PostgenResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put("https://example.com/", "200").unwrap();
        store.put("https://example.com/gone", "404").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("https://example.com/").unwrap().as_deref(),
            Some("200")
        );
        assert_eq!(
            reopened.get("https://example.com/gone").unwrap().as_deref(),
            Some("404")
        );
        assert!(!dir.path().join("urls.json.tmp").exists());
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(PostgenError::Serialization(_))
        ));
    }

    #[test]
    fn test_dir_store_creates_directory_on_put() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path().join("nested"));

        assert_eq!(store.get("post.md").unwrap(), None);
        store.put("post.md", "| a | b |").unwrap();
        assert_eq!(store.get("post.md").unwrap().as_deref(), Some("| a | b |"));
    }

    #[test]
    fn test_dir_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path());

        assert!(store.put("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
