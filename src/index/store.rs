//! The two lookup indexes and their on-disk form.
//!
//! Both indexes are rebuilt from scratch on every run and written out
//! whole; nothing is ever merged with pre-existing file content.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use super::entry::MemeInfo;

/// File name of the key -> full record index.
pub const INFO_INDEX_FILE: &str = "infos.json";

/// File name of the keyword -> key index.
pub const KEY_MAP_FILE: &str = "keyMap.json";

/// Filesystem locations of the two generated index files.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub infos: PathBuf,
    pub key_map: PathBuf,
}

impl IndexPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            infos: dir.join(INFO_INDEX_FILE),
            key_map: dir.join(KEY_MAP_FILE),
        }
    }
}

/// In-memory form of both indexes.
///
/// `infos` maps a canonical key to its full record; `key_map` maps each
/// declared keyword to a canonical key. Collisions are resolved by
/// insertion order: the last record processed wins, silently.
#[derive(Debug, Clone, Default)]
pub struct MemeIndex {
    infos: BTreeMap<String, MemeInfo>,
    key_map: BTreeMap<String, String>,
}

impl MemeIndex {
    /// Create an empty index pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, overwriting any previous record with the same key
    /// and remapping any of its keywords that were already taken.
    pub fn insert(&mut self, info: MemeInfo) {
        let key = info.key().to_string();

        for keyword in info.keywords() {
            self.key_map.insert(keyword.to_string(), key.clone());
        }

        self.infos.insert(key, info);
    }

    /// Get a record by its canonical key.
    pub fn get(&self, key: &str) -> Option<&MemeInfo> {
        self.infos.get(key)
    }

    /// Resolve the canonical key a keyword points at.
    pub fn keyword_target(&self, keyword: &str) -> Option<&str> {
        self.key_map.get(keyword).map(String::as_str)
    }

    /// Resolve a query as a key first, then as a keyword.
    pub fn resolve(&self, query: &str) -> Option<&MemeInfo> {
        self.get(query)
            .or_else(|| self.keyword_target(query).and_then(|key| self.get(key)))
    }

    /// Number of records in the info index.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether the info index holds no records.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Write both indexes as pretty-printed JSON, overwriting any prior
    /// content at `paths`.
    pub async fn save(&self, paths: &IndexPaths) -> Result<()> {
        write_pretty(&paths.infos, &self.infos).await?;
        write_pretty(&paths.key_map, &self.key_map).await?;
        Ok(())
    }

    /// Read both indexes back from disk.
    pub async fn load(paths: &IndexPaths) -> Result<Self> {
        let infos = read_pretty(&paths.infos).await?;
        let key_map = read_pretty(&paths.key_map).await?;
        Ok(Self { infos, key_map })
    }
}

async fn write_pretty<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let content = serde_json::to_string_pretty(data)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write index: {}", path.display()))?;

    Ok(())
}

async fn read_pretty<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read index: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse index: {}", path.display()))
}
