//! Asset-pack manifest builder.
//!
//! Scans raw meme repositories for image and video files, groups them
//! into packs, content-hashes each file, copies the assets into the
//! output tree, and emits a pack manifest plus a keyword map:
//!
//! ```text
//! <out-dir>/
//! ├── assets/<pack>/<file>   # copied asset files
//! ├── infos.json             # pack manifest with per-item metadata
//! └── keyMap.json            # keyword -> sorted item ids
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{info, warn};

/// File extensions collected from source repositories.
const IMAGE_EXTS: [&str; 9] = [
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tiff", "tif",
];
const VIDEO_EXTS: [&str; 3] = ["mp4", "webm", "mov"];

/// Directory names never descended into.
const SKIP_DIRS: [&str; 6] = [
    ".git",
    "node_modules",
    "dist",
    "build",
    ".next",
    "__pycache__",
];

/// One collected asset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackItem {
    /// `<pack>/<slugified file stem>`
    pub id: String,
    pub pack: String,
    pub repo: String,
    pub filename: String,
    pub rel_path: String,
    pub ext: String,
    pub size: u64,
    pub sha256: String,
    pub keywords: Vec<String>,
}

/// A group of assets sharing a pack key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub key: String,
    pub name: String,
    pub repo: String,
    pub count: usize,
    pub items: Vec<PackItem>,
}

/// Top-level manifest written to `<out>/infos.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub generated_at: DateTime<Utc>,
    pub total_packs: usize,
    pub total_items: usize,
    pub packs: Vec<Pack>,
}

/// Finished manifest plus the keyword -> item-id map.
#[derive(Debug, Clone)]
pub struct PackOutput {
    pub manifest: PackManifest,
    pub keyword_map: BTreeMap<String, Vec<String>>,
}

impl PackOutput {
    /// Write `infos.json` and `keyMap.json` under `out_dir`.
    pub async fn save(&self, out_dir: &Path) -> Result<()> {
        write_json(&out_dir.join("infos.json"), &self.manifest).await?;
        write_json(&out_dir.join("keyMap.json"), &self.keyword_map).await?;
        Ok(())
    }
}

/// Accumulates packs across source repositories, copying assets as it goes.
pub struct PackBuilder {
    out_dir: PathBuf,
    packs: Vec<Pack>,
    keyword_map: BTreeMap<String, BTreeSet<String>>,
}

impl PackBuilder {
    /// Create a builder writing assets under `<out_dir>/assets`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            packs: Vec::new(),
            keyword_map: BTreeMap::new(),
        }
    }

    /// The directory asset copies land in.
    pub fn assets_dir(&self) -> PathBuf {
        self.out_dir.join("assets")
    }

    /// Scan one source repository and fold its packs into the builder.
    pub async fn add_repo(&mut self, root: &Path) -> Result<()> {
        let repo = repo_label(root);
        let files = find_files(root).await?;

        let mut by_pack: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for file in files {
            let rel = file.strip_prefix(root).unwrap_or(&file).to_path_buf();
            by_pack.entry(pack_key_for(&rel)).or_default().push(file);
        }

        for (pack_key, pack_files) in by_pack {
            let mut items = Vec::with_capacity(pack_files.len());

            for src in &pack_files {
                let item = self.collect_item(root, src, &pack_key, &repo).await?;

                for keyword in &item.keywords {
                    self.keyword_map
                        .entry(keyword.clone())
                        .or_default()
                        .insert(item.id.clone());
                }

                items.push(item);
            }

            self.packs.push(Pack {
                name: display_name(&pack_key),
                key: pack_key,
                repo: repo.clone(),
                count: items.len(),
                items,
            });
        }

        Ok(())
    }

    async fn collect_item(
        &self,
        root: &Path,
        src: &Path,
        pack_key: &str,
        repo: &str,
    ) -> Result<PackItem> {
        let rel = src.strip_prefix(root).unwrap_or(src);
        let stem = src.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let filename = src
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let ext = src
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        let metadata = fs::metadata(src)
            .await
            .with_context(|| format!("Failed to stat {}", src.display()))?;
        let sha256 = sha256_file(src)
            .await
            .with_context(|| format!("Failed to hash {}", src.display()))?;

        // Stem tokens first, then pack tokens, first occurrence wins
        let mut keywords = tokenize_keywords(stem);
        for token in tokenize_keywords(pack_key) {
            if !keywords.contains(&token) {
                keywords.push(token);
            }
        }

        let dst = self.assets_dir().join(pack_key).join(&filename);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).await?;
        }
        if !dst.exists() {
            fs::copy(src, &dst)
                .await
                .with_context(|| format!("Failed to copy asset to {}", dst.display()))?;
        }

        Ok(PackItem {
            id: format!("{}/{}", pack_key, slugify(stem)),
            pack: pack_key.to_string(),
            repo: repo.to_string(),
            filename,
            rel_path: rel.to_string_lossy().replace('\\', "/"),
            ext,
            size: metadata.len(),
            sha256,
            keywords,
        })
    }

    /// Sort packs, compute totals, and stamp the manifest.
    pub fn finish(self) -> PackOutput {
        let Self {
            mut packs,
            keyword_map,
            ..
        } = self;

        packs.sort_by(|a, b| (&a.repo, &a.key).cmp(&(&b.repo, &b.key)));
        let total_items = packs.iter().map(|p| p.count).sum();

        let manifest = PackManifest {
            generated_at: Utc::now(),
            total_packs: packs.len(),
            total_items,
            packs,
        };

        let keyword_map = keyword_map
            .into_iter()
            .map(|(keyword, ids)| (keyword, ids.into_iter().collect()))
            .collect();

        PackOutput {
            manifest,
            keyword_map,
        }
    }
}

/// Aggregate all source repositories into one manifest.
///
/// Missing roots are skipped with a warning, like the core pass.
pub async fn build_packs(sources: &[PathBuf], out_dir: &Path) -> Result<PackOutput> {
    let mut builder = PackBuilder::new(out_dir);

    for root in sources {
        if !root.exists() {
            warn!("Skip missing source: {}", root.display());
            continue;
        }
        info!("Scanning {}", root.display());
        builder.add_repo(root).await?;
    }

    Ok(builder.finish())
}

/// SHA256 over a file's full content, as a lowercase hex digest.
pub async fn sha256_file(path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Lowercase, collapse non-alphanumeric runs into single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Split a name into lowercase keyword tokens, deduplicated in order.
pub fn tokenize_keywords(name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for part in name
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | '.'))
    {
        if !part.is_empty() && !tokens.iter().any(|t| t == part) {
            tokens.push(part.to_string());
        }
    }

    tokens
}

fn allowed_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| IMAGE_EXTS.contains(&e.as_str()) || VIDEO_EXTS.contains(&e.as_str()))
}

/// Short repo labels for the known upstream repositories.
fn repo_label(root: &Path) -> String {
    match root.file_name().and_then(|n| n.to_str()) {
        Some("meme_emoji") => "emoji".to_string(),
        Some("meme-generator-contrib") => "contrib".to_string(),
        Some("meme-generator") => "main".to_string(),
        Some(other) => other.to_string(),
        None => root.display().to_string(),
    }
}

/// Derive the pack key from a path relative to the repo root.
///
/// Known layouts:
/// - `emoji/<pack>/...` and `memes/<pack>/...` use the second component
/// - `meme_generator/memes/<pack>/...` uses the third
/// - any other nested path uses its first component
/// - a top-level file falls back to its stem
fn pack_key_for(rel: &Path) -> String {
    let parts: Vec<&str> = rel.iter().filter_map(|p| p.to_str()).collect();

    if parts.len() >= 3 && (parts[0] == "emoji" || parts[0] == "memes") {
        parts[1].to_string()
    } else if parts.len() >= 4 && parts[0] == "meme_generator" && parts[1] == "memes" {
        parts[2].to_string()
    } else if parts.len() >= 2 {
        parts[0].to_string()
    } else {
        rel.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Title-case a pack key for display ("cat_memes" -> "Cat Memes").
fn display_name(pack_key: &str) -> String {
    pack_key
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Recursively collect allowed asset files, pruning skip directories.
async fn find_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to list directory: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if entry.file_type().await?.is_dir() {
                let skip = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIP_DIRS.contains(&n));
                if !skip {
                    pending.push(path);
                }
            } else if allowed_ext(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

async fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(data)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
