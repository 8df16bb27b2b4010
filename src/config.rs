//! Configuration for memedex paths.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MEMEDEX_OUT_DIR)
//! 2. Config file (.memedex/config.yaml)
//! 3. Defaults (the fixed source list, outputs in the working directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .memedex/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::index::IndexPaths;

/// The fixed candidate source directories, in scan order. Later
/// directories overwrite earlier ones on key collisions.
pub const DEFAULT_SOURCES: [&str; 4] = [
    "meme-generator/memes",
    "meme-generator/core/memes",
    "meme-generator-contrib/memes",
    "meme_emoji/emoji",
];

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    /// Source directories to scan, in order (relative to config file)
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory the index files are written to (relative to config file)
    pub dir: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Source directories in scan order
    pub sources: Vec<PathBuf>,
    /// Directory the generated index files land in
    pub out_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Locations of the two generated index files.
    pub fn index_paths(&self) -> IndexPaths {
        IndexPaths::in_dir(&self.out_dir)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".memedex").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn default_sources() -> Vec<PathBuf> {
    DEFAULT_SOURCES.iter().map(PathBuf::from).collect()
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let (sources, out_dir) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .memedex/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent() // .memedex/
            .and_then(|p| p.parent()) // project root
            .unwrap_or(Path::new("."));

        let sources = match &config.sources {
            Some(listed) => listed.iter().map(|s| resolve_path(base_dir, s)).collect(),
            None => default_sources(),
        };

        let out_dir = if let Ok(env_dir) = std::env::var("MEMEDEX_OUT_DIR") {
            PathBuf::from(env_dir)
        } else if let Some(dir) = config.output.as_ref().and_then(|o| o.dir.as_deref()) {
            resolve_path(base_dir, dir)
        } else {
            PathBuf::from(".")
        };

        (sources, out_dir)
    } else {
        // No config file - use env vars or defaults
        let out_dir = std::env::var("MEMEDEX_OUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        (default_sources(), out_dir)
    };

    Ok(ResolvedConfig {
        sources,
        out_dir,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
