//! Sequential aggregation of `info.json` records into the lookup indexes.
//!
//! Source directories are visited in configured order, meme directories
//! within each source in filesystem enumeration order. At most one
//! metadata read happens per meme directory, and a later record silently
//! overwrites an earlier one on key or keyword collision.
//!
//! Missing source directories and unreadable or malformed metadata files
//! are recovered locally: logged, recorded in the report, skipped. Only
//! directory-listing failures mid-enumeration escape the scan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

use crate::index::{MemeIndex, MemeInfo, INFO_FILE};

/// A per-entry failure that was recovered during the scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Counters and recovered failures from one scan pass.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Records successfully parsed and inserted.
    pub processed: usize,

    /// Configured source directories that did not exist.
    pub missing_sources: Vec<PathBuf>,

    /// Per-entry failures that were logged and skipped.
    pub failures: Vec<ScanError>,
}

/// Result of a full scan: the populated indexes plus the report.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub index: MemeIndex,
    pub report: ScanReport,
}

/// Walks the configured source directories and builds both indexes in a
/// single sequential pass.
#[derive(Debug, Clone)]
pub struct Aggregator {
    sources: Vec<PathBuf>,
}

impl Aggregator {
    /// Create an aggregator over an ordered list of source directories.
    pub fn new(sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured source directories, in scan order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Run the aggregation pass.
    ///
    /// Both indexes start empty and are populated incrementally; nothing
    /// is written to disk here. The caller persists the outcome.
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();

        info!("Starting meme index generation");

        for source in &self.sources {
            if !source.exists() {
                warn!("Source directory not found, skipping: {}", source.display());
                outcome.report.missing_sources.push(source.clone());
                continue;
            }

            info!("Processing directory: {}", source.display());
            scan_source(source, &mut outcome).await?;
        }

        Ok(outcome)
    }
}

/// Scan the immediate subdirectories of one source directory.
async fn scan_source(source: &Path, outcome: &mut ScanOutcome) -> Result<()> {
    let mut entries = fs::read_dir(source)
        .await
        .with_context(|| format!("Failed to list directory: {}", source.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let info_path = entry.path().join(INFO_FILE);
        if !info_path.exists() {
            continue;
        }

        let meme_dir = entry.file_name().to_string_lossy().into_owned();

        let text = match fs::read_to_string(&info_path).await {
            Ok(text) => text,
            Err(err) => {
                let failure = ScanError::Unreadable {
                    path: info_path,
                    source: err,
                };
                error!("{}", failure);
                outcome.report.failures.push(failure);
                continue;
            }
        };

        let info = match MemeInfo::parse(&text, &meme_dir) {
            Ok(info) => info,
            Err(err) => {
                let failure = ScanError::Malformed {
                    path: info_path,
                    source: err,
                };
                error!("{}", failure);
                outcome.report.failures.push(failure);
                continue;
            }
        };

        info!("Processed: {}", meme_dir);
        outcome.index.insert(info);
        outcome.report.processed += 1;
    }

    Ok(())
}
