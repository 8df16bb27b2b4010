//! memedex - meme metadata index generator
//!
//! A build-time tool that aggregates per-meme `info.json` files scattered
//! across several source repositories into two flat JSON lookup files:
//! `infos.json` (key -> full record) and `keyMap.json` (keyword -> key).
//! A lookup/search front-end loads these at runtime instead of scanning
//! the source trees.
//!
//! # Modules
//!
//! - `aggregate`: the sequential scan that builds both indexes
//! - `index`: record and index data model, on-disk form
//! - `packs`: asset pack manifest builder for raw meme repositories
//! - `config`: config-file/env/default path resolution
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build infos.json and keyMap.json from the configured sources
//! memedex generate
//!
//! # Resolve a keyword against the generated indexes
//! memedex lookup petpet
//!
//! # Build an asset pack manifest
//! memedex packs --src meme_emoji --out-dir dist
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod index;
pub mod packs;

// Re-export main types at crate root for convenience
pub use aggregate::{Aggregator, ScanError, ScanOutcome, ScanReport};
pub use index::{IndexPaths, MemeIndex, MemeInfo};
pub use packs::{Pack, PackBuilder, PackItem, PackManifest, PackOutput};
