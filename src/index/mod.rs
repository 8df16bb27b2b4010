//! Index data model: per-meme records and the generated lookup files.
//!
//! # Output Layout
//!
//! ```text
//! <out-dir>/
//! ├── infos.json     # key -> full metadata record
//! └── keyMap.json    # keyword -> key
//! ```
//!
//! Both files are flat JSON objects, rebuilt whole on every run so the
//! front-end can load them without scanning the source trees.

pub mod entry;
pub mod store;

pub use entry::{MemeInfo, INFO_FILE};
pub use store::{IndexPaths, MemeIndex, INFO_INDEX_FILE, KEY_MAP_FILE};
