//! A single meme metadata record read from `info.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the metadata file expected inside each meme directory.
pub const INFO_FILE: &str = "info.json";

/// One parsed metadata record.
///
/// The record is kept as a raw JSON object so that fields beyond `key`
/// and `keywords` pass through to the generated index untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemeInfo {
    record: Map<String, Value>,
}

impl MemeInfo {
    /// Parse a record from `info.json` text.
    ///
    /// A record without a usable `key` (missing, empty, or not a string)
    /// takes `fallback_key`, the name of the directory the file was read
    /// from. A top-level value that is not a JSON object is an error.
    pub fn parse(text: &str, fallback_key: &str) -> Result<Self, serde_json::Error> {
        let mut record: Map<String, Value> = serde_json::from_str(text)?;

        let has_key = record
            .get("key")
            .and_then(Value::as_str)
            .is_some_and(|k| !k.is_empty());
        if !has_key {
            record.insert("key".to_string(), Value::String(fallback_key.to_string()));
        }

        Ok(Self { record })
    }

    /// The canonical key for this record.
    pub fn key(&self) -> &str {
        self.record
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// String elements of the `keywords` field.
    ///
    /// An absent or non-array `keywords` value yields nothing; so do
    /// non-string elements inside the array.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.record
            .get("keywords")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Access an arbitrary passthrough field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }
}
