//! Store file format detection and the legacy upgrade path.
//!
//! The first releases persisted a bare array of addresses. The current
//! format is an array of `{"ip": .., "machine": ..}` objects. Decoding tries
//! the current shape first, then the legacy one, and refuses anything else
//! rather than guessing.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::error::StoreError;
use super::models::EndpointEntry;

/// Every shape the store file has had, newest first
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredEntries {
    Structured(Vec<EndpointEntry>),
    Legacy(Vec<String>),
}

/// Result of decoding a store file
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// File was already in the current format
    Current(Vec<EndpointEntry>),
    /// File was in the legacy format and must be written back
    Upgraded(Vec<EndpointEntry>),
}

impl Decoded {
    pub fn needs_write_back(&self) -> bool {
        matches!(self, Decoded::Upgraded(_))
    }

    pub fn into_entries(self) -> Vec<EndpointEntry> {
        match self {
            Decoded::Current(entries) | Decoded::Upgraded(entries) => entries,
        }
    }
}

/// Decode the raw contents of the store file at `path`.
pub fn decode(path: &Path, raw: &str) -> Result<Decoded, StoreError> {
    let corrupt = |reason: String| StoreError::DataCorruption { path: path.to_path_buf(), reason };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| corrupt(format!("invalid JSON: {e}")))?;

    let decoded = match StoredEntries::deserialize(value) {
        Ok(StoredEntries::Structured(entries)) => Decoded::Current(entries),
        Ok(StoredEntries::Legacy(addresses)) => Decoded::Upgraded(upgrade_legacy(addresses)),
        Err(_) => {
            return Err(corrupt(
                "expected a list of {\"ip\", \"machine\"} objects or a list of addresses".into(),
            ));
        }
    };

    let entries = match &decoded {
        Decoded::Current(entries) | Decoded::Upgraded(entries) => entries,
    };
    if let Some(identifier) = first_repeated(entries) {
        return Err(corrupt(format!("IP {identifier} is listed more than once")));
    }

    Ok(decoded)
}

/// Identifiers are unique within the store; a hand-edited file may break that
fn first_repeated(entries: &[EndpointEntry]) -> Option<&str> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.identifier.as_str())
        .find(|identifier| !seen.insert(*identifier))
}

/// Convert legacy addresses into labelled entries, keeping their order
pub fn upgrade_legacy(addresses: Vec<String>) -> Vec<EndpointEntry> {
    addresses.into_iter().map(EndpointEntry::unlabelled).collect()
}
