use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::error::StoreError;
use super::migrations::{self, Decoded};
use super::models::EndpointEntry;

/// JSON file backed store of monitored endpoints
///
/// Every mutation loads the current file, applies the change and writes the
/// whole collection back, so the file is always the source of truth.
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries in stored order.
    ///
    /// A missing file is an empty store. A legacy file is upgraded and
    /// written back before returning.
    pub fn load(&self) -> Result<Vec<EndpointEntry>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path)(e)),
        };

        let decoded = migrations::decode(&self.path, &raw)?;
        let upgrade = decoded.needs_write_back();
        let entries = decoded.into_entries();

        if upgrade {
            self.save(&entries)?;
            warn!(
                path = %self.path.display(),
                entries = entries.len(),
                "Old format detected. Data has been upgraded."
            );
        }

        Ok(entries)
    }

    /// Replace the stored collection.
    ///
    /// The entries are written to a temporary file next to the store and
    /// renamed over it once flushed, so readers see either the old or the
    /// new collection.
    pub fn save(&self, entries: &[EndpointEntry]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;

        let mut file = NamedTempFile::new_in(&dir).map_err(StoreError::io(&dir))?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.write_all(b"\n").map_err(StoreError::io(&self.path))?;
            writer.flush().map_err(StoreError::io(&self.path))?;
        }
        file.as_file().sync_all().map_err(StoreError::io(&self.path))?;
        file.persist(&self.path).map_err(|e| StoreError::io(&self.path)(e.error))?;

        debug!(path = %self.path.display(), entries = entries.len(), "Saved entries");
        Ok(())
    }

    /// Append a new entry; the identifier must not already be stored.
    pub fn add(
        &self,
        identifier: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<EndpointEntry, StoreError> {
        let entry = EndpointEntry::new(identifier, label);
        let mut entries = self.load()?;

        if entries.iter().any(|existing| existing.identifier == entry.identifier) {
            return Err(StoreError::DuplicateEntry { identifier: entry.identifier });
        }

        entries.push(entry.clone());
        self.save(&entries)?;
        info!(ip = %entry.identifier, machine = %entry.label, "Entry added");
        Ok(entry)
    }

    /// Remove the entry at a 1-based display position.
    pub fn remove(&self, index: usize) -> Result<EndpointEntry, StoreError> {
        let mut entries = self.load()?;

        if index == 0 || index > entries.len() {
            return Err(StoreError::OutOfRange { index, len: entries.len() });
        }

        let removed = entries.remove(index - 1);
        self.save(&entries)?;
        info!(ip = %removed.identifier, machine = %removed.label, "Entry removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries() -> Vec<EndpointEntry> {
        vec![
            EndpointEntry::new("10.0.0.1", "gateway"),
            EndpointEntry::new("db.internal", "postgres"),
            EndpointEntry::new("10.0.0.7", "printer"),
        ]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));
        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));

        store.save(&entries()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, entries());

        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), entries());
    }

    #[test]
    fn save_writes_hand_editable_json() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));
        store.save(&[EndpointEntry::new("10.0.0.1", "gateway")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[\n  {\n    \"ip\": \"10.0.0.1\",\n    \"machine\": \"gateway\"\n  }\n]\n");
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("nested/state/ip_list.json"));
        store.save(&entries()).unwrap();
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[test]
    fn legacy_file_is_upgraded_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_list.json");
        fs::write(&path, r#"["10.0.0.1","10.0.0.2"]"#).unwrap();
        let store = EntryStore::new(&path);

        let expected = vec![
            EndpointEntry::new("10.0.0.1", "Unknown"),
            EndpointEntry::new("10.0.0.2", "Unknown"),
        ];
        assert_eq!(store.load().unwrap(), expected);

        // The upgraded form was written back
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"machine\": \"Unknown\""));
        assert_eq!(
            migrations::decode(&path, &raw).unwrap(),
            Decoded::Current(expected.clone())
        );
        assert_eq!(store.load().unwrap(), expected);
    }

    #[test]
    fn corrupt_file_is_reported_and_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_list.json");
        fs::write(&path, r#"{"ip": "10.0.0.1"}"#).unwrap();
        let store = EntryStore::new(&path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::DataCorruption { .. }));
        assert!(!err.is_user_error());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"ip": "10.0.0.1"}"#);
    }

    #[test]
    fn hand_edited_duplicates_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_list.json");
        let raw = r#"[{"ip":"10.0.0.1","machine":"A"},{"ip":"10.0.0.1","machine":"B"}]"#;
        fs::write(&path, raw).unwrap();
        let store = EntryStore::new(&path);

        assert!(matches!(store.load().unwrap_err(), StoreError::DataCorruption { .. }));
        assert!(matches!(store.add("10.0.0.2", "C").unwrap_err(), StoreError::DataCorruption { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn add_rejects_duplicate_identifier() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));

        store.add("10.0.0.1", "A").unwrap();
        let err = store.add("10.0.0.1", "B").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEntry { ref identifier } if identifier == "10.0.0.1"));
        assert!(err.is_user_error());

        let stored = store.load().unwrap();
        assert_eq!(stored, vec![EndpointEntry::new("10.0.0.1", "A")]);
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));

        store.add("Router.lan", "upstairs").unwrap();
        store.add("router.lan", "downstairs").unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn remove_uses_one_based_positions() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));
        store.save(&entries()).unwrap();

        let removed = store.remove(2).unwrap();
        assert_eq!(removed, EndpointEntry::new("db.internal", "postgres"));
        assert_eq!(
            store.load().unwrap(),
            vec![EndpointEntry::new("10.0.0.1", "gateway"), EndpointEntry::new("10.0.0.7", "printer")]
        );
    }

    #[test]
    fn remove_out_of_range_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let store = EntryStore::new(dir.path().join("ip_list.json"));
        store.save(&entries()).unwrap();

        for index in [0, 4, 99] {
            let err = store.remove(index).unwrap_err();
            assert!(matches!(err, StoreError::OutOfRange { len: 3, .. }));
        }
        assert_eq!(store.load().unwrap(), entries());
    }
}
