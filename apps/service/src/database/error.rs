use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The file is neither a list of entries nor a legacy list of addresses.
    #[error("store file {} is corrupt: {reason}", path.display())]
    DataCorruption { path: PathBuf, reason: String },

    #[error("IP already exists: {identifier}")]
    DuplicateEntry { identifier: String },

    #[error("no entry at position {index} (store has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("failed to access store file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }

    /// Operator mistakes that a menu flow can report and retry.
    pub fn is_user_error(&self) -> bool {
        matches!(self, StoreError::DuplicateEntry { .. } | StoreError::OutOfRange { .. })
    }
}
