use serde::{Deserialize, Serialize};
use std::fmt;

/// Label given to entries upgraded from the legacy address-only format
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A monitored endpoint as stored on disk.
///
/// Field order is the on-disk order (`ip`, then `machine`) so that the file
/// stays easy to edit by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    /// IP address or hostname handed to the prober
    #[serde(rename = "ip")]
    pub identifier: String,

    /// Free-form machine name shown to the operator
    #[serde(rename = "machine")]
    pub label: String,
}

impl EndpointEntry {
    pub fn new(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), label: label.into() }
    }

    /// Entry carried over from the legacy format, which had no labels
    pub fn unlabelled(identifier: impl Into<String>) -> Self {
        Self::new(identifier, UNKNOWN_LABEL)
    }
}

impl fmt::Display for EndpointEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.identifier, self.label)
    }
}
