use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Status of a single model in an engine's catalog.
///
/// Serialized form mixes plain tags (`"Available"`, `"Missing"`) with
/// structured tags carrying payloads; consumers that only care about one
/// dimension (e.g. "is anything downloading") must treat both encodings
/// the same way, which is what the predicate methods below do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelStatus {
    /// Model file present and validated.
    Available,
    /// Model file not on disk.
    Missing,
    /// Download in flight.
    Downloading {
        /// Completion percentage, 0-100.
        progress: u8,
    },
    /// Engine reported an error for this model.
    Error(String),
    /// File on disk but failed format validation.
    Corrupted {
        /// Actual size of the on-disk file.
        file_size: u64,
        /// Smallest size a valid file could have.
        expected_min_size: u64,
    },
}

impl ModelStatus {
    /// True only for a validated, on-disk model.
    pub fn is_available(&self) -> bool {
        matches!(self, ModelStatus::Available)
    }

    /// True while a download for this model is in flight.
    pub fn is_downloading(&self) -> bool {
        matches!(self, ModelStatus::Downloading { .. })
    }
}

/// Catalog entry for one model of a local engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Catalog name, used in download requests.
    pub name: String,
    /// Expected on-disk location.
    pub path: PathBuf,
    /// Approximate size in megabytes.
    pub size_mb: u32,
    /// Current status.
    pub status: ModelStatus,
    /// One-line human description.
    pub description: String,
}
