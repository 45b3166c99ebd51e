//! Type definitions for archive extraction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Individual entry within an archive.
///
/// Sizes come from the archive's own metadata and are attacker-controlled;
/// treat them as hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Raw name of the entry, as stored in the archive
    pub name: String,

    /// Whether this entry is a directory (name ends with a separator)
    pub is_directory: bool,

    /// Declared uncompressed size in bytes
    pub size: u64,

    /// Declared compressed size in bytes
    pub compressed_size: u64,
}

/// Metadata information about an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// Number of entries in the archive
    pub entries: u64,

    /// Size of the archive file in bytes
    pub compressed_bytes: u64,

    /// Sum of declared uncompressed sizes
    pub uncompressed_estimate: u64,

    /// Whether any entry is password-protected
    pub encrypted: bool,

    /// List of all entries in the archive
    pub entry_list: Vec<ArchiveEntry>,
}

/// Ceilings applied while extracting an archive.
///
/// Missing fields fall back to [`ExtractionLimits::default`] when
/// deserializing, so a config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// Maximum number of entries, directories included (default: 10 000)
    pub max_entries: u64,

    /// Maximum total uncompressed bytes written (default: 256 MiB)
    pub max_total_uncompressed_bytes: u64,

    /// Maximum uncompressed bytes for any one entry (default: none)
    pub max_single_entry_bytes: Option<u64>,
}

impl ExtractionLimits {
    /// Default entry ceiling.
    pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

    /// Default total size ceiling.
    pub const DEFAULT_MAX_TOTAL_UNCOMPRESSED_BYTES: u64 = 256 * 1024 * 1024;
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            max_total_uncompressed_bytes: Self::DEFAULT_MAX_TOTAL_UNCOMPRESSED_BYTES,
            max_single_entry_bytes: None,
        }
    }
}

/// Statistics about a completed extraction operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Number of files written
    pub files_extracted: u64,

    /// Number of directory entries materialized
    pub directories_created: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,

    /// Duration of the extraction operation (in seconds)
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl Default for ExtractStats {
    fn default() -> Self {
        Self {
            files_extracted: 0,
            directories_created: 0,
            bytes_written: 0,
            duration: Duration::from_secs(0),
        }
    }
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
