//! Archive probing functionality for reading metadata without extraction.

use crate::error::ExtractError;
use crate::reader::ArchiveReader;
use crate::types::ArchiveInfo;
use std::path::Path;

/// Probe an archive to retrieve metadata without extracting.
///
/// This function reads the central directory to determine:
/// - Number of entries
/// - Archive size and the sum of declared uncompressed sizes
/// - Whether any entry is encrypted
///
/// Declared sizes are reported as stored; nothing is decompressed, so they
/// are not verified.
///
/// # Errors
///
/// Returns an error if:
/// - The archive file doesn't exist
/// - The file is not a readable zip container
pub fn probe_archive(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    // Check if file exists
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    // Get compressed size from file metadata
    let compressed_bytes = std::fs::metadata(path)?.len();

    let mut reader = ArchiveReader::open(path)?;
    let (entry_list, encrypted) = reader.list()?;

    let uncompressed_estimate = entry_list
        .iter()
        .fold(0u64, |total, entry| total.saturating_add(entry.size));

    Ok(ArchiveInfo {
        entries: entry_list.len() as u64,
        compressed_bytes,
        uncompressed_estimate,
        encrypted,
        entry_list,
    })
}
