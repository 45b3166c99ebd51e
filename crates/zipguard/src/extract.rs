//! Archive extraction implementation with security features.

use crate::delete::delete;
use crate::error::ExtractError;
use crate::quota::QuotaTracker;
use crate::reader::ArchiveReader;
use crate::safety::PathSanitizer;
use crate::types::{ExtractStats, ExtractionLimits};
use crate::ProgressCallback;
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Size of the copy buffer; bounds memory use regardless of entry size.
pub const BUFFER_SIZE: usize = 8 * 1024;

/// Extract a zip archive into `output_dir`, all or nothing.
///
/// This function performs secure extraction with the following features:
/// - Refuses a destination that already holds files, touching nothing
/// - Path validation to prevent zip-slip attacks
/// - Entry-count and size quotas, checked against streamed bytes
/// - Progress tracking with cancellation support
/// - Removal of the destination on any failure after it was created
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `output_dir` - Directory where files will be extracted
/// * `limits` - Quota ceilings
/// * `progress_cb` - Callback for progress updates
/// * `cancel_flag` - Atomic flag to signal cancellation
///
/// # Returns
///
/// Returns `ExtractStats` with extraction statistics on success.
pub fn extract_archive(
    archive_path: &Path,
    output_dir: &Path,
    limits: &ExtractionLimits,
    progress_cb: &ProgressCallback,
    cancel_flag: Arc<AtomicBool>,
) -> Result<ExtractStats, ExtractError> {
    let start_time = Instant::now();

    // Verify archive exists
    if !archive_path.exists() {
        return Err(ExtractError::NotFound(archive_path.to_path_buf()));
    }

    validate_destination(output_dir)?;

    let mut reader = ArchiveReader::open(archive_path)?;

    tracing::info!(
        "Extracting {} ({} entries) into {}",
        archive_path.display(),
        reader.len(),
        output_dir.display()
    );

    // Create output directory if it doesn't exist
    fs::create_dir_all(output_dir)?;

    let result = PathSanitizer::new(output_dir)
        .map_err(ExtractError::from)
        .and_then(|sanitizer| {
            extract_entries(&mut reader, &sanitizer, limits, progress_cb, &cancel_flag)
        });

    match result {
        Ok(mut stats) => {
            stats.duration = start_time.elapsed();
            tracing::info!(
                "Extracted {} files ({} bytes) into {}",
                stats.files_extracted,
                stats.bytes_written,
                output_dir.display()
            );
            Ok(stats)
        }
        Err(e) => {
            rollback(output_dir, &e);
            Err(e)
        }
    }
}

/// Fails if the destination exists and is not an empty directory.
fn validate_destination(output_dir: &Path) -> Result<(), ExtractError> {
    let metadata = match fs::metadata(output_dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Err(ExtractError::DestinationNotDirectory(
            output_dir.to_path_buf(),
        ));
    }

    if fs::read_dir(output_dir)?.next().is_some() {
        return Err(ExtractError::DestinationNotEmpty(output_dir.to_path_buf()));
    }

    Ok(())
}

/// Walk every entry: sanitize, admit, then write.
fn extract_entries<R: Read + Seek>(
    reader: &mut ArchiveReader<R>,
    sanitizer: &PathSanitizer,
    limits: &ExtractionLimits,
    progress_cb: &ProgressCallback,
    cancel_flag: &AtomicBool,
) -> Result<ExtractStats, ExtractError> {
    let mut quota = QuotaTracker::new(limits);
    let mut stats = ExtractStats::default();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    while let Some(stream) = reader.next_entry() {
        // Check cancellation
        if cancel_flag.load(Ordering::Relaxed) {
            return Err(ExtractError::Cancelled);
        }

        let mut stream = stream?;
        let entry = stream.entry().clone();

        let target = sanitizer.sanitize(&entry.name)?;
        quota.admit_entry(&entry)?;

        if entry.is_directory {
            fs::create_dir_all(&target)?;
            stats.directories_created += 1;
            tracing::debug!("Created directory {}", entry.name);
            continue;
        }

        // Create parent directories
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let written = copy_entry(&mut stream, &target, &mut quota, &mut buffer)?;

        // Update statistics
        stats.files_extracted += 1;
        stats.bytes_written += written;
        tracing::debug!("Wrote {} ({} bytes)", entry.name, written);

        // Call progress callback
        let continue_extraction = progress_cb(&entry.name, stats.bytes_written, Some(entry.size));

        if !continue_extraction {
            return Err(ExtractError::Cancelled);
        }
    }

    Ok(stats)
}

/// Stream one entry to `target`, admitting every chunk before it is written.
fn copy_entry(
    content: &mut impl Read,
    target: &Path,
    quota: &mut QuotaTracker<'_>,
    buffer: &mut [u8],
) -> Result<u64, ExtractError> {
    let mut file = File::create(target)?;
    let mut written = 0u64;

    loop {
        let n = match content.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        quota.admit_bytes(n as u64)?;
        file.write_all(&buffer[..n])?;
        written += n as u64;
    }

    file.flush()?;
    Ok(written)
}

/// Remove the destination after a failed extraction.
///
/// Both the canonical tree and the path as given are removed, so a
/// destination reached through a symlink loses the link and its target
/// directory.
fn rollback(output_dir: &Path, cause: &ExtractError) {
    tracing::warn!(
        "Extraction into {} failed, rolling back: {}",
        output_dir.display(),
        cause
    );

    let canonical = output_dir.canonicalize().ok();
    let result = canonical
        .as_deref()
        .map_or(Ok(()), delete)
        .and_then(|()| delete(output_dir));

    if let Err(e) = result {
        tracing::error!("Rollback of {} failed: {}", output_dir.display(), e);
    }
}
