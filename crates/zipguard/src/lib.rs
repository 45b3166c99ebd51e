//! # zipguard
//!
//! Zip extraction hardened against hostile archives.
//!
//! Extraction is all or nothing. Three classes of malicious or malformed input
//! are refused, and the destination is removed when they are:
//!
//! - Path traversal ("zip-slip") entries that would land outside the destination
//! - Entry-count bombs
//! - Uncompressed-size bombs, checked against the bytes actually streamed
//!
//! A destination that already holds files is never touched.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zipguard::{probe, extract, ExtractionLimits};
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Probe archive metadata
//! let info = probe(Path::new("archive.zip"))?;
//! println!("Entries: {}, declared size: {}", info.entries, info.uncompressed_estimate);
//!
//! // Extract with tighter limits
//! let limits = ExtractionLimits {
//!     max_entries: 1_000,
//!     ..Default::default()
//! };
//! let cancel_flag = Arc::new(AtomicBool::new(false));
//! let progress_cb = |file: &str, bytes: u64, _total: Option<u64>| {
//!     println!("Extracting: {} ({} bytes so far)", file, bytes);
//!     true // Continue extraction
//! };
//!
//! let stats = extract(
//!     Path::new("archive.zip"),
//!     Path::new("output"),
//!     &limits,
//!     &progress_cb,
//!     cancel_flag,
//! )?;
//!
//! println!("Extracted {} files ({} bytes)", stats.files_extracted, stats.bytes_written);
//! # Ok(())
//! # }
//! ```

pub mod delete;
pub mod error;
pub mod extract;
pub mod probe;
pub mod quota;
pub mod reader;
pub mod safety;
pub mod types;

// Re-export main types
pub use delete::delete;
pub use error::{ErrorKind, ExtractError, QuotaError, SecurityError};
pub use reader::{ArchiveReader, EntryStream};
pub use safety::PathSanitizer;
pub use types::{ArchiveEntry, ArchiveInfo, ExtractStats, ExtractionLimits};

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Type alias for progress callback functions.
///
/// The callback receives:
/// - `file`: The entry that was just written
/// - `bytes_written`: Number of bytes written so far, across all entries
/// - `total_bytes`: Declared size of the entry
///
/// Returns `true` to continue extraction, `false` to cancel (which rolls the
/// destination back like any other abort).
pub type ProgressCallback = dyn Fn(&str, u64, Option<u64>) -> bool + Send + Sync;

/// Probe an archive to retrieve metadata without extracting.
///
/// # Errors
///
/// Returns an error if the archive file doesn't exist or is not a readable
/// zip container.
pub fn probe(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    probe::probe_archive(path)
}

/// Extract an archive into `output_dir` using the default limits.
///
/// See [`extract`] for the guarantees, including rollback through a
/// symlinked `output_dir`.
pub fn unzip(archive_path: &Path, output_dir: &Path) -> Result<ExtractStats, ExtractError> {
    unzip_with_limits(archive_path, output_dir, &ExtractionLimits::default())
}

/// Extract an archive into `output_dir` with caller-supplied limits.
///
/// See [`extract`] for the guarantees.
pub fn unzip_with_limits(
    archive_path: &Path,
    output_dir: &Path,
    limits: &ExtractionLimits,
) -> Result<ExtractStats, ExtractError> {
    extract(
        archive_path,
        output_dir,
        limits,
        &|_: &str, _: u64, _: Option<u64>| true,
        Arc::new(AtomicBool::new(false)),
    )
}

/// Extract an archive to the specified output directory.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `output_dir` - Directory where files will be extracted; must be missing or empty
/// * `limits` - Entry-count and size ceilings
/// * `progress_cb` - Callback function for progress updates
/// * `cancel_flag` - Atomic flag to signal cancellation
///
/// # Returns
///
/// Returns `ExtractStats` with extraction statistics on success.
///
/// # Errors
///
/// The destination's state follows from [`ExtractError::kind`]:
/// - [`ErrorKind::Validation`]: the destination held files; it is unchanged
/// - [`ErrorKind::SecurityViolation`] / [`ErrorKind::QuotaExceeded`]: an entry
///   escaped, a limit was hit, or the run was cancelled; the destination is
///   removed
/// - [`ErrorKind::Io`]: the archive is missing or unreadable, or storage
///   failed; removal is attempted
///
/// Removal applies to the directory `output_dir` resolves to. When
/// `output_dir` is a symlink, both the link and the directory it points at
/// are removed.
pub fn extract(
    archive_path: &Path,
    output_dir: &Path,
    limits: &ExtractionLimits,
    progress_cb: &ProgressCallback,
    cancel_flag: Arc<AtomicBool>,
) -> Result<ExtractStats, ExtractError> {
    extract::extract_archive(archive_path, output_dir, limits, progress_cb, cancel_flag)
}
