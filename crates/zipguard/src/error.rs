//! Error types for archive extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive file not found at the specified path.
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// The destination already holds files; nothing was written.
    #[error("Destination is not empty: {0}")]
    DestinationNotEmpty(PathBuf),

    /// The destination exists but is not a directory.
    #[error("Destination is not a directory: {0}")]
    DestinationNotDirectory(PathBuf),

    /// An entry would have been written outside the destination.
    #[error("Archive extraction failed: {0}")]
    Security(#[from] SecurityError),

    /// A configured ceiling was exceeded.
    #[error("Archive extraction failed: {0}")]
    Quota(#[from] QuotaError),

    /// The archive uses a feature this crate refuses to read (e.g. encryption).
    #[error("Unsupported archive: {0}")]
    Unsupported(String),

    /// The archive is corrupted or malformed.
    #[error("Corrupted archive: {0}")]
    Corrupted(String),

    /// An I/O error occurred during extraction.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The extraction was cancelled by the caller.
    #[error("Cancelled by user")]
    Cancelled,
}

/// Coarse failure category of an [`ExtractError`].
///
/// The category tells the caller what state the destination was left in
/// without inspecting it:
///
/// - [`ErrorKind::Validation`]: destination unchanged.
/// - [`ErrorKind::SecurityViolation`] / [`ErrorKind::QuotaExceeded`]:
///   destination removed.
/// - [`ErrorKind::Io`]: removal attempted, not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The destination failed pre-flight checks.
    Validation,
    /// An entry tried to escape the destination.
    SecurityViolation,
    /// A quota was exceeded, or the extraction was cancelled.
    QuotaExceeded,
    /// Storage or archive read failure unrelated to the archive's intent.
    Io,
}

impl ExtractError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::DestinationNotEmpty(_) | ExtractError::DestinationNotDirectory(_) => {
                ErrorKind::Validation
            }
            ExtractError::Security(_) => ErrorKind::SecurityViolation,
            ExtractError::Quota(_) | ExtractError::Cancelled => ErrorKind::QuotaExceeded,
            ExtractError::NotFound(_)
            | ExtractError::Unsupported(_)
            | ExtractError::Corrupted(_)
            | ExtractError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(e: zip::result::ZipError) -> Self {
        use zip::result::ZipError;

        match e {
            ZipError::Io(io) => ExtractError::Io(io),
            ZipError::UnsupportedArchive(msg) => ExtractError::Unsupported(msg.to_string()),
            other => ExtractError::Corrupted(other.to_string()),
        }
    }
}

/// Security-related errors during extraction.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Path traversal attempt detected (e.g., "../../../etc/passwd").
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// Absolute path or drive designator in an archive entry name.
    #[error("Absolute path not allowed: {0}")]
    AbsolutePath(String),

    /// Entry name is empty, contains NUL, or names the destination itself.
    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),

    /// The resolved target lies outside the destination once symlinks are
    /// taken into account.
    #[error("Entry {entry} resolves outside destination: {resolved}")]
    OutsideDestination {
        /// Raw entry name from the archive
        entry: String,
        /// Canonical path the entry resolved to
        resolved: PathBuf,
    },
}

/// Quota violations during extraction.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Too many entries in the archive.
    #[error("Entry count exceeded: {count} > {limit}")]
    EntryCountExceeded {
        /// Entries seen so far, including the rejected one
        count: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// Cumulative uncompressed size exceeded.
    #[error("Size limit exceeded: {current} bytes > {limit} bytes")]
    TotalSizeExceeded {
        /// Total that would have been reached
        current: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// A single entry exceeded the per-entry ceiling.
    #[error("Entry {entry} too large: {size} bytes > {limit} bytes")]
    EntrySizeExceeded {
        /// Raw entry name from the archive
        entry: String,
        /// Size that would have been reached
        size: u64,
        /// Configured ceiling
        limit: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ExtractError::DestinationNotEmpty(PathBuf::from("out")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ExtractError::from(SecurityError::PathTraversal("../x".into())).kind(),
            ErrorKind::SecurityViolation
        );
        assert_eq!(
            ExtractError::from(QuotaError::EntryCountExceeded { count: 2, limit: 1 }).kind(),
            ErrorKind::QuotaExceeded
        );
        assert_eq!(ExtractError::Cancelled.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(
            ExtractError::Io(std::io::Error::other("disk full")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn test_rejections_carry_cause() {
        let err = ExtractError::from(QuotaError::TotalSizeExceeded {
            current: 11,
            limit: 10,
        });
        let cause = err.source().expect("quota errors wrap their cause");
        assert!(cause.to_string().contains("11 bytes > 10 bytes"));

        let err = ExtractError::DestinationNotEmpty(PathBuf::from("out"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_zip_error_mapping() {
        let err = ExtractError::from(zip::result::ZipError::InvalidArchive("bad header".into()));
        assert!(matches!(err, ExtractError::Corrupted(_)));

        let err = ExtractError::from(zip::result::ZipError::FileNotFound);
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
