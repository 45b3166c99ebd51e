//! Security and safety checks for archive extraction.
//!
//! Entry names inside an archive are untrusted strings. This module turns them
//! into paths that are guaranteed to stay inside the destination directory,
//! preventing zip-slip (path traversal) attacks.

use crate::error::{ExtractError, SecurityError};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Returns `true` if the raw entry name denotes a directory.
pub fn is_directory_name(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}

/// Normalizes an archive entry name into a relative path.
///
/// This function performs the following steps:
/// - Rejects empty names and names containing NUL
/// - Rejects absolute names, UNC prefixes and drive designators
/// - Treats both `/` and `\` as separators
/// - Drops `.` segments and resolves `..` against preceding segments
/// - Rejects any `..` that would climb above the archive root
///
/// The result may be empty when the name resolves to the root itself
/// (e.g. `"./"` or `"a/.."`).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use zipguard::safety::normalize_entry_name;
///
/// // Valid relative path
/// let safe_path = normalize_entry_name("dir/file.txt").unwrap();
/// assert_eq!(safe_path, Path::new("dir/file.txt"));
///
/// // Traversal that stays inside the archive is resolved
/// let safe_path = normalize_entry_name("dir/../file.txt").unwrap();
/// assert_eq!(safe_path, Path::new("file.txt"));
///
/// // Path traversal attempt - rejected
/// assert!(normalize_entry_name("../../etc/passwd").is_err());
///
/// // Absolute path - rejected
/// assert!(normalize_entry_name("/etc/passwd").is_err());
/// ```
pub fn normalize_entry_name(name: &str) -> Result<PathBuf, SecurityError> {
    if name.is_empty() || name.contains('\0') {
        return Err(SecurityError::InvalidName(name.to_string()));
    }

    if has_absolute_prefix(name) {
        return Err(SecurityError::AbsolutePath(name.to_string()));
    }

    let mut normalized = PathBuf::new();

    for segment in name.split(|c| c == '/' || c == '\\') {
        match segment {
            "" | "." => continue,
            ".." => {
                if !normalized.pop() {
                    return Err(SecurityError::PathTraversal(name.to_string()));
                }
            }
            part => {
                // A lone segment can still parse as a prefix on this platform
                // (e.g. "C:" on Windows).
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => normalized.push(part),
                    _ => return Err(SecurityError::AbsolutePath(name.to_string())),
                }
            }
        }
    }

    Ok(normalized)
}

/// Leading `/`, `\` (which covers UNC `\\server`) or a drive letter.
fn has_absolute_prefix(name: &str) -> bool {
    if name.starts_with('/') || name.starts_with('\\') || Path::new(name).is_absolute() {
        return true;
    }

    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Maps archive entry names to paths inside one destination root.
///
/// The root is canonicalized once at construction; every path handed out by
/// [`PathSanitizer::sanitize`] is equal to or a descendant of it.
#[derive(Debug, Clone)]
pub struct PathSanitizer {
    root: PathBuf,
}

impl PathSanitizer {
    /// Binds a sanitizer to an existing destination directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root cannot be canonicalized.
    pub fn new(root: &Path) -> io::Result<Self> {
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    /// Canonical destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produces the target path for an entry, or rejects it.
    ///
    /// Directory and file entries go through the same checks, except that
    /// only a directory entry may resolve to the root itself.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use zipguard::safety::PathSanitizer;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let sanitizer = PathSanitizer::new(Path::new("/tmp/out"))?;
    /// let target = sanitizer.sanitize("book/0.htm")?;
    /// assert!(target.starts_with(sanitizer.root()));
    /// assert!(sanitizer.sanitize("../escape.txt").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn sanitize(&self, entry_name: &str) -> Result<PathBuf, ExtractError> {
        let relative = normalize_entry_name(entry_name)?;

        if relative.as_os_str().is_empty() && !is_directory_name(entry_name) {
            return Err(SecurityError::InvalidName(entry_name.to_string()).into());
        }

        let resolved = canonicalize_existing(&self.root.join(&relative), entry_name)?;

        // Component-wise comparison; a string prefix check would accept
        // "/out-evil" for root "/out".
        if !resolved.starts_with(&self.root) {
            return Err(SecurityError::OutsideDestination {
                entry: entry_name.to_string(),
                resolved,
            }
            .into());
        }

        Ok(resolved)
    }
}

/// Canonicalizes the longest existing ancestor of `path` and re-appends the
/// components that do not exist yet.
fn canonicalize_existing(path: &Path, entry_name: &str) -> Result<PathBuf, ExtractError> {
    let mut existing = path;
    let mut pending: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for part in pending.iter().rev() {
                    resolved.push(part);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // A dangling symlink would be followed by the later write.
                if existing.symlink_metadata().is_ok() {
                    return Err(SecurityError::OutsideDestination {
                        entry: entry_name.to_string(),
                        resolved: existing.to_path_buf(),
                    }
                    .into());
                }

                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        pending.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}
