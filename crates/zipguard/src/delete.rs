//! Recursive, symlink-safe deletion.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Removes a file or an entire directory tree.
///
/// Deleting a path that does not exist succeeds. Symbolic links are removed
/// themselves and never descended into, so a planted link cannot redirect the
/// deletion outside `path`.
///
/// # Errors
///
/// Returns the first I/O error hit while removing an entry.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// zipguard::delete(Path::new("/tmp/extracted"))?;
/// // Deleting again is a no-op
/// zipguard::delete(Path::new("/tmp/extracted"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn delete(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if !metadata.is_dir() {
        return remove_leaf(path, &metadata.file_type());
    }

    // Children are yielded before their parent directory
    for entry in WalkDir::new(path).follow_links(false).contents_first(true) {
        let entry = entry?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::remove_dir(entry.path())?;
        } else {
            remove_leaf(entry.path(), &file_type)?;
        }
    }

    tracing::debug!("Deleted tree {}", path.display());
    Ok(())
}

#[cfg(windows)]
fn remove_leaf(path: &Path, file_type: &fs::FileType) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    // Directory symlinks and junctions are unlinked with remove_dir on Windows
    if file_type.is_symlink_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
fn remove_leaf(path: &Path, _file_type: &fs::FileType) -> io::Result<()> {
    fs::remove_file(path)
}
