//! Forward-only reader over a zip container.

use crate::error::ExtractError;
use crate::safety::is_directory_name;
use crate::types::ArchiveEntry;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

/// Lazy, forward-only sequence of archive entries.
///
/// Each call to [`ArchiveReader::next_entry`] decodes one entry; content is
/// decompressed only as the returned stream is read. The cursor cannot be
/// rewound; open a fresh reader to iterate again.
pub struct ArchiveReader<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    next_index: usize,
}

impl ArchiveReader<BufReader<File>> {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist and `Corrupted` if it is
    /// not a readable zip container.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ExtractError::NotFound(path.to_path_buf()),
            _ => ExtractError::Io(e),
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Reads the central directory of a zip container.
    pub fn new(reader: R) -> Result<Self, ExtractError> {
        Ok(Self {
            archive: zip::ZipArchive::new(reader)?,
            next_index: 0,
        })
    }

    /// Number of entries in the central directory.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Advances to the next entry.
    ///
    /// Returns `None` once every entry has been handed out.
    pub fn next_entry(&mut self) -> Option<Result<EntryStream<'_>, ExtractError>> {
        if self.next_index >= self.archive.len() {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(self.open_entry(index))
    }

    fn open_entry(&mut self, index: usize) -> Result<EntryStream<'_>, ExtractError> {
        let (entry, encrypted) = {
            let raw = self.archive.by_index_raw(index)?;
            (describe(raw.name(), raw.size(), raw.compressed_size()), raw.encrypted())
        };

        if encrypted {
            return Err(ExtractError::Unsupported(format!(
                "encrypted entry: {}",
                entry.name
            )));
        }

        let file = self.archive.by_index(index)?;
        Ok(EntryStream {
            entry,
            content: Box::new(file),
        })
    }

    /// Lists every entry's metadata without decompressing anything.
    ///
    /// Returns the entries and whether any of them is encrypted. Does not
    /// move the [`ArchiveReader::next_entry`] cursor.
    pub fn list(&mut self) -> Result<(Vec<ArchiveEntry>, bool), ExtractError> {
        let mut entries = Vec::with_capacity(self.archive.len());
        let mut encrypted = false;

        for i in 0..self.archive.len() {
            let raw = self.archive.by_index_raw(i)?;

            // Check if any entry is encrypted
            if raw.encrypted() {
                encrypted = true;
            }

            entries.push(describe(raw.name(), raw.size(), raw.compressed_size()));
        }

        Ok((entries, encrypted))
    }
}

fn describe(name: &str, size: u64, compressed_size: u64) -> ArchiveEntry {
    ArchiveEntry {
        name: name.to_string(),
        is_directory: is_directory_name(name),
        size,
        compressed_size,
    }
}

/// One entry's descriptor plus its decompressed content.
pub struct EntryStream<'a> {
    entry: ArchiveEntry,
    content: Box<dyn Read + 'a>,
}

impl EntryStream<'_> {
    /// Declared metadata of this entry.
    pub fn entry(&self) -> &ArchiveEntry {
        &self.entry
    }
}

impl Read for EntryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}
