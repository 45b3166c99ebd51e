//! Entry-count and size quotas for a single extraction.
//!
//! Declared sizes in an archive are attacker-controlled, so two checks run:
//! [`QuotaTracker::admit_entry`] rejects early on declared metadata, and
//! [`QuotaTracker::admit_bytes`] is fed every streamed chunk before it hits
//! the disk and is the authoritative one.

use crate::error::QuotaError;
use crate::types::{ArchiveEntry, ExtractionLimits};

/// Tracks resource usage during one extraction against its limits.
#[derive(Debug)]
pub struct QuotaTracker<'a> {
    limits: &'a ExtractionLimits,
    entries_processed: u64,
    bytes_written_total: u64,
    current_entry: String,
    current_entry_bytes: u64,
}

impl<'a> QuotaTracker<'a> {
    /// Creates a tracker with zeroed counters.
    pub fn new(limits: &'a ExtractionLimits) -> Self {
        Self {
            limits,
            entries_processed: 0,
            bytes_written_total: 0,
            current_entry: String::new(),
            current_entry_bytes: 0,
        }
    }

    /// Admits the next entry, counting it and checking its declared size.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry count ceiling is passed, or if the
    /// declared size alone already breaks a size ceiling.
    pub fn admit_entry(&mut self, entry: &ArchiveEntry) -> Result<(), QuotaError> {
        self.entries_processed += 1;
        self.current_entry.clone_from(&entry.name);
        self.current_entry_bytes = 0;

        if self.entries_processed > self.limits.max_entries {
            return Err(QuotaError::EntryCountExceeded {
                count: self.entries_processed,
                limit: self.limits.max_entries,
            });
        }

        if entry.is_directory {
            return Ok(());
        }

        self.check_entry_size(entry.size)?;
        self.check_total_size(self.bytes_written_total.saturating_add(entry.size))
    }

    /// Admits `n` more bytes of the current entry.
    ///
    /// Call before writing the chunk so a rejected chunk never reaches disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the running total or the current entry's size
    /// would exceed its ceiling.
    pub fn admit_bytes(&mut self, n: u64) -> Result<(), QuotaError> {
        let entry_bytes = self.current_entry_bytes.saturating_add(n);
        let total = self.bytes_written_total.saturating_add(n);

        self.check_entry_size(entry_bytes)?;
        self.check_total_size(total)?;

        self.current_entry_bytes = entry_bytes;
        self.bytes_written_total = total;
        Ok(())
    }

    fn check_entry_size(&self, size: u64) -> Result<(), QuotaError> {
        match self.limits.max_single_entry_bytes {
            Some(limit) if size > limit => Err(QuotaError::EntrySizeExceeded {
                entry: self.current_entry.clone(),
                size,
                limit,
            }),
            _ => Ok(()),
        }
    }

    fn check_total_size(&self, total: u64) -> Result<(), QuotaError> {
        if total > self.limits.max_total_uncompressed_bytes {
            return Err(QuotaError::TotalSizeExceeded {
                current: total,
                limit: self.limits.max_total_uncompressed_bytes,
            });
        }
        Ok(())
    }

    /// Number of entries admitted so far, including a rejected one.
    pub fn entries_processed(&self) -> u64 {
        self.entries_processed
    }

    /// Total bytes admitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written_total
    }
}
