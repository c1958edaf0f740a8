//! In-memory download queue
//!
//! Pending entries live in a FIFO worklist. Completion of a folder is
//! tracked with a per-folder counter instead of by deleting map keys while
//! iterating, so the order of attempts is deterministic: a failed entry goes
//! to the back and is retried after everything that was already waiting.
//!
//! An entry counts as part of the queue from the moment it is pushed until
//! the scheduler calls [`DownloadQueue::finish`] for it. It stays at the
//! front of the worklist while it is being attempted, so an attempt that
//! never completes loses nothing.

use crate::types::QueueEntry;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

/// A queued entry together with its failure count
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    entry: QueueEntry,
    failures: u32,
}

impl PendingEntry {
    /// The entry
    pub fn entry(&self) -> &QueueEntry {
        &self.entry
    }

    /// Failed attempts so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Count one more failure and return the new total
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        self.failures
    }

    /// Consume into the bare entry
    pub fn into_entry(self) -> QueueEntry {
        self.entry
    }
}

/// All entries not yet downloaded, grouped by destination folder
#[derive(Clone, Debug, Default)]
pub struct DownloadQueue {
    pending: VecDeque<PendingEntry>,
    remaining: BTreeMap<PathBuf, usize>,
}

impl DownloadQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the back of the worklist
    pub fn push(&mut self, entry: QueueEntry) {
        *self.remaining.entry(entry.folder.clone()).or_insert(0) += 1;
        self.pending.push_back(PendingEntry { entry, failures: 0 });
    }

    /// Entries not yet finished, across all folders
    pub fn len(&self) -> usize {
        self.remaining.values().sum()
    }

    /// True when every entry has been finished
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Number of folders that still have entries
    pub fn folder_count(&self) -> usize {
        self.remaining.len()
    }

    /// Folders that still have entries, in path order
    pub fn folders(&self) -> impl Iterator<Item = &Path> {
        self.remaining.keys().map(PathBuf::as_path)
    }

    /// Entries not yet finished in one folder
    pub fn remaining_in(&self, folder: &Path) -> usize {
        self.remaining.get(folder).copied().unwrap_or(0)
    }

    /// Waiting entries of one folder as `index -> url`
    pub fn entries_in(&self, folder: &Path) -> BTreeMap<u32, &str> {
        self.pending
            .iter()
            .filter(|p| p.entry.folder == folder)
            .map(|p| (p.entry.index, p.entry.url.as_str()))
            .collect()
    }

    /// Waiting entries in the order they will be attempted
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.pending.iter().map(|p| &p.entry)
    }

    /// Next entry to attempt, left in place
    pub fn peek_next(&self) -> Option<&PendingEntry> {
        self.pending.front()
    }

    /// Take the next entry once its attempt has resolved; it still counts
    /// towards [`len`](Self::len) until finished
    pub(crate) fn take_next(&mut self) -> Option<PendingEntry> {
        self.pending.pop_front()
    }

    /// Put an entry back at the end of the worklist
    pub(crate) fn requeue(&mut self, pending: PendingEntry) {
        self.pending.push_back(pending);
    }

    /// Remove an entry for good; returns true if that emptied its folder
    pub(crate) fn finish(&mut self, entry: &QueueEntry) -> bool {
        let Some(count) = self.remaining.get_mut(&entry.folder) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.remaining.remove(&entry.folder);
            true
        } else {
            false
        }
    }
}

impl Extend<QueueEntry> for DownloadQueue {
    fn extend<I: IntoIterator<Item = QueueEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl FromIterator<QueueEntry> for DownloadQueue {
    fn from_iter<I: IntoIterator<Item = QueueEntry>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}
