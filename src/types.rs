//! Core types and events

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// One download unit: a URL bound for `<folder>/<index>.<ext>`
///
/// The index is assigned once, in source-file line order starting at 1,
/// and names the output file for the lifetime of the entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Destination folder (`<output_dir>/<source file stem>`)
    pub folder: PathBuf,
    /// Sequence number within the folder, starting at 1
    pub index: u32,
    /// URL to fetch, exactly as it appeared in the source file
    pub url: String,
}

impl QueueEntry {
    /// Create a new entry
    pub fn new(folder: impl Into<PathBuf>, index: u32, url: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            index,
            url: url.into(),
        }
    }

    /// File this entry is written to, given the configured extension
    pub fn target_path(&self, extension: &str) -> PathBuf {
        self.folder.join(format!("{}.{}", self.index, extension))
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.folder.display(), self.index)
    }
}

/// Event emitted during a download run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A source file was skipped while compiling the work
    SourceSkipped {
        /// Source file path
        path: PathBuf,
        /// Why it was skipped
        error: String,
    },

    /// Work compiled, downloading begins
    RunStarted {
        /// Number of entries in the run
        total: usize,
        /// Number of destination folders with at least one entry
        folders: usize,
    },

    /// An entry was downloaded and removed from the queue
    Downloaded {
        /// The entry
        entry: QueueEntry,
        /// File written
        path: PathBuf,
        /// Entries downloaded so far in this run
        downloaded: usize,
        /// Entries in the run
        total: usize,
    },

    /// An attempt failed and the entry went back to the queue
    AttemptFailed {
        /// The entry
        entry: QueueEntry,
        /// Failures of this entry so far
        attempt: u32,
        /// Error message
        error: String,
    },

    /// The retry policy gave up on an entry
    Abandoned {
        /// The entry
        entry: QueueEntry,
        /// Attempts made before giving up
        attempts: u32,
        /// Last error message
        error: String,
    },

    /// Every entry of a folder has left the queue
    FolderComplete {
        /// Destination folder
        folder: PathBuf,
    },

    /// The queue is empty
    RunComplete {
        /// Entries downloaded
        downloaded: usize,
        /// Entries abandoned
        abandoned: usize,
        /// Wall-clock duration of the run in milliseconds
        elapsed_ms: u64,
    },
}

/// Outcome of a finished run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    /// Entries compiled into the run
    pub total: usize,
    /// Entries downloaded
    pub downloaded: usize,
    /// Entries the retry policy gave up on (always empty with the default policy)
    pub abandoned: Vec<QueueEntry>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// True when every compiled entry was downloaded
    pub fn is_complete(&self) -> bool {
        self.downloaded == self.total
    }
}
