//! Error types for photo-dl
//!
//! Every failure the library can report is a variant of [`Error`]. Per-entry
//! failures ([`Error::Fetch`], [`Error::HttpStatus`], [`Error::Write`]) never
//! abort a run: the scheduler logs them and puts the entry back in the queue.
//! Per-source failures ([`Error::SourceOpen`], [`Error::SourceRead`],
//! [`Error::FolderCreate`]) skip that source and are returned alongside the
//! compiled work.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for photo-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "file_extension")
        key: Option<String>,
    },

    /// A source URL list could not be opened
    #[error("failed to open source file {}: {source}", path.display())]
    SourceOpen {
        /// Path of the source file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source URL list failed part-way through reading
    #[error("failed to read source file {}: {source}", path.display())]
    SourceRead {
        /// Path of the source file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Path handed to source ingestion does not exist
    #[error("path not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Path handed to source ingestion is a file without the `.txt` extension
    #[error("not a .txt file: {}", .0.display())]
    NotTextFile(PathBuf),

    /// A destination folder could not be created
    #[error("failed to create folder {}: {source}", path.display())]
    FolderCreate {
        /// Folder that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure while requesting or streaming a URL
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// URL being fetched
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with something other than `200 OK`
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// URL being fetched
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// Local disk failure while writing a downloaded body
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No source files were supplied
    #[error("no source files selected")]
    NoSources,

    /// Source files were supplied but none contributed a single URL
    #[error("no URLs found in the selected source files")]
    NoEntries,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}
