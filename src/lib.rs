//! # photo-dl
//!
//! Bulk photo downloader: plain-text URL lists in, numbered image files out.
//!
//! Every `.txt` source file becomes a folder under the output directory,
//! named after the file. Each non-empty line is one URL, saved as
//! `<index>.jpg` where the index counts the non-empty lines from 1. Failed
//! downloads go to the back of the queue and are retried after everything
//! else, with a fixed delay after every attempt.
//!
//! ## Design Philosophy
//!
//! - **Gets everything** - By default a failed URL is retried until it succeeds
//! - **Deterministic** - The same sources always produce the same file names
//! - **Sequential** - One request in flight at a time, politely spaced
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use photo_dl::{Config, PhotoDownloader, SourceList, StatusLine};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sources = SourceList::new();
//!     sources.add(Path::new("lists"))?;
//!
//!     let config = Config {
//!         output_dir: "photos".into(),
//!         sources: sources.into_vec(),
//!         ..Default::default()
//!     };
//!
//!     let downloader = PhotoDownloader::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader.run(&mut StatusLine::stdout()).await?;
//!     println!("{} of {} downloaded", summary.downloaded, summary.total);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Source files to download queue
pub mod compiler;
/// Configuration types
pub mod config;
/// Top-level downloader
pub mod downloader;
/// Error types
pub mod error;
/// Single download attempts over HTTP
pub mod fetcher;
/// Progress counters and display
pub mod progress;
/// In-memory download queue
pub mod queue;
/// Retry policy and error classification
pub mod retry;
/// Retry scheduler driving the queue
pub mod scheduler;
/// Source file discovery
pub mod sources;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use compiler::{CompiledWork, SkippedSource, WorkCompiler};
pub use config::{Config, RetryConfig};
pub use downloader::PhotoDownloader;
pub use error::{Error, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use progress::{NoProgress, ProgressSink, ProgressSnapshot, StatusLine};
pub use queue::DownloadQueue;
pub use retry::IsRetryable;
pub use scheduler::{DownloadRun, RetryScheduler, Step};
pub use sources::{SourceList, collect_sources};
pub use types::{Event, QueueEntry, RunSummary};
