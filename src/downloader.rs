//! Top-level downloader: configuration in, downloaded folders out
//!
//! [`PhotoDownloader`] wires the pieces together for one run: it checks the
//! configuration, compiles the source files into a queue, and hands the queue
//! to a [`RetryScheduler`] that publishes on the downloader's event channel.

use crate::compiler::{CompiledWork, WorkCompiler};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::progress::ProgressSink;
use crate::scheduler::RetryScheduler;
use crate::types::{Event, RunSummary};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered events per subscriber before it starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Downloads every URL listed in the configured source files
pub struct PhotoDownloader {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    event_tx: broadcast::Sender<Event>,
}

impl PhotoDownloader {
    /// Create a downloader fetching over HTTP
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a downloader using a custom [`Fetcher`]
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            event_tx,
        })
    }

    /// Subscribe to events of every later run
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Compile the configured sources without downloading anything
    ///
    /// Destination folders are created as a side effect.
    pub async fn compile(&self) -> CompiledWork {
        WorkCompiler::new(&self.config.output_dir)
            .compile(&self.config.sources)
            .await
    }

    /// Download everything, retrying failures per the retry policy
    ///
    /// With the default policy this returns only once every entry has been
    /// downloaded, however long that takes.
    pub async fn run(&self, progress: &mut dyn ProgressSink) -> Result<RunSummary> {
        if self.config.sources.is_empty() {
            return Err(Error::NoSources);
        }

        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::FolderCreate {
                path: output_dir.clone(),
                source: e,
            })?;

        let work = self.compile().await;
        for skipped in &work.skipped {
            self.emit_event(Event::SourceSkipped {
                path: skipped.path.clone(),
                error: skipped.error.to_string(),
            });
        }

        if work.total == 0 {
            tracing::warn!(
                sources = self.config.sources.len(),
                skipped = work.skipped.len(),
                "No URLs to download"
            );
            return Err(Error::NoEntries);
        }

        tracing::info!(
            output_dir = %output_dir.display(),
            sources = self.config.sources.len(),
            skipped = work.skipped.len(),
            total = work.total,
            "Compiled download queue"
        );

        let scheduler = RetryScheduler::from_config(Arc::clone(&self.fetcher), &self.config)
            .with_event_sender(self.event_tx.clone());
        Ok(scheduler.run(work.queue, progress).await)
    }

    fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
