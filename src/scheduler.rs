//! Retry scheduler: drives a download queue until it is empty
//!
//! Entries are attempted one at a time, front of the queue first. A success
//! removes the entry; a failure sends it to the back of the queue so it is
//! retried on the next pass. After every attempt, whatever the outcome, the
//! scheduler sleeps for the attempt delay before the next one.
//!
//! With the default [`RetryConfig`] nothing is ever given up on: an entry
//! that can never succeed (a 404, say) keeps the run alive forever. Set
//! `max_attempts` or `abandon_permanent` to bound that.
//!
//! A run can be driven to completion with [`DownloadRun::run_to_completion`]
//! or one attempt at a time with [`DownloadRun::step`].

use crate::config::{Config, RetryConfig};
use crate::fetcher::Fetcher;
use crate::progress::{ProgressSink, RunCounters};
use crate::queue::DownloadQueue;
use crate::types::{Event, QueueEntry, RunSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Buffered events per subscriber before it starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// What one call to [`DownloadRun::step`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The entry was downloaded and removed from the queue
    Downloaded(QueueEntry),
    /// The attempt failed; the entry is back in the queue
    Retrying {
        /// The entry
        entry: QueueEntry,
        /// Failures of this entry so far
        failures: u32,
    },
    /// The retry policy gave up on the entry
    Abandoned(QueueEntry),
    /// The queue was already empty; nothing was attempted
    Finished,
}

/// Schedules download attempts for a queue
pub struct RetryScheduler {
    fetcher: Arc<dyn Fetcher>,
    attempt_delay: Duration,
    retry: RetryConfig,
    event_tx: broadcast::Sender<Event>,
}

impl RetryScheduler {
    /// Scheduler waiting `attempt_delay` after every attempt
    pub fn new(fetcher: Arc<dyn Fetcher>, attempt_delay: Duration, retry: RetryConfig) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            attempt_delay,
            retry,
            event_tx,
        }
    }

    /// Scheduler using the delay and retry policy from `config`
    pub fn from_config(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        Self::new(fetcher, config.attempt_delay, config.retry.clone())
    }

    /// Publish events on an existing channel instead of a private one
    pub fn with_event_sender(mut self, event_tx: broadcast::Sender<Event>) -> Self {
        self.event_tx = event_tx;
        self
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Begin a run over `queue`; counters start now
    pub fn start(&self, queue: DownloadQueue) -> DownloadRun<'_> {
        let counters = RunCounters::start(queue.len());
        tracing::info!(
            total = counters.total,
            folders = queue.folder_count(),
            "Starting download"
        );
        self.emit(Event::RunStarted {
            total: counters.total,
            folders: queue.folder_count(),
        });

        DownloadRun {
            scheduler: self,
            queue,
            counters,
            abandoned: Vec::new(),
        }
    }

    /// Run `queue` until it is empty
    pub async fn run(&self, queue: DownloadQueue, progress: &mut dyn ProgressSink) -> RunSummary {
        self.start(queue).run_to_completion(progress).await
    }

    fn emit(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}

/// One download run: the queue and counters it owns
pub struct DownloadRun<'a> {
    scheduler: &'a RetryScheduler,
    queue: DownloadQueue,
    counters: RunCounters,
    abandoned: Vec<QueueEntry>,
}

impl DownloadRun<'_> {
    /// Entries still to be finished
    pub fn queue(&self) -> &DownloadQueue {
        &self.queue
    }

    /// Counters of this run
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// True once every entry has been downloaded or abandoned
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Attempt the entry at the front of the queue, then wait before returning
    pub async fn step(&mut self, progress: &mut dyn ProgressSink) -> Step {
        let Some(next) = self.queue.peek_next().map(|p| p.entry().clone()) else {
            return Step::Finished;
        };
        let scheduler = self.scheduler;

        // The entry stays queued until the attempt resolves; a dropped step leaves it in place
        let result = scheduler.fetcher.fetch(&next).await;
        let Some(mut pending) = self.queue.take_next() else {
            return Step::Finished;
        };

        let (step, delay) = match result {
            Ok(path) => {
                let entry = pending.into_entry();
                self.counters.downloaded += 1;

                tracing::debug!(
                    folder = %entry.folder.display(),
                    index = entry.index,
                    path = %path.display(),
                    "Downloaded"
                );
                progress.update(&self.counters.snapshot());
                scheduler.emit(Event::Downloaded {
                    entry: entry.clone(),
                    path,
                    downloaded: self.counters.downloaded,
                    total: self.counters.total,
                });
                self.finish(&entry);

                (Step::Downloaded(entry), scheduler.attempt_delay)
            }
            Err(error) => {
                let failures = pending.record_failure();
                let delay = scheduler
                    .retry
                    .delay_after_failure(scheduler.attempt_delay, failures);

                if scheduler.retry.gives_up(failures, &error) {
                    let entry = pending.into_entry();
                    self.counters.abandoned += 1;

                    tracing::error!(
                        folder = %entry.folder.display(),
                        index = entry.index,
                        url = %entry.url,
                        attempts = failures,
                        error = %error,
                        "Giving up on download"
                    );
                    scheduler.emit(Event::Abandoned {
                        entry: entry.clone(),
                        attempts: failures,
                        error: error.to_string(),
                    });
                    self.finish(&entry);
                    self.abandoned.push(entry.clone());

                    (Step::Abandoned(entry), delay)
                } else {
                    let entry = pending.entry().clone();

                    tracing::warn!(
                        folder = %entry.folder.display(),
                        index = entry.index,
                        url = %entry.url,
                        attempt = failures,
                        error = %error,
                        "Download failed, retrying"
                    );
                    progress.retrying(&entry, &error);
                    scheduler.emit(Event::AttemptFailed {
                        entry: entry.clone(),
                        attempt: failures,
                        error: error.to_string(),
                    });
                    self.queue.requeue(pending);

                    (Step::Retrying { entry, failures }, delay)
                }
            }
        };

        tokio::time::sleep(delay).await;
        step
    }

    /// Step until the queue is empty
    pub async fn run_to_completion(mut self, progress: &mut dyn ProgressSink) -> RunSummary {
        while self.step(progress).await != Step::Finished {}

        let summary = self.summary();
        tracing::info!(
            downloaded = summary.downloaded,
            abandoned = summary.abandoned.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Download completed"
        );
        progress.finish(&summary);
        self.scheduler.emit(Event::RunComplete {
            downloaded: summary.downloaded,
            abandoned: summary.abandoned.len(),
            elapsed_ms: summary.elapsed.as_millis() as u64,
        });
        summary
    }

    /// Summary of the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.counters.total,
            downloaded: self.counters.downloaded,
            abandoned: self.abandoned.clone(),
            elapsed: self.counters.elapsed(),
        }
    }

    fn finish(&mut self, entry: &QueueEntry) {
        if self.queue.finish(entry) {
            tracing::debug!(folder = %entry.folder.display(), "Folder complete");
            self.scheduler.emit(Event::FolderComplete {
                folder: entry.folder.clone(),
            });
        }
    }
}
