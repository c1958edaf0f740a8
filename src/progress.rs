//! Run counters and the single-line progress display

use crate::error::Error;
use crate::types::{QueueEntry, RunSummary};
use std::io::Write;
use std::time::{Duration, Instant};

/// Counters owned by one download run
#[derive(Clone, Debug)]
pub struct RunCounters {
    /// Entries compiled into the run
    pub total: usize,
    /// Entries downloaded so far
    pub downloaded: usize,
    /// Entries given up on so far
    pub abandoned: usize,
    started_at: Instant,
}

impl RunCounters {
    /// Start counting a run of `total` entries now
    pub fn start(total: usize) -> Self {
        Self {
            total,
            downloaded: 0,
            abandoned: 0,
            started_at: Instant::now(),
        }
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Point-in-time view for display
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            downloaded: self.downloaded,
            total: self.total,
            elapsed: self.elapsed(),
        }
    }
}

/// Progress at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Entries downloaded
    pub downloaded: usize,
    /// Entries in the run
    pub total: usize,
    /// Time since the run started
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Average photos per second since the start; 0 before any time has passed
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.downloaded as f64 / secs
        } else {
            0.0
        }
    }

    /// `Downloaded: 3/10 | Time elapsed: 00:01:05 | Speed: 0.05 photos/sec`
    pub fn render(&self) -> String {
        format!(
            "Downloaded: {}/{} | Time elapsed: {} | Speed: {:.2} photos/sec",
            self.downloaded,
            self.total,
            format_elapsed(self.elapsed),
            self.throughput()
        )
    }
}

/// `HH:MM:SS`; hours keep counting past 99
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Receives progress from the scheduler
pub trait ProgressSink: Send {
    /// An entry was downloaded
    fn update(&mut self, snapshot: &ProgressSnapshot);

    /// An attempt failed and the entry will be retried
    fn retrying(&mut self, entry: &QueueEntry, error: &Error);

    /// The queue is empty
    fn finish(&mut self, summary: &RunSummary);
}

/// Discards all progress
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _snapshot: &ProgressSnapshot) {}
    fn retrying(&mut self, _entry: &QueueEntry, _error: &Error) {}
    fn finish(&mut self, _summary: &RunSummary) {}
}

/// Writes a status line that is rewritten in place with `\r`
///
/// Output errors are ignored; the display is best effort and must not stop
/// a run.
#[derive(Debug)]
pub struct StatusLine<W: Write + Send> {
    out: W,
}

impl StatusLine<std::io::Stdout> {
    /// Status line on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StatusLine<W> {
    /// Status line on any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn overwrite(&mut self, line: &str) {
        write!(self.out, "\r{line}").ok();
        self.out.flush().ok();
    }
}

impl<W: Write + Send> ProgressSink for StatusLine<W> {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        self.overwrite(&snapshot.render());
    }

    fn retrying(&mut self, entry: &QueueEntry, _error: &Error) {
        self.overwrite(&format!("Failed to download: {}. Retrying...", entry.index));
    }

    fn finish(&mut self, summary: &RunSummary) {
        if summary.abandoned.is_empty() {
            writeln!(self.out, "\nDownload completed.").ok();
        } else {
            writeln!(
                self.out,
                "\nDownload finished: {} of {} downloaded, {} abandoned.",
                summary.downloaded,
                summary.total,
                summary.abandoned.len()
            )
            .ok();
        }
        self.out.flush().ok();
    }
}
