//! Download execution: one HTTP GET for one queue entry
//!
//! A [`Fetcher`] makes exactly one attempt per call and never retries on its
//! own; retrying is the scheduler's job. [`HttpFetcher`] treats anything but
//! `200 OK` as a failure and only creates the target file once the status
//! has been checked.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::QueueEntry;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Performs a single download attempt for a queue entry
///
/// Implementations return the path of the written file on success. The
/// scheduler only holds a `dyn Fetcher`, so tests and embedders can swap in
/// their own transport.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `entry`, returning the file written
    async fn fetch(&self, entry: &QueueEntry) -> Result<PathBuf>;
}

/// [`Fetcher`] backed by a `reqwest` client
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    extension: String,
}

impl HttpFetcher {
    /// Build a fetcher from the run configuration
    ///
    /// Without `request_timeout` no timeout is set and a stalled server can
    /// hold the run indefinitely.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Config {
            message: format!("Failed to create HTTP client: {}", e),
            key: None,
        })?;

        Ok(Self::with_client(client, config.file_extension.clone()))
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::Client, extension: impl Into<String>) -> Self {
        Self {
            client,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, entry: &QueueEntry) -> Result<PathBuf> {
        let fetch_error = |source| Error::Fetch {
            url: entry.url.clone(),
            source,
        };

        let mut response = self
            .client
            .get(&entry.url)
            .send()
            .await
            .map_err(fetch_error)?;

        if response.status() != StatusCode::OK {
            return Err(Error::HttpStatus {
                url: entry.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let path = entry.target_path(&self.extension);
        let write_error = |source| Error::Write {
            path: path.clone(),
            source,
        };

        // Truncates any earlier file; a failure part-way leaves the partial file behind
        let mut file = tokio::fs::File::create(&path).await.map_err(write_error)?;
        while let Some(chunk) = response.chunk().await.map_err(fetch_error)? {
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;

        Ok(path)
    }
}
