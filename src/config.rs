//! Configuration types for photo-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration handed to [`PhotoDownloader`](crate::PhotoDownloader)
///
/// All fields have defaults, so a JSON document only needs the keys it wants
/// to change. Durations are expressed in milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root directory receiving one sub-folder per source file (default: "downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Resolved `.txt` source files, processed in this order
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Delay after every download attempt, success or failure (default: 100ms)
    #[serde(default = "default_attempt_delay", with = "duration_ms")]
    pub attempt_delay: Duration,

    /// Per-request timeout (default: none, the HTTP client's own defaults apply)
    #[serde(default, with = "optional_duration_ms")]
    pub request_timeout: Option<Duration>,

    /// Extension given to every downloaded file regardless of content type (default: "jpg")
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Retry behaviour for failed attempts
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            sources: Vec::new(),
            attempt_delay: default_attempt_delay(),
            request_timeout: None,
            file_extension: default_file_extension(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would otherwise fail late, in the middle of a run
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::config("output_dir", "output directory must not be empty"));
        }

        if self.file_extension.is_empty() {
            return Err(Error::config("file_extension", "file extension must not be empty"));
        }
        if self.file_extension.contains(['/', '\\']) || self.file_extension.starts_with('.') {
            return Err(Error::config(
                "file_extension",
                format!(
                    "file extension '{}' must be a bare extension like \"jpg\"",
                    self.file_extension
                ),
            ));
        }

        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                format!("backoff multiplier must be a finite number >= 1.0, got {multiplier}"),
            ));
        }

        if self.retry.max_attempts == Some(0) {
            return Err(Error::config(
                "retry.max_attempts",
                "max attempts must be at least 1 (omit it to retry forever)",
            ));
        }

        Ok(())
    }
}

/// Retry policy applied by the scheduler
///
/// The defaults retry every failed entry forever with the plain attempt
/// delay between tries. Bounding attempts, growing the delay, and dropping
/// permanent failures are all opt-in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts allowed per entry before it is abandoned (default: unlimited)
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Growth factor applied to the delay after consecutive failures of one entry (default: 1.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound on the post-failure delay (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_ms")]
    pub max_delay: Duration,

    /// Add random jitter to post-failure delays (default: false)
    #[serde(default)]
    pub jitter: bool,

    /// Abandon entries whose failure is classified as permanent, e.g. HTTP 404 (default: false)
    #[serde(default)]
    pub abandon_permanent: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff_multiplier: default_backoff_multiplier(),
            max_delay: default_max_delay(),
            jitter: false,
            abandon_permanent: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_attempt_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_file_extension() -> String {
    "jpg".to_string()
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization helper (milliseconds)
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper (milliseconds)
mod optional_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
