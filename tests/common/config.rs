//! Test configuration helpers for creating downloaders over temp directories

use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use photo_dl::{Config, PhotoDownloader, RetryConfig};

/// Configuration writing into `<temp>/out` with no delay between attempts
pub fn test_config(temp_dir: &TempDir, sources: Vec<PathBuf>) -> Config {
    Config {
        output_dir: temp_dir.path().join("out"),
        sources,
        attempt_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Same as [`test_config`] with a custom retry policy
pub fn test_config_with_retry(
    temp_dir: &TempDir,
    sources: Vec<PathBuf>,
    retry: RetryConfig,
) -> Config {
    Config {
        retry,
        ..test_config(temp_dir, sources)
    }
}

/// HTTP downloader over `config`
pub fn create_downloader(config: Config) -> PhotoDownloader {
    PhotoDownloader::new(config).expect("valid test config")
}
