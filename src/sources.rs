//! Source ingestion: turn user-selected paths into `.txt` URL lists
//!
//! A `.txt` file is taken as is. A directory contributes every `.txt` file
//! beneath it, recursively, visited in file-name order within each directory.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix a source URL list's file name must end with (case-insensitive)
const SOURCE_SUFFIX: &str = ".txt";

/// Resolve `path` into the source files it names
///
/// Unreadable directory entries below `path` are skipped with a warning.
pub fn collect_sources(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        if !is_source_file(path) {
            return Err(Error::NotTextFile(path.to_path_buf()));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry while scanning sources");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_source_file(path))
        .collect();

    tracing::debug!(
        path = %path.display(),
        found = files.len(),
        "Scanned directory for source files"
    );
    Ok(files)
}

/// Any file name ending in `.txt`, including a bare `.txt`
fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(SOURCE_SUFFIX)
        })
        .unwrap_or(false)
}

/// Ordered, duplicate-free selection of source files
#[derive(Clone, Debug, Default)]
pub struct SourceList {
    files: Vec<PathBuf>,
}

impl SourceList {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file or directory; returns how many new files were added
    ///
    /// Files already selected are not added twice.
    pub fn add(&mut self, path: &Path) -> Result<usize> {
        let before = self.files.len();
        for file in collect_sources(path)? {
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }
        Ok(self.files.len() - before)
    }

    /// Drop every selected file
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Selected files in the order they were added
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of selected files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing is selected
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume into the file list, ready for [`Config::sources`](crate::Config::sources)
    pub fn into_vec(self) -> Vec<PathBuf> {
        self.files
    }
}
