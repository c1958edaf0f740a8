//! Work compilation: source URL lists to a populated download queue
//!
//! Each source file becomes one destination folder named after the file's
//! stem. Non-empty lines become entries numbered 1, 2, 3, ... in line order;
//! empty lines are skipped without consuming a number. A source that cannot
//! be opened, read, or given a folder contributes nothing and is reported in
//! [`CompiledWork::skipped`].

use crate::error::{Error, Result};
use crate::queue::DownloadQueue;
use crate::types::QueueEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Folder name used when a source path has no file stem
const FALLBACK_FOLDER_NAME: &str = "untitled";

/// Result of compiling a set of source files
#[derive(Debug, Default)]
pub struct CompiledWork {
    /// Every entry to download
    pub queue: DownloadQueue,
    /// Number of entries added (non-empty lines across all compiled sources)
    pub total: usize,
    /// Sources that contributed nothing, with the reason
    pub skipped: Vec<SkippedSource>,
}

/// A source file that contributed no entries
#[derive(Debug)]
pub struct SkippedSource {
    /// The source file
    pub path: PathBuf,
    /// Why it was skipped
    pub error: Error,
}

/// Builds a [`DownloadQueue`] from source URL lists
#[derive(Clone, Debug)]
pub struct WorkCompiler {
    output_dir: PathBuf,
}

impl WorkCompiler {
    /// Compiler placing destination folders under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `<output_dir>/<source file name without extension>`
    pub fn destination_folder(&self, source: &Path) -> PathBuf {
        let name = source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| FALLBACK_FOLDER_NAME.into());
        self.output_dir.join(name)
    }

    /// Compile `sources` in order
    ///
    /// Sources sharing a stem share a folder; later ones continue numbering
    /// where the earlier ones stopped so no output file is claimed twice.
    pub async fn compile(&self, sources: &[PathBuf]) -> CompiledWork {
        let mut work = CompiledWork::default();
        let mut last_index: HashMap<PathBuf, u32> = HashMap::new();

        for source in sources {
            let (folder, urls) = match self.compile_source(source).await {
                Ok(compiled) => compiled,
                Err(e) => {
                    tracing::warn!(
                        source = %source.display(),
                        error = %e,
                        "Skipping source file"
                    );
                    work.skipped.push(SkippedSource {
                        path: source.clone(),
                        error: e,
                    });
                    continue;
                }
            };

            let mut index = last_index.get(&folder).copied().unwrap_or(0);
            if index > 0 {
                tracing::warn!(
                    source = %source.display(),
                    folder = %folder.display(),
                    first_index = index + 1,
                    "Source shares its folder with an earlier source, continuing numbering"
                );
            }

            let added = urls.len();
            for url in urls {
                index += 1;
                work.queue.push(QueueEntry::new(folder.clone(), index, url));
            }
            work.total += added;

            tracing::debug!(
                source = %source.display(),
                folder = %folder.display(),
                entries = added,
                "Compiled source file"
            );
            last_index.insert(folder, index);
        }

        work
    }

    /// Open one source, create its folder, and read its URLs
    async fn compile_source(&self, source: &Path) -> Result<(PathBuf, Vec<String>)> {
        let file = tokio::fs::File::open(source)
            .await
            .map_err(|e| Error::SourceOpen {
                path: source.to_path_buf(),
                source: e,
            })?;

        let folder = self.destination_folder(source);
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| Error::FolderCreate {
                path: folder.clone(),
                source: e,
            })?;

        let urls = read_urls(file).await.map_err(|e| Error::SourceRead {
            path: source.to_path_buf(),
            source: e,
        })?;

        Ok((folder, urls))
    }
}

/// Non-empty lines of `reader`, line terminators (`\n` or `\r\n`) stripped
async fn read_urls<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<Vec<String>> {
    let mut lines = BufReader::new(reader).split(b'\n');
    let mut urls = Vec::new();

    while let Some(mut line) = lines.next_segment().await? {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }
        urls.push(String::from_utf8_lossy(&line).into_owned());
    }

    Ok(urls)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    fn entries(work: &CompiledWork) -> Vec<(PathBuf, u32, String)> {
        work.queue
            .iter()
            .map(|e| (e.folder.clone(), e.index, e.url.clone()))
            .collect()
    }

    #[tokio::test]
    async fn blank_line_consumes_no_index() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let a = write_source(temp_dir.path(), "a.txt", "http://x/1.png\n\nhttp://x/2.png").await;

        let work = WorkCompiler::new(&out).compile(&[a]).await;

        let folder = out.join("a");
        assert_eq!(work.total, 2);
        assert!(work.skipped.is_empty());
        assert_eq!(work.queue.folder_count(), 1);

        let grouped = work.queue.entries_in(&folder);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1], "http://x/1.png");
        assert_eq!(grouped[&2], "http://x/2.png");
        assert!(folder.is_dir(), "destination folder must be created");
    }

    #[tokio::test]
    async fn total_counts_non_empty_lines_across_sources() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let sources = vec![
            write_source(temp_dir.path(), "one.txt", "u1\nu2\nu3\n").await,
            write_source(temp_dir.path(), "two.txt", "\n\nv1\n\n").await,
            write_source(temp_dir.path(), "empty.txt", "").await,
        ];

        let work = WorkCompiler::new(&out).compile(&sources).await;

        assert_eq!(work.total, 4);
        assert_eq!(work.queue.len(), 4);
        assert_eq!(work.queue.remaining_in(&out.join("one")), 3);
        assert_eq!(work.queue.remaining_in(&out.join("two")), 1);
        assert_eq!(work.queue.remaining_in(&out.join("empty")), 0);
        assert!(out.join("empty").is_dir(), "empty source still gets its folder");
    }

    #[tokio::test]
    async fn compiling_twice_assigns_identical_indices() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let sources = vec![
            write_source(temp_dir.path(), "cats.txt", "c1\n\nc2\nc3\n").await,
            write_source(temp_dir.path(), "dogs.txt", "d1\nd2\n").await,
        ];
        let compiler = WorkCompiler::new(&out);

        let first = compiler.compile(&sources).await;
        let second = compiler.compile(&sources).await;

        assert_eq!(entries(&first), entries(&second));
        assert_eq!(
            entries(&first),
            vec![
                (out.join("cats"), 1, "c1".to_string()),
                (out.join("cats"), 2, "c2".to_string()),
                (out.join("cats"), 3, "c3".to_string()),
                (out.join("dogs"), 1, "d1".to_string()),
                (out.join("dogs"), 2, "d2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unreadable_source_is_skipped_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let missing = temp_dir.path().join("missing.txt");
        let good = write_source(temp_dir.path(), "good.txt", "http://x/1\n").await;

        let work = WorkCompiler::new(&out).compile(&[missing.clone(), good]).await;

        assert_eq!(work.total, 1);
        assert_eq!(work.skipped.len(), 1);
        assert_eq!(work.skipped[0].path, missing);
        match &work.skipped[0].error {
            Error::SourceOpen { path, .. } => assert_eq!(path, &missing),
            other => panic!("expected SourceOpen, got {other:?}"),
        }
        assert!(!out.join("missing").exists(), "no folder for a source that never opened");
    }

    #[tokio::test]
    async fn folder_creation_failure_skips_source() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the output root should be
        let blocked = temp_dir.path().join("blocked");
        tokio::fs::write(&blocked, "not a directory").await.unwrap();
        let a = write_source(temp_dir.path(), "a.txt", "http://x/1\n").await;

        let work = WorkCompiler::new(&blocked).compile(&[a.clone()]).await;

        assert_eq!(work.total, 0);
        assert!(work.queue.is_empty());
        match &work.skipped[..] {
            [SkippedSource {
                path: source,
                error: Error::FolderCreate { path, .. },
            }] => {
                assert_eq!(source, &a);
                assert_eq!(path, &blocked.join("a"));
            }
            other => panic!("expected one FolderCreate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_failure_skips_whole_source() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        // Opening a directory succeeds; reading it fails
        let dir_source = temp_dir.path().join("x.txt");
        tokio::fs::create_dir(&dir_source).await.unwrap();
        let good = write_source(temp_dir.path(), "good.txt", "u1\nu2\n").await;

        let work = WorkCompiler::new(&out)
            .compile(&[dir_source.clone(), good])
            .await;

        assert_eq!(work.total, 2);
        assert_eq!(work.queue.remaining_in(&out.join("x")), 0);
        assert_eq!(work.queue.remaining_in(&out.join("good")), 2);
        match &work.skipped[..] {
            [SkippedSource {
                path: source,
                error: Error::SourceRead { path, .. },
            }] => {
                assert_eq!(source, &dir_source);
                assert_eq!(path, &dir_source);
            }
            other => panic!("expected one SourceRead error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn crlf_terminators_are_stripped_but_spaces_kept() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let a = write_source(temp_dir.path(), "a.txt", "http://x/1\r\n\r\n http://x/2 \r\n").await;

        let work = WorkCompiler::new(&out).compile(&[a]).await;

        let grouped = work.queue.entries_in(&out.join("a"));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1], "http://x/1");
        assert_eq!(grouped[&2], " http://x/2 ", "only the line terminator is removed");
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let path = temp_dir.path().join("a.txt");
        tokio::fs::write(&path, b"http://x/\xff.png\nhttp://x/ok.png\n")
            .await
            .unwrap();

        let work = WorkCompiler::new(&out).compile(&[path]).await;

        assert_eq!(work.total, 2);
        let grouped = work.queue.entries_in(&out.join("a"));
        assert_eq!(grouped[&1], "http://x/\u{FFFD}.png");
        assert_eq!(grouped[&2], "http://x/ok.png");
    }

    #[tokio::test]
    async fn same_stem_sources_continue_numbering() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        tokio::fs::create_dir_all(temp_dir.path().join("x")).await.unwrap();
        tokio::fs::create_dir_all(temp_dir.path().join("y")).await.unwrap();
        let first = write_source(temp_dir.path(), "x/set.txt", "a\nb\n").await;
        let second = write_source(temp_dir.path(), "y/set.txt", "c\n").await;

        let work = WorkCompiler::new(&out).compile(&[first, second]).await;

        let grouped = work.queue.entries_in(&out.join("set"));
        assert_eq!(work.total, 3);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&3], "c");
    }

    #[test]
    fn destination_folder_strips_only_last_extension() {
        let compiler = WorkCompiler::new("/out");

        assert_eq!(
            compiler.destination_folder(Path::new("lists/a.txt")),
            PathBuf::from("/out/a")
        );
        assert_eq!(
            compiler.destination_folder(Path::new("lists/album.2024.txt")),
            PathBuf::from("/out/album.2024")
        );
        assert_eq!(
            compiler.destination_folder(Path::new("..")),
            PathBuf::from("/out/untitled")
        );
    }
}
