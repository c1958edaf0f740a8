//! Custom test assertions for output layout and events

use std::path::Path;
use photo_dl::Event;
use tokio::sync::broadcast;

/// Assert `<folder>/<index>.jpg` exists with exactly `expected` as content
pub async fn assert_image(folder: &Path, index: u32, expected: &[u8]) {
    let path = folder.join(format!("{index}.jpg"));
    let actual = tokio::fs::read(&path)
        .await
        .unwrap_or_else(|e| panic!("{} should exist: {e}", path.display()));
    assert_eq!(actual, expected, "unexpected content in {}", path.display());
}

/// Sorted file names directly inside `folder`
pub async fn file_names(folder: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await.expect("read folder");
    while let Some(entry) = entries.next_entry().await.expect("read entry") {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    names
}

/// Everything already sent on `events`
pub fn drain_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}
