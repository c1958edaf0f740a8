//! Source list fixtures and mock image server helpers

use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// First bytes of a JPEG file, enough to tell bodies apart
pub const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Body served for `/<name>`: the JPEG magic followed by the name
pub fn image_body(name: &str) -> Vec<u8> {
    let mut body = JPEG_MAGIC.to_vec();
    body.extend_from_slice(name.as_bytes());
    body
}

/// Write a source list under `dir`, creating parent directories
pub async fn write_source(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .expect("create source dir");
    }
    tokio::fs::write(&path, lines.join("\n"))
        .await
        .expect("write source list");
    path
}

/// Serve `image_body(name)` at `/<name>` with 200
pub async fn mount_image(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body(name)))
        .mount(server)
        .await;
}

/// Serve `status` at `/<name>` for the first `failures` requests, then the image
pub async fn mount_flaky_image(server: &MockServer, name: &str, status: u16, failures: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(failures)
        .with_priority(1)
        .mount(server)
        .await;
    mount_image(server, name).await;
}

/// Serve `status` at `/<name>` forever
pub async fn mount_broken(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Full URL of `/<name>` on `server`
pub fn url(server: &MockServer, name: &str) -> String {
    format!("{}/{}", server.uri(), name)
}
