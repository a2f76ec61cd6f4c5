//! Delivery of committed segments to the collection server.
//!
//! One blocking POST per WAV file with `Content-Type: audio/wav`. The
//! caller decides what to do with a non-success status — the file stays on
//! disk either way, so nothing is lost to a flaky network.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Body, Client};
use reqwest::StatusCode;
use tracing::info;

/// Blocking HTTP uploader for finished segments.
pub struct Uploader {
    client: Client,
    server_url: String,
}

impl Uploader {
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            server_url: server_url.into(),
        })
    }

    /// Upload one WAV file, streaming it from disk. Returns the server's
    /// status code; transport failures are the `Err` path.
    pub fn upload_wav(&self, path: &Path) -> Result<StatusCode> {
        let file = File::open(path)
            .with_context(|| format!("opening segment {}", path.display()))?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);

        let response = self
            .client
            .post(&self.server_url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(Body::sized(file, len))
            .send()
            .with_context(|| format!("uploading {}", path.display()))?;

        let status = response.status();
        info!(path = %path.display(), %status, bytes = len, "upload finished");
        Ok(status)
    }
}
