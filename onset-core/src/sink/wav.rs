//! WAV file segment sink backed by `hound`.
//!
//! Each segment becomes `<dir>/<id>.wav` (16-bit mono PCM at the
//! configured rate). A discarded segment's file is deleted on close, so a
//! rejected recording never leaves a partial artifact behind.
//!
//! Payloads are interpreted as little-endian 16-bit PCM. An append is not
//! required to be sample-aligned: a trailing half-sample byte is held back
//! and joined with the next append.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use super::{Disposition, SegmentSink, SegmentWriter};
use crate::error::{OnsetError, Result};

/// Sink producing one WAV file per segment in a target directory.
pub struct WavSegmentSink {
    dir: PathBuf,
    spec: WavSpec,
}

impl WavSegmentSink {
    /// Create a sink writing 16-bit mono WAV files at `sample_rate_hz`
    /// into `dir`. The directory is created if missing.
    pub fn new(dir: impl Into<PathBuf>, sample_rate_hz: u32) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            spec: WavSpec {
                channels: 1,
                sample_rate: sample_rate_hz,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        })
    }

    /// Path a segment with this id would be written to.
    pub fn segment_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.wav"))
    }
}

impl SegmentSink for WavSegmentSink {
    fn open(&mut self, id: &str) -> Result<Box<dyn SegmentWriter>> {
        let path = self.segment_path(id);
        let writer = WavWriter::create(&path, self.spec)
            .map_err(|e| OnsetError::sink("open", format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "segment file opened");
        Ok(Box::new(WavWriter16 {
            path,
            writer: Some(writer),
            pending: None,
            payload_bytes: 0,
        }))
    }
}

struct WavWriter16 {
    path: PathBuf,
    writer: Option<WavWriter<BufWriter<File>>>,
    /// Held-back byte from a non-sample-aligned append.
    pending: Option<u8>,
    /// Bytes persisted as whole samples. A pending half-sample byte is not
    /// counted until its sample is written.
    payload_bytes: u64,
}

impl WavWriter16 {
    fn remove_artifact(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            // Already gone is fine — the point is that nothing persists.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OnsetError::sink(
                "close",
                format!("removing {}: {e}", path.display()),
            )),
        }
    }
}

impl SegmentWriter for WavWriter16 {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| OnsetError::sink("append", "segment already closed"))?;

        let mut iter = bytes.iter().copied();
        if let Some(lo) = self.pending.take() {
            match iter.next() {
                Some(hi) => {
                    writer
                        .write_sample(i16::from_le_bytes([lo, hi]))
                        .map_err(|e| OnsetError::sink("append", e.to_string()))?;
                    self.payload_bytes += 2;
                }
                None => {
                    self.pending = Some(lo);
                    return Ok(());
                }
            }
        }
        loop {
            let Some(lo) = iter.next() else { break };
            match iter.next() {
                Some(hi) => {
                    writer
                        .write_sample(i16::from_le_bytes([lo, hi]))
                        .map_err(|e| OnsetError::sink("append", e.to_string()))?;
                    self.payload_bytes += 2;
                }
                None => {
                    self.pending = Some(lo);
                    break;
                }
            }
        }
        Ok(())
    }

    fn close(mut self: Box<Self>, disposition: Disposition) -> Result<u64> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| OnsetError::sink("close", "segment already closed"))?;

        match disposition {
            Disposition::Commit => {
                writer
                    .finalize()
                    .map_err(|e| OnsetError::sink("close", e.to_string()))?;
                debug!(path = %self.path.display(), bytes = self.payload_bytes, "segment committed");
                Ok(self.payload_bytes)
            }
            Disposition::Discard => {
                // Let hound write a consistent header, then delete the file.
                writer
                    .finalize()
                    .map_err(|e| OnsetError::sink("close", e.to_string()))?;
                Self::remove_artifact(&self.path)?;
                debug!(path = %self.path.display(), "segment discarded");
                Ok(0)
            }
        }
    }
}
