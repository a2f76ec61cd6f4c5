//! In-process segment sink.
//!
//! Keeps committed segments in a shared `Vec` so embedders (and tests) can
//! inspect exactly what the detector persisted, without touching the
//! filesystem. Discarded segments leave no trace, matching the removal
//! semantics of the file-backed sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Disposition, SegmentSink, SegmentWriter};
use crate::error::Result;

/// A committed in-memory segment.
#[derive(Debug, Clone)]
pub struct StoredSegment {
    pub id: String,
    pub bytes: Vec<u8>,
}

/// Segment sink that stores committed segments in memory.
#[derive(Default, Clone)]
pub struct MemorySink {
    segments: Arc<Mutex<Vec<StoredSegment>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all committed segments so far.
    pub fn committed(&self) -> Vec<StoredSegment> {
        self.segments.lock().clone()
    }
}

impl SegmentSink for MemorySink {
    fn open(&mut self, id: &str) -> Result<Box<dyn SegmentWriter>> {
        Ok(Box::new(MemoryWriter {
            id: id.to_string(),
            buf: Vec::new(),
            segments: Arc::clone(&self.segments),
        }))
    }
}

struct MemoryWriter {
    id: String,
    buf: Vec<u8>,
    segments: Arc<Mutex<Vec<StoredSegment>>>,
}

impl SegmentWriter for MemoryWriter {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn close(self: Box<Self>, disposition: Disposition) -> Result<u64> {
        match disposition {
            Disposition::Commit => {
                let size = self.buf.len() as u64;
                self.segments.lock().push(StoredSegment {
                    id: self.id,
                    bytes: self.buf,
                });
                Ok(size)
            }
            Disposition::Discard => Ok(0),
        }
    }
}
