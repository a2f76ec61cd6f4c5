//! Segment persistence seam.
//!
//! One detected speech segment goes through an open → append* → close
//! lifecycle. The close carries the final disposition: `Commit` keeps the
//! artifact, `Discard` removes it so no truncated sub-threshold clips
//! persist. The detector never touches storage directly — it only drives
//! this seam.

pub mod memory;
pub mod wav;

pub use memory::MemorySink;
pub use wav::WavSegmentSink;

use crate::error::Result;

/// Final disposition of a recorded segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep the artifact; the segment met the minimum-size policy.
    Commit,
    /// Remove the artifact; the recording was a false alarm.
    Discard,
}

/// Factory for per-segment writers.
pub trait SegmentSink: Send {
    /// Open a new segment under the given identifier.
    fn open(&mut self, id: &str) -> Result<Box<dyn SegmentWriter>>;
}

/// An open segment. Owns the underlying storage handle until closed.
pub trait SegmentWriter: Send {
    /// Append payload bytes to the segment.
    fn append(&mut self, bytes: &[u8]) -> Result<()>;

    /// Close the segment. On `Commit`, returns the persisted byte size of
    /// the payload; on `Discard`, the artifact is removed and 0 returned.
    fn close(self: Box<Self>, disposition: Disposition) -> Result<u64>;
}
