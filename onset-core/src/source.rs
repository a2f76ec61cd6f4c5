//! Frame acquisition seam.
//!
//! The detector pulls fixed-size PCM frames through the `FrameSource`
//! trait and never learns where they come from. `RingFrameSource` is the
//! production implementation: it drains the capture ring buffer, resamples
//! to the detector rate, and hands out i16 frames with a bounded wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::audio::resample::RateConverter;
use crate::buffering::{AudioConsumer, Consumer};
use crate::error::Result;

/// Outcome of one frame read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRead {
    /// A complete frame was written into the caller's buffer.
    Frame,
    /// The source produced nothing within its deadline; the stream may
    /// still recover.
    TimedOut,
    /// The stream has ended; no more frames will ever arrive.
    Exhausted,
}

/// Pull-based supplier of fixed-size PCM frames.
///
/// `next_frame` blocks until a full frame is available, the source's
/// deadline passes, or the stream ends. Hardware failures are the `Err`
/// path and end the current detection attempt.
pub trait FrameSource: Send {
    fn next_frame(&mut self, buf: &mut [i16]) -> Result<FrameRead>;
}

/// How long `RingFrameSource` waits for a frame before reporting a timeout.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Sleep granularity while the ring is empty (avoids busy-wait burning a core).
const EMPTY_POLL: Duration = Duration::from_millis(2);

/// Samples drained from the ring per pop.
const DRAIN_CHUNK: usize = 1024;

/// `FrameSource` over the SPSC capture ring.
///
/// Drains f32 samples at the capture rate, resamples to the detector rate,
/// and converts to i16. Reports `Exhausted` once the capture side has shut
/// down and the ring is drained, `TimedOut` when a live stream stays empty
/// past the read deadline.
pub struct RingFrameSource {
    consumer: AudioConsumer,
    converter: RateConverter,
    /// Cleared by the capture side on shutdown.
    running: Arc<AtomicBool>,
    /// Resampled samples waiting to fill the next frame.
    staged: Vec<f32>,
    /// Scratch buffer for ring pops.
    raw: Vec<f32>,
    read_timeout: Duration,
}

impl RingFrameSource {
    /// Build a source bridging `capture_rate` to `detector_rate`.
    pub fn new(
        consumer: AudioConsumer,
        capture_rate: u32,
        detector_rate: u32,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let converter = RateConverter::new(capture_rate, detector_rate, DRAIN_CHUNK)?;
        Ok(Self {
            consumer,
            converter,
            running,
            staged: Vec::new(),
            raw: vec![0f32; DRAIN_CHUNK],
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Override the read deadline (default 500 ms).
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn take_frame(&mut self, buf: &mut [i16]) {
        for (dst, src) in buf.iter_mut().zip(&self.staged) {
            *dst = (src.clamp(-1.0, 1.0) * 32767.0) as i16;
        }
        self.staged.drain(..buf.len());
    }
}

impl FrameSource for RingFrameSource {
    fn next_frame(&mut self, buf: &mut [i16]) -> Result<FrameRead> {
        let deadline = Instant::now() + self.read_timeout;
        loop {
            if self.staged.len() >= buf.len() {
                self.take_frame(buf);
                return Ok(FrameRead::Frame);
            }

            let n = self.consumer.pop_slice(&mut self.raw);
            if n > 0 {
                let resampled = self.converter.process(&self.raw[..n]);
                self.staged.extend_from_slice(&resampled);
                continue;
            }

            if !self.running.load(Ordering::Acquire) {
                // Capture stopped and the ring is drained. A final partial
                // frame's worth of samples is dropped — sub-frame audio
                // cannot be classified.
                trace!(staged = self.staged.len(), "frame source exhausted");
                return Ok(FrameRead::Exhausted);
            }

            if Instant::now() >= deadline {
                return Ok(FrameRead::TimedOut);
            }

            std::thread::sleep(EMPTY_POLL);
        }
    }
}
