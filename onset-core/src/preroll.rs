//! Fixed-capacity ring of the most recent raw frames.
//!
//! The detector keeps this ring warm while it waits for speech: every frame,
//! voiced or not, is pushed. When a segment opens, the ring is replayed
//! oldest-first into the sink before any live frame, so the first phoneme of
//! an utterance is not lost to classification latency.
//!
//! Replaying is a snapshot, not a consume — the ring keeps accumulating
//! afterwards, which makes it free to leave warm between detection cycles.

/// Circular buffer holding the last `capacity_frames` frames of raw PCM.
///
/// Storage is one flat allocation of `capacity_frames * frame_size` samples;
/// the write cursor wraps at frame granularity.
pub struct PreRollBuffer {
    samples: Vec<i16>,
    frame_size: usize,
    capacity_frames: usize,
    /// Next frame slot to overwrite.
    cursor: usize,
    /// Frames pushed so far, saturating at `capacity_frames`.
    filled: usize,
}

impl PreRollBuffer {
    /// Create a ring for `capacity_frames` frames of `frame_size` samples.
    pub fn new(capacity_frames: usize, frame_size: usize) -> Self {
        Self {
            samples: vec![0i16; capacity_frames * frame_size],
            frame_size,
            capacity_frames,
            cursor: 0,
            filled: 0,
        }
    }

    /// Push one frame, overwriting the oldest slot when full.
    ///
    /// `frame` must be exactly one frame long; the ring only ever holds
    /// fixed-size frames.
    pub fn push(&mut self, frame: &[i16]) {
        debug_assert_eq!(frame.len(), self.frame_size);
        if self.capacity_frames == 0 {
            return;
        }
        let start = self.cursor * self.frame_size;
        self.samples[start..start + self.frame_size].copy_from_slice(frame);
        self.cursor = (self.cursor + 1) % self.capacity_frames;
        self.filled = (self.filled + 1).min(self.capacity_frames);
    }

    /// Iterate the retained frames oldest-first without consuming them.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &[i16]> + '_ {
        // When not yet full the oldest frame is slot 0; afterwards it is
        // the slot the cursor is about to overwrite.
        let first = if self.filled < self.capacity_frames {
            0
        } else {
            self.cursor
        };
        (0..self.filled).map(move |i| {
            let slot = (first + i) % self.capacity_frames;
            let start = slot * self.frame_size;
            &self.samples[start..start + self.frame_size]
        })
    }

    /// Number of frames currently retained.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Forget all retained frames. The allocation is kept.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.filled = 0;
    }
}
