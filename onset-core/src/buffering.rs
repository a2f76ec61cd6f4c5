//! Lock-free SPSC ring buffer between the capture callback and the detector.
//!
//! Uses `ringbuf::HeapRb<f32>` whose wait-free `push_slice` is safe to call
//! from the real-time audio callback. The consumer side is drained by
//! [`crate::source::RingFrameSource`] on the detector's thread.

use ringbuf::{traits::Split, HeapRb};

pub use ringbuf::traits::{Consumer, Producer};

/// Producer half — held by the audio callback thread.
pub type AudioProducer = ringbuf::HeapProd<f32>;

/// Consumer half — held by the detector thread.
pub type AudioConsumer = ringbuf::HeapCons<f32>;

/// Buffer capacity: 2^19 = 524 288 f32 samples ≈ 10.9 s at 48 kHz.
/// The detector drains continuously, so this only needs to absorb
/// scheduling hiccups, not whole utterances.
pub const RING_CAPACITY: usize = 1 << 19;

/// Create a matched producer/consumer pair backed by a heap ring buffer.
pub fn create_audio_ring() -> (AudioProducer, AudioConsumer) {
    HeapRb::<f32>::new(RING_CAPACITY).split()
}
