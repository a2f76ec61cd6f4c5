//! # onset-core
//!
//! On-device speech endpoint detection SDK.
//!
//! ## Architecture
//!
//! ```text
//! Microphone → MicCapture → SPSC RingBuffer → RingFrameSource
//!                                                  │ 320-sample frames
//!                                            VoiceClassifier
//!                                          (model │ energy fallback)
//!                                                  │
//!                                           EndpointDetector
//!                                      Waiting ⇄ Recording hysteresis
//!                                        │               │
//!                                   PreRollBuffer    SegmentSink
//!                                                 (wav │ memory │ …)
//! ```
//!
//! One `EndpointDetector::detect` call blocks until a speech segment was
//! committed, discarded as too short, or the stream ended silent. The
//! capture callback is zero-alloc; all heap work happens on the detector's
//! thread.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod classify;
pub mod config;
pub mod detector;
pub mod error;
pub mod preroll;
pub mod sink;
pub mod source;

// Convenience re-exports for downstream crates
pub use classify::{
    select_classifier, AcousticFrontend, EnergyClassifier, ModelClassifier, Verdict,
    VoiceActivity, VoiceClassifier,
};
pub use config::{DetectorConfig, FRAME_DURATION_MS, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
pub use detector::{DetectorOutcome, EndpointDetector, SegmentInfo};
pub use error::{OnsetError, Result};
pub use preroll::PreRollBuffer;
pub use sink::{Disposition, MemorySink, SegmentSink, SegmentWriter, WavSegmentSink};
pub use source::{FrameRead, FrameSource, RingFrameSource};
