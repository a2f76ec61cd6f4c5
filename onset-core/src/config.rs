//! Detector configuration and the reference timing constants.
//!
//! All values are plain startup constants — there is no runtime negotiation.
//! The defaults reproduce the reference tuning: 20 ms frames at 16 kHz,
//! 160 ms of sustained speech to open a segment, 1 s of sustained silence to
//! close it, a 15 s hard ceiling, and a 0.5 s minimum committed size.

use serde::{Deserialize, Serialize};

/// Sample rate the detector operates at (Hz).
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Samples per frame: 320 samples = 20 ms at 16 kHz.
pub const FRAME_SIZE_SAMPLES: usize = 320;

/// Frame duration in milliseconds (derived).
pub const FRAME_DURATION_MS: f32 = (FRAME_SIZE_SAMPLES as f32 * 1000.0) / SAMPLE_RATE_HZ as f32;

/// Tuning for one `EndpointDetector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Sample rate of the incoming frames (Hz). Default: 16000.
    pub sample_rate_hz: u32,
    /// Samples per frame. Default: 320 (20 ms).
    pub frame_size_samples: usize,
    /// Consecutive voiced frames required to open a segment.
    /// Default: 8 (160 ms). Also sizes the pre-roll ring.
    pub min_speech_frames_to_start: u32,
    /// Consecutive silent frames that close a segment. Default: 50 (1 s).
    pub max_silent_frames_to_stop: u32,
    /// Hard ceiling on one recording, in stream-clock milliseconds.
    /// Default: 15000.
    pub max_recording_ms: u64,
    /// RMS threshold for the energy classifier, on the i16 sample scale.
    /// Default: 800.0.
    pub energy_threshold: f32,
    /// Minimum persisted payload size for a segment to be committed rather
    /// than discarded. Default: 16000 bytes (0.5 s of 16-bit 16 kHz mono).
    pub min_segment_bytes: u64,
    /// Consecutive frame-source timeouts tolerated before the current
    /// detection attempt is abandoned. Default: 3.
    pub max_consecutive_timeouts: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ,
            frame_size_samples: FRAME_SIZE_SAMPLES,
            min_speech_frames_to_start: 8,
            max_silent_frames_to_stop: 50,
            max_recording_ms: 15_000,
            energy_threshold: 800.0,
            min_segment_bytes: 16_000,
            max_consecutive_timeouts: 3,
        }
    }
}

impl DetectorConfig {
    /// Duration of one frame in milliseconds at the configured rate.
    pub fn frame_duration_ms(&self) -> f32 {
        (self.frame_size_samples as f32 * 1000.0) / self.sample_rate_hz as f32
    }

    /// Number of frames the pre-roll ring retains. Equals the start
    /// threshold so a freshly opened segment always begins with the frames
    /// that triggered it.
    pub fn pre_roll_frames(&self) -> usize {
        self.min_speech_frames_to_start as usize
    }
}
