//! Energy-threshold fallback classifier.
//!
//! Computes the RMS amplitude of each raw frame in floating point and
//! thresholds it on the i16 sample scale (reference threshold: 800).
//! The persisted payload is the input frame unchanged, re-serialised as
//! little-endian PCM.
//!
//! Selected at startup when the richer acoustic frontend cannot be
//! initialised (e.g. constrained memory); never swapped in mid-stream.

use super::{frame_to_le_bytes, Verdict, VoiceClassifier};

/// RMS-threshold voice classifier.
#[derive(Debug)]
pub struct EnergyClassifier {
    /// Frames whose RMS exceeds this (on the i16 scale) are voiced.
    threshold: f32,
    /// Scratch payload buffer, reused every call.
    scratch: Vec<u8>,
}

impl EnergyClassifier {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            scratch: Vec::new(),
        }
    }

    /// Root-mean-square of a sample slice, on the raw i16 scale.
    fn rms(frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }
        let sum_squares: i64 = frame
            .iter()
            .map(|&s| {
                let s = s as i64;
                s * s
            })
            .sum();
        ((sum_squares as f64 / frame.len() as f64).sqrt()) as f32
    }
}

impl VoiceClassifier for EnergyClassifier {
    fn classify(&mut self, frame: &[i16]) -> Verdict<'_> {
        let voiced = Self::rms(frame) > self.threshold;
        frame_to_le_bytes(frame, &mut self.scratch);
        Verdict {
            voiced,
            payload: &self.scratch,
        }
    }

    fn reset(&mut self) {
        // Stateless between frames; nothing to clear.
    }
}
