//! Frame-level voice classification.
//!
//! The `VoiceClassifier` trait is the primary extensibility point: the
//! detector is written once against it and never cares whether decisions
//! come from a model-backed acoustic frontend or the cheap RMS fallback.
//!
//! The backend is chosen once, at startup, based on whether a frontend
//! could be brought up — there is no mid-stream fallback. See
//! [`select_classifier`].

pub mod energy;
pub mod model;

pub use energy::EnergyClassifier;
pub use model::{AcousticFrontend, ModelClassifier, VoiceActivity};

use tracing::{info, warn};

/// Per-frame classification result.
///
/// `payload` is the byte representation of this frame for persistence. It
/// borrows from the classifier's scratch state, so it must be written out
/// (or copied) before the next `classify` call. Model-backed classifiers
/// may emit a different byte count than the input frame; callers must not
/// assume `payload.len() == frame.len() * 2`.
#[derive(Debug, Clone, Copy)]
pub struct Verdict<'a> {
    /// Whether this frame carries active speech.
    pub voiced: bool,
    /// Bytes to persist for this frame.
    pub payload: &'a [u8],
}

/// Contract for all classifier backends.
///
/// `classify` never blocks beyond its own computation and never fails for a
/// well-formed frame: a backend whose external model invocation errors out
/// degrades that frame to `voiced = false` instead of propagating.
pub trait VoiceClassifier: Send {
    /// Classify one raw PCM frame.
    fn classify(&mut self, frame: &[i16]) -> Verdict<'_>;

    /// Reset any internal state (hangover counters, model hidden state).
    fn reset(&mut self);
}

/// Serialize a raw frame as little-endian 16-bit PCM into `out`.
///
/// `out` is cleared first so classifiers can reuse one scratch buffer
/// across calls.
pub fn frame_to_le_bytes(frame: &[i16], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(frame.len() * 2);
    for &sample in frame {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}

/// Startup capability probe: wrap `frontend` in a [`ModelClassifier`] when
/// one could be brought up, otherwise fall back to the energy threshold.
///
/// The choice is fixed for the lifetime of the returned classifier.
pub fn select_classifier(
    frontend: Option<Box<dyn AcousticFrontend>>,
    energy_threshold: f32,
) -> Box<dyn VoiceClassifier> {
    match frontend {
        Some(frontend) => {
            info!("using model-backed voice classifier");
            Box::new(ModelClassifier::new(frontend))
        }
        None => {
            warn!(
                energy_threshold,
                "no acoustic frontend available, falling back to energy classifier"
            );
            Box::new(EnergyClassifier::new(energy_threshold))
        }
    }
}
