//! Model-backed classifier over an external acoustic frontend.
//!
//! The frontend (feature extraction, VAD model, optional denoising) lives
//! behind the `AcousticFrontend` trait so onset-core carries none of its
//! math. Frontends report a tri-state activity signal; this wrapper
//! collapses it to a boolean where only `Active` counts as voiced —
//! `Transitioning` and `Inactive` are both treated as silence for
//! hysteresis purposes. That collapse matches the reference behaviour and
//! is kept as-is even though it can flap near speech boundaries.

use tracing::debug;

use super::{frame_to_le_bytes, Verdict, VoiceClassifier};
use crate::error::Result;

/// Tri-state voice-activity signal reported by an acoustic frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceActivity {
    /// Sustained, confident speech.
    Active,
    /// Boundary state — onset or tail of an utterance, or model uncertainty.
    Transitioning,
    /// No speech.
    Inactive,
}

/// Output of one frontend invocation.
#[derive(Debug, Clone)]
pub struct FrontendVerdict {
    pub activity: VoiceActivity,
    /// The bytes the frontend emits for this frame. May be a processed or
    /// re-encoded rendition of the input, and may differ in length from it.
    pub audio: Vec<u8>,
}

/// External feature/VAD pipeline fed one raw frame at a time.
///
/// Implementors may be stateful (RNN hidden state, noise estimates).
/// `analyze` may fail; the wrapping classifier absorbs failures rather
/// than propagating them.
pub trait AcousticFrontend: Send {
    fn analyze(&mut self, frame: &[i16]) -> Result<FrontendVerdict>;
    fn reset(&mut self);
}

/// `VoiceClassifier` adapter over an [`AcousticFrontend`].
pub struct ModelClassifier {
    frontend: Box<dyn AcousticFrontend>,
    /// Holds the frontend's emitted bytes (or the raw frame on failure)
    /// so the verdict can borrow them.
    scratch: Vec<u8>,
}

impl ModelClassifier {
    pub fn new(frontend: Box<dyn AcousticFrontend>) -> Self {
        Self {
            frontend,
            scratch: Vec::new(),
        }
    }
}

impl VoiceClassifier for ModelClassifier {
    fn classify(&mut self, frame: &[i16]) -> Verdict<'_> {
        match self.frontend.analyze(frame) {
            Ok(verdict) => {
                self.scratch = verdict.audio;
                Verdict {
                    voiced: verdict.activity == VoiceActivity::Active,
                    payload: &self.scratch,
                }
            }
            Err(e) => {
                // Degrade to a silent frame — forward progress matters more
                // than one frame's verdict.
                debug!("frontend analyze failed, treating frame as silent: {e}");
                frame_to_le_bytes(frame, &mut self.scratch);
                Verdict {
                    voiced: false,
                    payload: &self.scratch,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.frontend.reset();
    }
}
