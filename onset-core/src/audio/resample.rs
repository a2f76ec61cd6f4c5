//! Sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! Capture devices rarely run at the detector's 16 kHz — 44.1 and 48 kHz
//! are the common native rates. `RateConverter` bridges the gap on the
//! detector's thread, where allocation is allowed. When the rates already
//! match no rubato session is created and `process` is a plain copy.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::error;

use crate::error::{OnsetError, Result};

/// Converts mono f32 audio from one fixed rate to another.
pub struct RateConverter {
    /// `None` when input rate == output rate (passthrough).
    inner: Option<FastFixedIn<f32>>,
    /// Input samples waiting for a full rubato chunk.
    pending: Vec<f32>,
    /// Input samples rubato consumes per call.
    chunk: usize,
    /// Pre-allocated rubato output: `[1][output_frames_max]`.
    out_frame: Vec<Vec<f32>>,
}

impl RateConverter {
    /// Create a converter from `input_rate` to `output_rate` Hz, feeding
    /// rubato `chunk` input samples at a time.
    ///
    /// # Errors
    /// `OnsetError::AudioStream` if rubato rejects the configuration.
    pub fn new(input_rate: u32, output_rate: u32, chunk: usize) -> Result<Self> {
        if input_rate == output_rate {
            return Ok(Self {
                inner: None,
                pending: Vec::new(),
                chunk,
                out_frame: Vec::new(),
            });
        }

        let ratio = output_rate as f64 / input_rate as f64;
        let inner = FastFixedIn::<f32>::new(
            ratio,
            1.0, // fixed ratio, no dynamic adjustment
            PolynomialDegree::Cubic,
            chunk,
            1, // mono
        )
        .map_err(|e| OnsetError::AudioStream(format!("resampler init: {e}")))?;

        let out_frame = vec![vec![0f32; inner.output_frames_max()]; 1];
        tracing::info!(input_rate, output_rate, chunk, "resampling enabled");

        Ok(Self {
            inner: Some(inner),
            pending: Vec::new(),
            chunk,
            out_frame,
        })
    }

    /// Feed input samples, returning whatever output is ready (possibly
    /// empty while a partial chunk accumulates). In passthrough mode the
    /// input is returned as-is.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        let Some(ref mut inner) = self.inner else {
            return samples.to_vec();
        };

        self.pending.extend_from_slice(samples);
        let mut out = Vec::new();

        while self.pending.len() >= self.chunk {
            match inner.process_into_buffer(
                &[&self.pending[..self.chunk]],
                &mut self.out_frame,
                None,
            ) {
                Ok((_consumed, produced)) => out.extend_from_slice(&self.out_frame[0][..produced]),
                Err(e) => error!("resampler process error: {e}"),
            }
            self.pending.drain(..self.chunk);
        }

        out
    }

    /// `true` when no rate conversion happens.
    pub fn is_passthrough(&self) -> bool {
        self.inner.is_none()
    }
}
