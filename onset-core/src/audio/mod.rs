//! Microphone capture via the cpal backend.
//!
//! # Design constraints
//!
//! The cpal input callback runs on an OS audio thread at elevated priority.
//! It must not allocate, block on a lock, or perform I/O. The callback here
//! only downmixes into a pre-grown scratch buffer and pushes into the SPSC
//! ring producer, whose `push_slice` is lock-free.
//!
//! # Threading note
//!
//! `cpal::Stream` is `!Send` on Windows and macOS. `MicCapture` must be
//! created and dropped on the same OS thread — in practice, the dedicated
//! capture thread the application spawns.

pub mod resample;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "audio-cpal")]
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, SampleRate, Stream, StreamConfig,
};
#[cfg(feature = "audio-cpal")]
use tracing::{error, info, warn};

#[cfg(feature = "audio-cpal")]
use crate::buffering::Producer;
use crate::buffering::AudioProducer;
use crate::error::{OnsetError, Result};

/// Handle to an active capture stream.
///
/// **Not `Send`** — create and drop on the same thread.
pub struct MicCapture {
    /// Kept alive so the stream is not dropped prematurely.
    #[cfg(feature = "audio-cpal")]
    _stream: Stream,
    /// Cleared to make the callback a no-op and let frame sources observe
    /// end of stream.
    running: Arc<AtomicBool>,
    /// Native capture rate reported by the device (Hz).
    pub sample_rate: u32,
}

/// Downmix interleaved multi-channel samples to mono f32 into `out`.
///
/// `out` is a reusable scratch buffer; it is resized, not reallocated,
/// once warm.
#[cfg(feature = "audio-cpal")]
fn downmix<T: Copy>(data: &[T], channels: usize, to_f32: impl Fn(T) -> f32, out: &mut Vec<f32>) {
    let frames = data.len() / channels;
    out.resize(frames, 0.0);
    for (f, slot) in out.iter_mut().enumerate() {
        let base = f * channels;
        let mut sum = 0f32;
        for c in 0..channels {
            sum += to_f32(data[base + c]);
        }
        *slot = sum / channels as f32;
    }
}

#[cfg(feature = "audio-cpal")]
impl MicCapture {
    /// Open an input device by preferred name, falling back to the system
    /// default and then the first available input.
    ///
    /// Pushes mono f32 samples at the device's native rate into `producer`.
    ///
    /// # Errors
    /// `OnsetError::NoDefaultInputDevice` when no microphone exists,
    /// `OnsetError::AudioStream` when cpal rejects the stream.
    pub fn open(
        mut producer: AudioProducer,
        running: Arc<AtomicBool>,
        preferred_name: Option<&str>,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let mut device = None;
        if let Some(wanted) = preferred_name {
            match host.input_devices() {
                Ok(mut devices) => {
                    device =
                        devices.find(|d| d.name().map(|n| n == wanted).unwrap_or(false));
                    if device.is_none() {
                        warn!("preferred input device '{wanted}' not found, falling back");
                    }
                }
                Err(e) => warn!("failed to enumerate input devices: {e}"),
            }
        }
        let device = match device.or_else(|| host.default_input_device()) {
            Some(d) => d,
            None => host
                .input_devices()
                .map_err(|e| OnsetError::AudioDevice(e.to_string()))?
                .next()
                .ok_or(OnsetError::NoDefaultInputDevice)?,
        };

        let supported = device
            .default_input_config()
            .map_err(|e| OnsetError::AudioDevice(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        info!(
            device = device.name().unwrap_or_default().as_str(),
            sample_rate,
            channels,
            format = ?supported.sample_format(),
            "opening input device"
        );

        let config = StreamConfig {
            channels: channels as u16,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let flag = Arc::clone(&running);
        let mut scratch: Vec<f32> = Vec::new();
        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| {
                    if !flag.load(Ordering::Relaxed) {
                        return;
                    }
                    downmix(data, channels, |s| s, &mut scratch);
                    let pushed = producer.push_slice(&scratch);
                    if pushed < scratch.len() {
                        warn!("capture ring full, dropped {} samples", scratch.len() - pushed);
                    }
                },
                |err| error!("input stream error: {err}"),
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| {
                    if !flag.load(Ordering::Relaxed) {
                        return;
                    }
                    downmix(data, channels, |s| s as f32 / 32768.0, &mut scratch);
                    let pushed = producer.push_slice(&scratch);
                    if pushed < scratch.len() {
                        warn!("capture ring full, dropped {} samples", scratch.len() - pushed);
                    }
                },
                |err| error!("input stream error: {err}"),
                None,
            ),
            fmt => {
                return Err(OnsetError::AudioStream(format!(
                    "unsupported sample format: {fmt:?}"
                )))
            }
        }
        .map_err(|e| OnsetError::AudioStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| OnsetError::AudioStream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            running,
            sample_rate,
        })
    }

    /// Signal the callback to stop feeding the ring. Frame sources drain
    /// what remains and then report exhaustion.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Stub when the `audio-cpal` feature is disabled.
#[cfg(not(feature = "audio-cpal"))]
impl MicCapture {
    pub fn open(
        _producer: AudioProducer,
        _running: Arc<AtomicBool>,
        _preferred_name: Option<&str>,
    ) -> Result<Self> {
        Err(OnsetError::AudioStream(
            "compiled without the audio-cpal feature".into(),
        ))
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}
