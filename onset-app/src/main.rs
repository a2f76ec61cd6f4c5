//! Onset listener daemon.
//!
//! The firmware-style forever loop: wait for an utterance, persist it as a
//! WAV segment, hand it to the collection server, repeat. Silence costs
//! nothing — `NoSpeech` cycles simply go around again.
//!
//! ## Threading
//!
//! `cpal::Stream` is `!Send` on Windows/macOS, so the capture stream is
//! created and kept alive on its own dedicated thread. The detector runs on
//! the main thread and consumes the SPSC ring the callback fills.

mod settings;
mod upload;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use onset_core::{
    audio::MicCapture, buffering::create_audio_ring, select_classifier, DetectorConfig,
    DetectorOutcome, EndpointDetector, RingFrameSource, WavSegmentSink, SAMPLE_RATE_HZ,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use settings::{default_settings_path, load_settings, save_settings};
use upload::Uploader;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings_path = default_settings_path();
    let settings = load_settings(&settings_path);
    info!(path = %settings_path.display(), "settings loaded");
    if !settings_path.exists() {
        // Leave a template behind so the defaults are discoverable.
        if let Err(e) = save_settings(&settings_path, &settings) {
            warn!("could not write default settings file: {e}");
        }
    }

    let (producer, consumer) = create_audio_ring();
    let running = Arc::new(AtomicBool::new(true));

    // Capture thread: the cpal stream must be created and dropped here.
    let (rate_tx, rate_rx) = std::sync::mpsc::channel();
    let capture_running = Arc::clone(&running);
    let preferred = settings.preferred_input_device.clone();
    thread::Builder::new()
        .name("mic-capture".into())
        .spawn(move || {
            let capture = match MicCapture::open(
                producer,
                Arc::clone(&capture_running),
                preferred.as_deref(),
            ) {
                Ok(c) => {
                    let _ = rate_tx.send(Ok(c.sample_rate));
                    c
                }
                Err(e) => {
                    let _ = rate_tx.send(Err(e));
                    return;
                }
            };
            // Keep the stream alive until shutdown.
            while capture_running.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(200));
            }
            capture.stop();
        })
        .context("spawning capture thread")?;

    let capture_rate = rate_rx
        .recv()
        .map_err(|_| anyhow!("capture thread died before opening the device"))?
        .context("opening capture device")?;
    info!(capture_rate, "microphone ready");

    let source = RingFrameSource::new(consumer, capture_rate, SAMPLE_RATE_HZ, running)?;

    let config = DetectorConfig {
        energy_threshold: settings.energy_threshold,
        max_recording_ms: settings.max_recording_ms,
        min_segment_bytes: settings.min_segment_bytes,
        ..Default::default()
    };

    // No acoustic frontend ships with the daemon; the probe settles on the
    // energy fallback once, for the lifetime of the detector.
    let classifier = select_classifier(None, config.energy_threshold);
    let mut detector = EndpointDetector::new(config, source, classifier);

    let session_dir = settings
        .output_dir
        .join(Utc::now().format("%Y%m%dT%H%M%SZ").to_string());
    let mut sink = WavSegmentSink::new(&session_dir, SAMPLE_RATE_HZ)?;
    info!(dir = %session_dir.display(), "writing segments");

    let uploader = match &settings.server_url {
        Some(url) => {
            info!(url, "uploading committed segments");
            Some(Uploader::new(url)?)
        }
        None => {
            warn!("no server URL configured, segments stay local");
            None
        }
    };

    loop {
        match detector.detect(&mut sink) {
            Ok(DetectorOutcome::SegmentReady(segment)) => {
                info!(
                    id = %segment.id,
                    bytes = segment.byte_size,
                    duration_ms = segment.duration_ms,
                    "speech segment ready"
                );
                if let Some(uploader) = &uploader {
                    let path = sink.segment_path(&segment.id);
                    match uploader.upload_wav(&path) {
                        Ok(status) if status.is_success() => {
                            info!(id = %segment.id, "upload successful");
                        }
                        Ok(status) => {
                            error!(id = %segment.id, %status, "upload rejected");
                            thread::sleep(Duration::from_secs(settings.upload_retry_delay_secs));
                        }
                        Err(e) => {
                            error!(id = %segment.id, "upload failed: {e:#}");
                            thread::sleep(Duration::from_secs(settings.upload_retry_delay_secs));
                        }
                    }
                }
            }
            Ok(DetectorOutcome::NoSpeech) => {
                debug!("no speech detected, listening again");
            }
            Err(e) => {
                error!("detection cycle failed: {e}");
                thread::sleep(Duration::from_secs(1));
            }
        }
    }
}
