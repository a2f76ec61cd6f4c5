//! End-to-end detection cycles over the real capture plumbing: SPSC ring →
//! RingFrameSource → EnergyClassifier → EndpointDetector → WavSegmentSink.

use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use onset_core::buffering::{create_audio_ring, Producer};
use onset_core::{
    DetectorConfig, DetectorOutcome, EndpointDetector, EnergyClassifier, MemorySink,
    RingFrameSource, WavSegmentSink, FRAME_SIZE_SAMPLES,
};

/// Square wave loud enough to clear the 800/i16 energy threshold.
fn voiced_samples(frames: usize) -> Vec<f32> {
    (0..frames * FRAME_SIZE_SAMPLES)
        .map(|i| if i % 2 == 0 { 0.3 } else { -0.3 })
        .collect()
}

fn silent_samples(frames: usize) -> Vec<f32> {
    vec![0.0; frames * FRAME_SIZE_SAMPLES]
}

fn detector_over_ring(
    audio: &[f32],
    config: DetectorConfig,
) -> EndpointDetector<RingFrameSource> {
    let (mut prod, cons) = create_audio_ring();
    let pushed = prod.push_slice(audio);
    assert_eq!(pushed, audio.len(), "test audio must fit the ring");

    // Capture already stopped: the source drains the ring, then reports
    // exhaustion instead of timing out.
    let running = Arc::new(AtomicBool::new(false));
    let source = RingFrameSource::new(cons, 16_000, 16_000, running)
        .unwrap()
        .with_read_timeout(Duration::from_millis(50));

    let threshold = config.energy_threshold;
    EndpointDetector::new(config, source, Box::new(EnergyClassifier::new(threshold)))
}

#[test]
fn utterance_is_committed_as_a_wav_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = WavSegmentSink::new(dir.path(), 16_000).unwrap();

    // 20 voiced frames then a second of silence: triggers at frame 8,
    // stops on the silence run, 70 frames total = 1400 ms.
    let mut audio = voiced_samples(20);
    audio.extend(silent_samples(50));

    let mut det = detector_over_ring(&audio, DetectorConfig::default());
    let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
        panic!("expected a committed segment");
    };

    assert_eq!(info.duration_ms, 1400);
    let path = sink.segment_path(&info.id);
    assert!(path.exists());

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.len() as u64 * 2, info.byte_size);
}

#[test]
fn short_blip_is_discarded_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = WavSegmentSink::new(dir.path(), 16_000).unwrap();

    // Just past the trigger, then the stream ends: 10 frames = 6400 bytes,
    // well under the 16 000-byte minimum.
    let audio = voiced_samples(10);

    let mut det = detector_over_ring(&audio, DetectorConfig::default());
    assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "discard must remove the artifact");
}

#[test]
fn silence_only_stream_never_records() {
    let audio = silent_samples(100);
    let mut det = detector_over_ring(&audio, DetectorConfig::default());
    let mut sink = MemorySink::new();
    assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
    assert!(sink.committed().is_empty());
}

#[test]
fn capture_at_48k_is_resampled_before_classification() {
    let (mut prod, cons) = create_audio_ring();
    // Three seconds of a loud 500 Hz square wave at 48 kHz, then stop.
    // (Low enough in frequency to survive the downsampling filter.)
    let audio: Vec<f32> = (0..48_000 * 3)
        .map(|i| if (i / 48) % 2 == 0 { 0.3 } else { -0.3 })
        .collect();
    assert_eq!(prod.push_slice(&audio), audio.len());

    let running = Arc::new(AtomicBool::new(false));
    let source = RingFrameSource::new(cons, 48_000, 16_000, running).unwrap();
    let config = DetectorConfig::default();
    let mut det = EndpointDetector::new(
        config,
        source,
        Box::new(EnergyClassifier::new(800.0)),
    );

    let mut sink = MemorySink::new();
    let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
        panic!("expected a committed segment from resampled audio");
    };
    // ~3 s of source audio arrives as ~3 s at 16 kHz.
    assert!(
        (2_500..=3_100).contains(&info.duration_ms),
        "duration_ms={}",
        info.duration_ms
    );
}
