//! Endpoint-detection state machine.
//!
//! One [`EndpointDetector::detect`] call runs a full detection cycle:
//!
//! ```text
//! Waiting ──8 consecutive voiced frames──► Recording ──stop──► evaluate
//!    │                                        │
//!    │  every frame → pre-roll ring           │  every frame → sink
//!    │  lone silent frame resets the run      │  50 consecutive silent
//!    │                                        │  frames, the duration
//!    └── source end → NoSpeech                │  ceiling, or source end
//!                                             └─► commit or discard
//! ```
//!
//! On transition the pre-roll ring is replayed into the sink before any
//! live frame, so the segment starts at the first trigger frame rather
//! than at confirmation time. Recording writes every frame, silent ones
//! included — trailing and interleaved silence is captured deliberately.
//!
//! The call blocks until one cycle completes; it is not resumable
//! mid-segment. All state is owned by the detector and touched from the
//! calling thread only — embedders running concurrently must funnel calls
//! through a single owner.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::classify::{frame_to_le_bytes, VoiceClassifier};
use crate::config::DetectorConfig;
use crate::error::{OnsetError, Result};
use crate::preroll::PreRollBuffer;
use crate::sink::{Disposition, SegmentSink, SegmentWriter};
use crate::source::{FrameRead, FrameSource};

/// Result of one detection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorOutcome {
    /// A segment was committed to the sink.
    SegmentReady(SegmentInfo),
    /// No speech was found, or the recording was too short and discarded.
    /// This is an expected outcome, not an error.
    NoSpeech,
}

/// Accounting for a committed segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Identifier the segment was opened under at the sink.
    pub id: String,
    /// Persisted payload size in bytes.
    pub byte_size: u64,
    /// Recorded audio duration in stream-clock milliseconds.
    pub duration_ms: u64,
}

/// Why the frame loop ended.
enum LoopExit {
    /// `max_silent_frames_to_stop` consecutive silent frames.
    Silence,
    /// The recording hit `max_recording_ms` of stream time.
    MaxDuration,
    /// The frame source reported end of stream.
    Exhausted,
    /// Too many consecutive read timeouts.
    Timeouts,
    /// Hardware read failure.
    Fatal(OnsetError),
}

impl LoopExit {
    fn label(&self) -> &'static str {
        match self {
            LoopExit::Silence => "silence",
            LoopExit::MaxDuration => "max_duration",
            LoopExit::Exhausted => "source_exhausted",
            LoopExit::Timeouts => "read_timeouts",
            LoopExit::Fatal(_) => "source_error",
        }
    }
}

struct OpenSegment {
    writer: Box<dyn SegmentWriter>,
    id: String,
    bytes_written: u64,
    frames_written: u64,
    /// Wall-clock open time. Backs the wall side of the duration ceiling;
    /// the reported duration stays on the stream clock.
    opened_at: Instant,
}

impl OpenSegment {
    fn past_wall_ceiling(&self, max_recording_ms: u64) -> bool {
        self.opened_at.elapsed().as_millis() as u64 >= max_recording_ms
    }
}

/// The endpoint detector. Owns its frame source, classifier, and pre-roll
/// ring; borrows a sink per call.
pub struct EndpointDetector<S: FrameSource> {
    config: DetectorConfig,
    source: S,
    classifier: Box<dyn VoiceClassifier>,
    preroll: PreRollBuffer,
    /// Scratch for serialising pre-roll frames during the flush.
    scratch: Vec<u8>,
    /// Segments opened over this detector's lifetime, used for ids.
    segment_seq: u64,
}

impl<S: FrameSource> EndpointDetector<S> {
    pub fn new(config: DetectorConfig, source: S, classifier: Box<dyn VoiceClassifier>) -> Self {
        let preroll = PreRollBuffer::new(config.pre_roll_frames(), config.frame_size_samples);
        Self {
            config,
            source,
            classifier,
            preroll,
            scratch: Vec::new(),
            segment_seq: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run one full detection cycle against `sink`.
    ///
    /// Blocks until speech was found and committed, found and discarded as
    /// too short, or the stream ended without speech. Sink failures and
    /// hardware failures before any segment opened are the `Err` path.
    pub fn detect(&mut self, sink: &mut dyn SegmentSink) -> Result<DetectorOutcome> {
        // Fresh hysteresis per call; the pre-roll ring stays warm because
        // re-warming it costs nothing and helps the next onset.
        self.classifier.reset();
        let frame_duration_ms = self.config.frame_duration_ms();
        let max_recording_frames =
            (self.config.max_recording_ms as f32 / frame_duration_ms).ceil() as u64;

        let mut frame = vec![0i16; self.config.frame_size_samples];
        let mut speech_run: u32 = 0;
        let mut silent_run: u32 = 0;
        let mut timeout_streak: u32 = 0;
        let mut segment: Option<OpenSegment> = None;

        let exit = loop {
            match self.source.next_frame(&mut frame) {
                Err(e) => break LoopExit::Fatal(e),
                Ok(FrameRead::Exhausted) => break LoopExit::Exhausted,
                Ok(FrameRead::TimedOut) => {
                    timeout_streak += 1;
                    warn!(
                        streak = timeout_streak,
                        limit = self.config.max_consecutive_timeouts,
                        "frame read timed out"
                    );
                    if timeout_streak >= self.config.max_consecutive_timeouts {
                        break LoopExit::Timeouts;
                    }
                    // Timeouts produce no frames, but wall time still runs
                    // against an open recording's ceiling.
                    if let Some(open) = segment.as_ref() {
                        if open.past_wall_ceiling(self.config.max_recording_ms) {
                            break LoopExit::MaxDuration;
                        }
                    }
                    continue;
                }
                Ok(FrameRead::Frame) => timeout_streak = 0,
            }

            let mut sink_failure = None;
            let voiced = {
                let verdict = self.classifier.classify(&frame);
                match segment.as_mut() {
                    // Recording: every frame's payload is persisted,
                    // silent or voiced.
                    Some(open) => match open.writer.append(verdict.payload) {
                        Ok(()) => {
                            open.bytes_written += verdict.payload.len() as u64;
                            open.frames_written += 1;
                        }
                        Err(e) => sink_failure = Some(e),
                    },
                    // Waiting: nothing is persisted yet, but the raw frame
                    // keeps the pre-roll ring warm.
                    None => self.preroll.push(&frame),
                }
                verdict.voiced
            };
            if let Some(e) = sink_failure {
                return Err(Self::abort_segment(segment.take(), e));
            }

            match segment.as_mut() {
                None => {
                    if voiced {
                        speech_run += 1;
                        if speech_run >= self.config.min_speech_frames_to_start {
                            segment = Some(self.open_segment(sink)?);
                            silent_run = 0;
                        }
                    } else {
                        // Strict hysteresis: progress toward the start
                        // threshold is forfeited by a single silent frame.
                        speech_run = 0;
                    }
                }
                Some(open) => {
                    if voiced {
                        silent_run = 0;
                    } else {
                        silent_run += 1;
                        if silent_run >= self.config.max_silent_frames_to_stop {
                            break LoopExit::Silence;
                        }
                    }
                    // The ceiling binds on whichever clock crosses first:
                    // the stream clock for a deterministic frame count, the
                    // wall clock so a stalling source cannot hold a
                    // recording open past `max_recording_ms` of real time.
                    if open.frames_written >= max_recording_frames
                        || open.past_wall_ceiling(self.config.max_recording_ms)
                    {
                        break LoopExit::MaxDuration;
                    }
                }
            }
        };

        self.evaluate(segment, exit, frame_duration_ms)
    }

    /// Open a segment at the sink and replay the pre-roll ring into it,
    /// oldest-first, before any live frame.
    fn open_segment(&mut self, sink: &mut dyn SegmentSink) -> Result<OpenSegment> {
        self.segment_seq += 1;
        let id = format!("seg-{}", self.segment_seq);
        let mut writer = sink.open(&id)?;

        let mut bytes_written = 0u64;
        let mut frames_written = 0u64;
        for pre_frame in self.preroll.iter_in_order() {
            frame_to_le_bytes(pre_frame, &mut self.scratch);
            if let Err(e) = writer.append(&self.scratch) {
                let open = OpenSegment {
                    writer,
                    id,
                    bytes_written,
                    frames_written,
                    opened_at: Instant::now(),
                };
                return Err(Self::abort_segment(Some(open), e));
            }
            bytes_written += self.scratch.len() as u64;
            frames_written += 1;
        }

        debug!(
            id = %id,
            pre_roll_frames = frames_written,
            pre_roll_bytes = bytes_written,
            "speech onset confirmed, segment opened"
        );

        Ok(OpenSegment {
            writer,
            id,
            bytes_written,
            frames_written,
            opened_at: Instant::now(),
        })
    }

    /// Best-effort discard after a sink failure, preserving the original
    /// error for the caller.
    fn abort_segment(segment: Option<OpenSegment>, cause: OnsetError) -> OnsetError {
        if let Some(open) = segment {
            if let Err(e) = open.writer.close(Disposition::Discard) {
                warn!(id = %open.id, "discard after sink failure also failed: {e}");
            }
        }
        cause
    }

    /// Terminal step after the loop: commit or discard whatever was
    /// recorded and map the exit to an outcome.
    fn evaluate(
        &mut self,
        segment: Option<OpenSegment>,
        exit: LoopExit,
        frame_duration_ms: f32,
    ) -> Result<DetectorOutcome> {
        let Some(open) = segment else {
            // Nothing was ever opened. A hardware failure with no segment
            // at stake is worth surfacing; everything else is a normal
            // no-speech outcome.
            return match exit {
                LoopExit::Fatal(e) => Err(e),
                _ => {
                    debug!(exit = exit.label(), "cycle ended without speech");
                    Ok(DetectorOutcome::NoSpeech)
                }
            };
        };

        if let LoopExit::Fatal(ref e) = exit {
            // The segment survives the failure; whatever was captured is
            // still evaluated below.
            warn!(id = %open.id, "frame source failed mid-recording: {e}");
        }

        let duration_ms = (open.frames_written as f32 * frame_duration_ms) as u64;
        let wall_ms = open.opened_at.elapsed().as_millis() as u64;
        let commit = open.bytes_written >= self.config.min_segment_bytes;

        if commit {
            let byte_size = open.writer.close(Disposition::Commit)?;
            info!(
                id = %open.id,
                exit = exit.label(),
                byte_size,
                duration_ms,
                wall_ms,
                "segment committed"
            );
            Ok(DetectorOutcome::SegmentReady(SegmentInfo {
                id: open.id,
                byte_size,
                duration_ms,
            }))
        } else {
            open.writer.close(Disposition::Discard)?;
            info!(
                id = %open.id,
                exit = exit.label(),
                bytes = open.bytes_written,
                min = self.config.min_segment_bytes,
                duration_ms,
                "segment below minimum size, discarded"
            );
            Ok(DetectorOutcome::NoSpeech)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::EnergyClassifier;
    use crate::sink::MemorySink;

    const FRAME: usize = 320;

    fn voiced() -> Vec<i16> {
        // ±3000 square wave, RMS 3000 — comfortably above the 800 threshold.
        (0..FRAME)
            .map(|i| if i % 2 == 0 { 3000 } else { -3000 })
            .collect()
    }

    fn silent() -> Vec<i16> {
        vec![0i16; FRAME]
    }

    /// Source driven by a script of reads.
    enum Step {
        Frame(Vec<i16>),
        TimedOut,
        Error,
    }

    struct ScriptedSource {
        steps: std::vec::IntoIter<Step>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into_iter(),
            }
        }

        fn frames(frames: Vec<Vec<i16>>) -> Self {
            Self::new(frames.into_iter().map(Step::Frame).collect())
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self, buf: &mut [i16]) -> Result<FrameRead> {
            match self.steps.next() {
                None => Ok(FrameRead::Exhausted),
                Some(Step::TimedOut) => Ok(FrameRead::TimedOut),
                Some(Step::Error) => Err(OnsetError::Source("scripted hardware error".into())),
                Some(Step::Frame(f)) => {
                    buf.copy_from_slice(&f);
                    Ok(FrameRead::Frame)
                }
            }
        }
    }

    fn detector(config: DetectorConfig, source: ScriptedSource) -> EndpointDetector<ScriptedSource> {
        let threshold = config.energy_threshold;
        EndpointDetector::new(config, source, Box::new(EnergyClassifier::new(threshold)))
    }

    fn repeat(frame: Vec<i16>, n: usize) -> Vec<Vec<i16>> {
        std::iter::repeat(frame).take(n).collect()
    }

    #[test]
    fn sub_threshold_runs_never_open_a_segment() {
        // 7 voiced then 1 silent, repeated — never 8 consecutive.
        let mut frames = Vec::new();
        for _ in 0..10 {
            frames.extend(repeat(voiced(), 7));
            frames.push(silent());
        }
        let mut det = detector(DetectorConfig::default(), ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();
        assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
        assert!(sink.committed().is_empty());
    }

    #[test]
    fn all_silent_stream_is_idempotent_no_speech() {
        let cfg = DetectorConfig::default();
        let mut sink = MemorySink::new();
        for _ in 0..3 {
            let mut det = detector(cfg.clone(), ScriptedSource::frames(repeat(silent(), 100)));
            assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
        }
        assert!(sink.committed().is_empty());
    }

    #[test]
    fn reference_scenario_second_run_triggers_and_silence_stops() {
        // 7 voiced, 1 silent (resets), 8 voiced (triggers), 60 silent.
        let mut frames = repeat(voiced(), 7);
        frames.push(silent());
        frames.extend(repeat(voiced(), 8));
        frames.extend(repeat(silent(), 60));

        let mut det = detector(DetectorConfig::default(), ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();

        let outcome = det.detect(&mut sink).unwrap();
        let DetectorOutcome::SegmentReady(info) = outcome else {
            panic!("expected a committed segment, got {outcome:?}");
        };
        // 8 pre-roll frames + 50 silent frames = 58 frames = 1160 ms.
        assert_eq!(info.duration_ms, 1160);
        assert_eq!(info.byte_size, 58 * FRAME as u64 * 2);
        assert_eq!(sink.committed().len(), 1);
    }

    #[test]
    fn pre_roll_frames_lead_the_committed_segment() {
        // Distinct voiced frames so the pre-roll content is identifiable.
        let mut frames: Vec<Vec<i16>> = (0..8)
            .map(|k| {
                (0..FRAME)
                    .map(|i| {
                        let amp = 2000 + k as i16 * 100;
                        if i % 2 == 0 {
                            amp
                        } else {
                            -amp
                        }
                    })
                    .collect()
            })
            .collect();
        let trigger_frames = frames.clone();
        frames.extend(repeat(silent(), 60));

        let mut det = detector(DetectorConfig::default(), ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();
        det.detect(&mut sink).unwrap();

        let committed = sink.committed();
        assert_eq!(committed.len(), 1);
        let bytes = &committed[0].bytes;
        for (k, frame) in trigger_frames.iter().enumerate() {
            let expected: Vec<u8> = frame.iter().flat_map(|s| s.to_le_bytes()).collect();
            let start = k * FRAME * 2;
            assert_eq!(
                &bytes[start..start + FRAME * 2],
                expected.as_slice(),
                "pre-roll frame {k} mismatch"
            );
        }
    }

    #[test]
    fn exhaustion_scenario_commits_when_big_enough() {
        // 8 voiced then 30 silent then end of stream: stop comes from
        // exhaustion, not silence. 38 frames = 760 ms = 24 320 bytes.
        let mut frames = repeat(voiced(), 8);
        frames.extend(repeat(silent(), 30));

        let mut det = detector(DetectorConfig::default(), ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();
        let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(info.duration_ms, 760);
        assert_eq!(info.byte_size, 38 * FRAME as u64 * 2);
    }

    #[test]
    fn exhaustion_scenario_discards_when_below_minimum() {
        let cfg = DetectorConfig {
            // 38 frames = 24 320 bytes < 30 000.
            min_segment_bytes: 30_000,
            ..Default::default()
        };
        let mut frames = repeat(voiced(), 8);
        frames.extend(repeat(silent(), 30));

        let mut det = detector(cfg, ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();
        assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
        assert!(sink.committed().is_empty());
    }

    #[test]
    fn recording_never_exceeds_the_duration_ceiling() {
        // Continuous voiced frames far past the ceiling.
        let mut det = detector(
            DetectorConfig::default(),
            ScriptedSource::frames(repeat(voiced(), 1000)),
        );
        let mut sink = MemorySink::new();
        let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(info.duration_ms, 15_000);
        assert_eq!(info.byte_size, 750 * FRAME as u64 * 2);
    }

    #[test]
    fn brief_voiced_blips_keep_recording_alive_until_ceiling() {
        // After the trigger, cycles of 40 silent + 1 voiced never reach the
        // 50-silent stop, so only the ceiling ends the recording.
        let mut frames = repeat(voiced(), 8);
        for _ in 0..25 {
            frames.extend(repeat(silent(), 40));
            frames.push(voiced());
        }
        let mut det = detector(DetectorConfig::default(), ScriptedSource::frames(frames));
        let mut sink = MemorySink::new();
        let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(info.duration_ms, 15_000);
    }

    #[test]
    fn stalling_source_cannot_hold_a_recording_past_the_wall_ceiling() {
        use std::time::Duration;

        // Two timeouts per delivered frame: 20 ms of stream time costs
        // ~70 ms of wall time, and the timeout streak never reaches 3.
        struct StallingSource {
            calls: usize,
        }
        impl FrameSource for StallingSource {
            fn next_frame(&mut self, buf: &mut [i16]) -> Result<FrameRead> {
                self.calls += 1;
                if self.calls % 3 == 0 {
                    buf.copy_from_slice(&voiced());
                    Ok(FrameRead::Frame)
                } else {
                    std::thread::sleep(Duration::from_millis(25));
                    Ok(FrameRead::TimedOut)
                }
            }
        }

        let cfg = DetectorConfig {
            min_speech_frames_to_start: 1,
            max_recording_ms: 150,
            min_segment_bytes: 1,
            ..Default::default()
        };
        let threshold = cfg.energy_threshold;
        let mut det = EndpointDetector::new(
            cfg,
            StallingSource { calls: 0 },
            Box::new(EnergyClassifier::new(threshold)),
        );
        let mut sink = MemorySink::new();
        let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
            panic!("expected commit");
        };
        // Only the wall clock can have ended this recording: the stream
        // clock would need 150 ms of frames, which costs over 500 ms of
        // wall time at this stall rate.
        assert!(info.duration_ms < 150, "duration_ms={}", info.duration_ms);
    }

    #[test]
    fn sink_append_failure_mid_recording_discards_and_errors() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        struct CountingWriter {
            appends_left: usize,
            commits: Arc<AtomicU32>,
            discards: Arc<AtomicU32>,
        }
        impl SegmentWriter for CountingWriter {
            fn append(&mut self, _bytes: &[u8]) -> Result<()> {
                if self.appends_left == 0 {
                    return Err(OnsetError::sink("append", "disk full"));
                }
                self.appends_left -= 1;
                Ok(())
            }
            fn close(self: Box<Self>, disposition: Disposition) -> Result<u64> {
                match disposition {
                    Disposition::Commit => self.commits.fetch_add(1, Ordering::SeqCst),
                    Disposition::Discard => self.discards.fetch_add(1, Ordering::SeqCst),
                };
                Ok(0)
            }
        }

        struct FailingSink {
            appends_before_failure: usize,
            commits: Arc<AtomicU32>,
            discards: Arc<AtomicU32>,
        }
        impl SegmentSink for FailingSink {
            fn open(&mut self, _id: &str) -> Result<Box<dyn SegmentWriter>> {
                Ok(Box::new(CountingWriter {
                    appends_left: self.appends_before_failure,
                    commits: Arc::clone(&self.commits),
                    discards: Arc::clone(&self.discards),
                }))
            }
        }

        let commits = Arc::new(AtomicU32::new(0));
        let discards = Arc::new(AtomicU32::new(0));
        // The 8 pre-roll appends and two live frames succeed, then the
        // disk fills mid-recording.
        let mut sink = FailingSink {
            appends_before_failure: 10,
            commits: Arc::clone(&commits),
            discards: Arc::clone(&discards),
        };
        let mut det = detector(
            DetectorConfig::default(),
            ScriptedSource::frames(repeat(voiced(), 20)),
        );

        assert!(matches!(
            det.detect(&mut sink),
            Err(OnsetError::Sink { stage: "append", .. })
        ));
        assert_eq!(commits.load(Ordering::SeqCst), 0);
        assert_eq!(
            discards.load(Ordering::SeqCst),
            1,
            "partial artifact must be discarded"
        );
    }

    #[test]
    fn timeouts_in_waiting_end_the_cycle_without_speech() {
        let steps = vec![Step::TimedOut, Step::TimedOut, Step::TimedOut];
        let mut det = detector(DetectorConfig::default(), ScriptedSource::new(steps));
        let mut sink = MemorySink::new();
        assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
    }

    #[test]
    fn a_frame_resets_the_timeout_streak() {
        // Two timeouts, a frame, two timeouts — never three consecutive,
        // then the stream ends.
        let steps = vec![
            Step::TimedOut,
            Step::TimedOut,
            Step::Frame(silent()),
            Step::TimedOut,
            Step::TimedOut,
            Step::Frame(silent()),
        ];
        let mut det = detector(DetectorConfig::default(), ScriptedSource::new(steps));
        let mut sink = MemorySink::new();
        assert_eq!(det.detect(&mut sink).unwrap(), DetectorOutcome::NoSpeech);
    }

    #[test]
    fn hardware_error_while_waiting_propagates() {
        let steps = vec![Step::Frame(silent()), Step::Error];
        let mut det = detector(DetectorConfig::default(), ScriptedSource::new(steps));
        let mut sink = MemorySink::new();
        assert!(matches!(
            det.detect(&mut sink),
            Err(OnsetError::Source(_))
        ));
        assert!(sink.committed().is_empty());
    }

    #[test]
    fn hardware_error_mid_recording_still_evaluates_the_segment() {
        // Enough recorded before the failure to clear the minimum size.
        let mut steps: Vec<Step> = repeat(voiced(), 8).into_iter().map(Step::Frame).collect();
        steps.extend(repeat(voiced(), 20).into_iter().map(Step::Frame));
        steps.push(Step::Error);

        let cfg = DetectorConfig {
            min_segment_bytes: 10_000, // 28 frames = 17 920 bytes
            ..Default::default()
        };
        let mut det = detector(cfg, ScriptedSource::new(steps));
        let mut sink = MemorySink::new();
        let DetectorOutcome::SegmentReady(info) = det.detect(&mut sink).unwrap() else {
            panic!("expected the captured audio to be committed");
        };
        assert_eq!(info.duration_ms, 560); // 28 frames
    }

    #[test]
    fn sink_open_failure_is_an_error() {
        struct RefusingSink;
        impl SegmentSink for RefusingSink {
            fn open(&mut self, _id: &str) -> Result<Box<dyn SegmentWriter>> {
                Err(OnsetError::sink("open", "disk full"))
            }
        }

        let mut det = detector(
            DetectorConfig::default(),
            ScriptedSource::frames(repeat(voiced(), 8)),
        );
        assert!(matches!(
            det.detect(&mut RefusingSink),
            Err(OnsetError::Sink { stage: "open", .. })
        ));
    }

    #[test]
    fn segment_ids_increase_across_cycles() {
        let cfg = DetectorConfig {
            min_segment_bytes: 1,
            ..Default::default()
        };
        let mut sink = MemorySink::new();

        // Two full cycles back to back in one script: each triggers after
        // 8 voiced frames and stops after 50 silent ones.
        let mut cycle = repeat(voiced(), 8);
        cycle.extend(repeat(silent(), 50));
        let mut frames = cycle.clone();
        frames.extend(cycle);

        let mut det = detector(cfg, ScriptedSource::frames(frames));
        let DetectorOutcome::SegmentReady(first) = det.detect(&mut sink).unwrap() else {
            panic!("expected first commit");
        };
        let DetectorOutcome::SegmentReady(second) = det.detect(&mut sink).unwrap() else {
            panic!("expected second commit");
        };

        assert_eq!(first.id, "seg-1");
        assert_eq!(second.id, "seg-2");
        assert_eq!(sink.committed().len(), 2);
    }
}
