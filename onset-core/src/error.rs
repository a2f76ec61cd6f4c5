use thiserror::Error;

/// All errors produced by onset-core.
#[derive(Debug, Error)]
pub enum OnsetError {
    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("no default input device found")]
    NoDefaultInputDevice,

    #[error("frame source failure: {0}")]
    Source(String),

    #[error("segment sink failure during {stage}: {detail}")]
    Sink { stage: &'static str, detail: String },

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OnsetError {
    /// Shorthand for sink failures, which carry the lifecycle stage
    /// (`"open"`, `"append"`, `"close"`) they occurred in.
    pub fn sink(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::Sink {
            stage,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OnsetError>;
