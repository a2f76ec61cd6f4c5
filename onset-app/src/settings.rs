//! Persistent listener settings (JSON file in the data directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    /// Upload destination. `None` disables uploading — segments stay on disk.
    pub server_url: Option<String>,
    /// Input device name; `None` uses the system default.
    pub preferred_input_device: Option<String>,
    /// Directory committed WAV segments are written into.
    pub output_dir: PathBuf,
    /// RMS threshold for the energy fallback classifier, i16 scale.
    pub energy_threshold: f32,
    /// Hard ceiling on one recording (ms).
    pub max_recording_ms: u64,
    /// Minimum committed segment payload (bytes).
    pub min_segment_bytes: u64,
    /// Wait between the detection cycles that follow a failed upload (s).
    pub upload_retry_delay_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            preferred_input_device: None,
            output_dir: PathBuf::from("segments"),
            energy_threshold: 800.0,
            max_recording_ms: 15_000,
            min_segment_bytes: 16_000,
            upload_retry_delay_secs: 5,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.energy_threshold = self.energy_threshold.clamp(1.0, 20_000.0);
        self.max_recording_ms = self.max_recording_ms.clamp(1_000, 300_000);
        self.upload_retry_delay_secs = self.upload_retry_delay_secs.clamp(1, 300);
        self.server_url = self
            .server_url
            .as_ref()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self.preferred_input_device = self
            .preferred_input_device
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
    }
}

pub fn default_settings_path() -> PathBuf {
    std::env::var_os("ONSET_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("onset.json"))
}

pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
