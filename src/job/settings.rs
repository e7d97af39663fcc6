use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::Context as _;

use crate::foundation::error::{AnimError, AnimResult};

/// Default palette size for new jobs.
pub const DEFAULT_MAX_COLORS: u16 = 128;

/// Per-job transcoding parameters.
///
/// `max_colors` is stored wider than the codec's `u8` so out-of-range requests reach the
/// resource governor as a rejection instead of failing deserialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeSettings {
    /// Output width cap in pixels. `0` keeps the source width.
    pub target_max_width: u32,
    /// Keep every k-th decoded frame. `1` keeps all of them.
    pub decimation_factor: u32,
    /// Size of the single global output palette, `2..=255`.
    pub max_colors: u16,
    /// Capture rate for media sources, `1..=24`.
    pub capture_fps: Option<u32>,
    /// Capture window start in seconds. Missing means `0`.
    pub capture_start_sec: Option<f64>,
    /// Capture window length in seconds, `(0, 10]`.
    pub capture_duration_sec: Option<f64>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            target_max_width: 0,
            decimation_factor: 1,
            max_colors: DEFAULT_MAX_COLORS,
            capture_fps: None,
            capture_start_sec: None,
            capture_duration_sec: None,
        }
    }
}

impl EncodeSettings {
    /// Settings for capturing `duration_sec` seconds at `fps` starting at `start_sec`.
    pub fn capture(fps: u32, start_sec: f64, duration_sec: f64) -> Self {
        Self {
            capture_fps: Some(fps),
            capture_start_sec: Some(start_sec),
            capture_duration_sec: Some(duration_sec),
            ..Self::default()
        }
    }

    /// Builder-style width cap.
    pub fn with_target_max_width(mut self, width: u32) -> Self {
        self.target_max_width = width;
        self
    }

    /// Builder-style decimation factor.
    pub fn with_decimation_factor(mut self, k: u32) -> Self {
        self.decimation_factor = k;
        self
    }

    /// Builder-style palette size.
    pub fn with_max_colors(mut self, colors: u16) -> Self {
        self.max_colors = colors;
        self
    }

    /// Capture start, defaulting to the beginning of the media.
    pub fn start_sec(&self) -> f64 {
        self.capture_start_sec.unwrap_or(0.0)
    }

    /// Parse settings from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> AnimResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| AnimError::validation(format!("invalid settings JSON: {e}")))
    }

    /// Read settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AnimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// Caller-side, editable settings shared with the job controller.
///
/// The controller only ever reads a [`SettingsHandle::snapshot`], taken once when a job starts
/// processing, so later edits never reach an in-flight job.
#[derive(Clone, Debug, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<EncodeSettings>>,
}

impl SettingsHandle {
    /// Wrap initial settings.
    pub fn new(settings: EncodeSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy the current settings.
    pub fn snapshot(&self) -> EncodeSettings {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Edit the settings in place.
    pub fn update(&self, f: impl FnOnce(&mut EncodeSettings)) {
        match self.inner.write() {
            Ok(mut g) => f(&mut g),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Replace the settings wholesale.
    pub fn set(&self, settings: EncodeSettings) {
        self.update(|s| *s = settings);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/settings.rs"]
mod tests;
