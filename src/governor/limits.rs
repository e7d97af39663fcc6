/// Smallest palette the codec accepts.
pub const MIN_COLORS: u16 = 2;
/// Largest palette the codec accepts.
pub const MAX_COLORS: u16 = 255;
/// Longest capture window in seconds.
pub const MAX_CAPTURE_DURATION_SEC: f64 = 10.0;
/// Lowest capture rate.
pub const MIN_CAPTURE_FPS: u32 = 1;
/// Highest capture rate.
pub const MAX_CAPTURE_FPS: u32 = 24;
/// Most frames a capture may produce before decimation.
pub const MAX_CAPTURE_FRAMES: u64 = 200;
/// Output pixel ceiling (`width * height` of one output frame).
///
/// This is a tunable policy, roughly a 1080p frame.
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 2_000_000;
/// Lowest decimation factor.
pub const MIN_DECIMATION_FACTOR: u32 = 1;
/// Highest decimation factor for decoded sources.
pub const MAX_DECIMATION_FACTOR: u32 = 60;
/// Slack allowed when comparing a capture window against the media duration.
pub const WINDOW_EPSILON_SEC: f64 = 1e-3;

/// Hard ceilings enforced by the resource governor.
///
/// Defaults are the documented constants in this module; the fields exist so deployments can
/// tighten them (for example on constrained devices).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceLimits {
    /// Longest capture window in seconds.
    pub max_capture_duration_sec: f64,
    /// Highest capture rate.
    pub max_capture_fps: u32,
    /// Most frames a capture may produce.
    pub max_capture_frames: u64,
    /// Output pixel ceiling.
    pub max_output_pixels: u64,
    /// Highest decimation factor.
    pub max_decimation_factor: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_capture_duration_sec: MAX_CAPTURE_DURATION_SEC,
            max_capture_fps: MAX_CAPTURE_FPS,
            max_capture_frames: MAX_CAPTURE_FRAMES,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
            max_decimation_factor: MAX_DECIMATION_FACTOR,
        }
    }
}

impl ResourceLimits {
    /// Parse limits from JSON. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> crate::AnimResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| crate::AnimError::validation(format!("invalid limits JSON: {e}")))
    }
}

/// Frames produced by capturing `duration_sec` seconds at `fps`: `ceil(fps * duration)`.
///
/// A tiny bias keeps exact products (`10 * 0.3`) from rounding up through float noise. Any
/// positive product yields at least one frame.
pub fn capture_frame_count(fps: u32, duration_sec: f64) -> u64 {
    let raw = f64::from(fps) * duration_sec;
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    (raw - 1e-9).ceil().max(1.0) as u64
}
