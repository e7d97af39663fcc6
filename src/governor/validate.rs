use crate::foundation::core::Size;
use crate::foundation::error::AnimError;
use crate::governor::limits::{
    MAX_COLORS, MIN_CAPTURE_FPS, MIN_COLORS, MIN_DECIMATION_FACTOR, ResourceLimits,
    WINDOW_EPSILON_SEC, capture_frame_count,
};
use crate::job::settings::EncodeSettings;
use crate::transform::resample::output_size;

/// Which frame path a request will take, with the facts the governor needs about it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceKind {
    /// Frames decoded from an existing animated image.
    Decoded {
        /// Frame count reported by the codec probe.
        frame_count: usize,
    },
    /// Frames captured by seeking a time-based media source.
    Captured {
        /// Total media duration in seconds.
        duration_secs: f64,
    },
}

/// Everything about a source the governor inspects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GovernorRequest {
    /// Natural (unscaled) source dimensions.
    pub natural: Size,
    /// Path-specific facts.
    pub kind: SourceKind,
}

/// Machine-checkable tag for a [`Rejection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Palette size outside `[2, 255]`.
    MaxColors,
    /// Capture window length missing or outside `(0, max]`.
    CaptureDuration,
    /// Capture rate missing or outside `[1, max]`.
    CaptureFps,
    /// `ceil(fps * duration)` above the frame ceiling.
    FrameCount,
    /// Capture window does not fit inside the media.
    CaptureWindow,
    /// Source reports a zero dimension.
    EmptyDimensions,
    /// Output frame larger than the pixel ceiling.
    OutputPixels,
    /// Decimation factor outside `[1, max]`.
    DecimationFactor,
}

/// Why the governor refused a request, with the first offending bound.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Rejection {
    /// Palette size out of range.
    #[error("max_colors {actual} is outside [2, 255]")]
    MaxColors {
        /// Requested palette size.
        actual: u16,
        /// Violated bound.
        bound: u16,
    },
    /// Capture window length out of range.
    #[error("capture duration {actual:?}s is outside (0, {bound}]")]
    CaptureDuration {
        /// Requested length, if any.
        actual: Option<f64>,
        /// Violated bound.
        bound: f64,
    },
    /// Capture rate out of range.
    #[error("capture fps {actual:?} is outside [1, {bound}]")]
    CaptureFps {
        /// Requested rate, if any.
        actual: Option<u32>,
        /// Violated bound.
        bound: u32,
    },
    /// Too many frames for the requested window.
    #[error("capture would produce {actual} frames, limit is {bound}")]
    FrameCount {
        /// Derived frame count.
        actual: u64,
        /// Frame ceiling.
        bound: u64,
    },
    /// Capture window outside the media timeline.
    #[error("capture window [{start}s, {end}s] does not fit the media (bound {bound}s)")]
    CaptureWindow {
        /// Requested start.
        start: f64,
        /// Requested end (`start + duration`).
        end: f64,
        /// Violated bound: `0` for a negative start, otherwise the media duration.
        bound: f64,
    },
    /// Zero-sized source.
    #[error("source dimensions {size} are empty")]
    EmptyDimensions {
        /// Reported natural size.
        size: Size,
    },
    /// Output frame too large.
    #[error("output frame {size} has {actual} pixels, limit is {bound}")]
    OutputPixels {
        /// Computed output size.
        size: Size,
        /// `size.width * size.height`.
        actual: u64,
        /// Pixel ceiling.
        bound: u64,
    },
    /// Decimation factor out of range.
    #[error("decimation factor {actual} is outside [1, {bound}]")]
    DecimationFactor {
        /// Requested factor.
        actual: u32,
        /// Violated bound.
        bound: u32,
    },
}

impl Rejection {
    /// Category tag.
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::MaxColors { .. } => RejectReason::MaxColors,
            Self::CaptureDuration { .. } => RejectReason::CaptureDuration,
            Self::CaptureFps { .. } => RejectReason::CaptureFps,
            Self::FrameCount { .. } => RejectReason::FrameCount,
            Self::CaptureWindow { .. } => RejectReason::CaptureWindow,
            Self::EmptyDimensions { .. } => RejectReason::EmptyDimensions,
            Self::OutputPixels { .. } => RejectReason::OutputPixels,
            Self::DecimationFactor { .. } => RejectReason::DecimationFactor,
        }
    }

    /// The violated bound as a number.
    pub fn bound(&self) -> f64 {
        match *self {
            Self::MaxColors { bound, .. } => f64::from(bound),
            Self::CaptureDuration { bound, .. } => bound,
            Self::CaptureFps { bound, .. } => f64::from(bound),
            Self::FrameCount { bound, .. } => bound as f64,
            Self::CaptureWindow { bound, .. } => bound,
            Self::EmptyDimensions { .. } => 1.0,
            Self::OutputPixels { bound, .. } => bound as f64,
            Self::DecimationFactor { bound, .. } => f64::from(bound),
        }
    }
}

impl From<Rejection> for AnimError {
    fn from(r: Rejection) -> Self {
        AnimError::validation(r.to_string())
    }
}

/// Check a request against hard limits before any work starts.
///
/// Checks run in a fixed order and the first violation is returned:
/// 1. palette size,
/// 2. capture duration, 3. capture fps, 4. capture frame count, 5. capture window (capture only),
/// 6. output pixel budget,
/// 7. decimation factor (decoded only).
#[tracing::instrument(level = "debug", skip(settings, limits), err(Display))]
pub fn validate(
    req: &GovernorRequest,
    settings: &EncodeSettings,
    limits: &ResourceLimits,
) -> Result<(), Rejection> {
    check_colors(settings.max_colors)?;

    if let SourceKind::Captured { duration_secs } = req.kind {
        check_capture(duration_secs, settings, limits)?;
    }

    check_pixels(req.natural, settings.target_max_width, limits)?;

    if let SourceKind::Decoded { .. } = req.kind {
        check_decimation(settings.decimation_factor, limits)?;
    }

    Ok(())
}

fn check_colors(colors: u16) -> Result<(), Rejection> {
    if colors < MIN_COLORS {
        return Err(Rejection::MaxColors {
            actual: colors,
            bound: MIN_COLORS,
        });
    }
    if colors > MAX_COLORS {
        return Err(Rejection::MaxColors {
            actual: colors,
            bound: MAX_COLORS,
        });
    }
    Ok(())
}

fn check_capture(
    source_duration: f64,
    settings: &EncodeSettings,
    limits: &ResourceLimits,
) -> Result<(), Rejection> {
    let duration = match settings.capture_duration_sec {
        Some(d) if d.is_finite() && d > 0.0 && d <= limits.max_capture_duration_sec => d,
        other => {
            let bound = match other {
                Some(d) if d > limits.max_capture_duration_sec => limits.max_capture_duration_sec,
                _ => 0.0,
            };
            return Err(Rejection::CaptureDuration {
                actual: other,
                bound,
            });
        }
    };

    let fps = match settings.capture_fps {
        Some(f) if (MIN_CAPTURE_FPS..=limits.max_capture_fps).contains(&f) => f,
        other => {
            let bound = match other {
                Some(f) if f > limits.max_capture_fps => limits.max_capture_fps,
                _ => MIN_CAPTURE_FPS,
            };
            return Err(Rejection::CaptureFps {
                actual: other,
                bound,
            });
        }
    };

    let frames = capture_frame_count(fps, duration);
    if frames > limits.max_capture_frames {
        return Err(Rejection::FrameCount {
            actual: frames,
            bound: limits.max_capture_frames,
        });
    }

    let start = settings.start_sec();
    let end = start + duration;
    if !start.is_finite() || start < 0.0 {
        return Err(Rejection::CaptureWindow {
            start,
            end,
            bound: 0.0,
        });
    }
    // A NaN duration contains no window.
    if source_duration.is_nan()
        || start >= source_duration
        || end > source_duration + WINDOW_EPSILON_SEC
    {
        return Err(Rejection::CaptureWindow {
            start,
            end,
            bound: source_duration,
        });
    }

    Ok(())
}

fn check_pixels(
    natural: Size,
    target_max_width: u32,
    limits: &ResourceLimits,
) -> Result<(), Rejection> {
    if natural.is_empty() {
        return Err(Rejection::EmptyDimensions { size: natural });
    }
    let out = output_size(natural, target_max_width);
    let actual = out.pixel_count();
    if actual > limits.max_output_pixels {
        return Err(Rejection::OutputPixels {
            size: out,
            actual,
            bound: limits.max_output_pixels,
        });
    }
    Ok(())
}

fn check_decimation(k: u32, limits: &ResourceLimits) -> Result<(), Rejection> {
    if k < MIN_DECIMATION_FACTOR {
        return Err(Rejection::DecimationFactor {
            actual: k,
            bound: MIN_DECIMATION_FACTOR,
        });
    }
    if k > limits.max_decimation_factor {
        return Err(Rejection::DecimationFactor {
            actual: k,
            bound: limits.max_decimation_factor,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/governor/validate.rs"]
mod tests;
