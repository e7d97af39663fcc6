use crate::foundation::core::Frame;
use crate::foundation::error::{AnimError, AnimResult};

/// Smallest delay a decimated frame may carry.
pub const FLOOR_DELAY_MS: u32 = 10;

/// Keep every `k`-th frame, stretching each kept delay by `k` so playback speed is preserved.
///
/// Output frame `i` is input frame `i * k` with delay `max(FLOOR_DELAY_MS, round(delay * k))`.
/// `k == 1` returns the input untouched. An empty input is a decode failure: there is nothing
/// to encode.
pub fn decimate(frames: Vec<Frame>, k: u32) -> AnimResult<Vec<Frame>> {
    if k == 0 {
        return Err(AnimError::validation("decimation factor must be >= 1"));
    }
    if frames.is_empty() {
        return Err(AnimError::decode("no decodable frames"));
    }
    if k == 1 {
        return Ok(frames);
    }

    let before = frames.len();
    let out: Vec<Frame> = frames
        .into_iter()
        .step_by(k as usize)
        .map(|mut f| {
            f.delay_ms = compensated_delay(f.delay_ms, k);
            f
        })
        .collect();

    tracing::debug!(before, after = out.len(), k, "decimated frames");
    Ok(out)
}

/// Delay of a kept frame standing in for `k` source frames.
pub fn compensated_delay(delay_ms: u32, k: u32) -> u32 {
    let stretched = (f64::from(delay_ms) * f64::from(k)).round();
    let stretched = if stretched >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        stretched as u32
    };
    stretched.max(FLOOR_DELAY_MS)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/decimate.rs"]
mod tests;
