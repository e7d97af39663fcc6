use crate::foundation::error::{AnimError, AnimResult};

/// Pixel dimensions of a frame or source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Byte length of a tightly packed RGBA8 raster of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One raw animation frame.
///
/// Pixels are straight-alpha RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Display duration of this frame in milliseconds.
    pub delay_ms: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Create a frame, checking the buffer length against the dimensions.
    pub fn new(width: u32, height: u32, delay_ms: u32, pixels: Vec<u8>) -> AnimResult<Self> {
        let expected = Size::new(width, height).rgba8_len();
        if pixels.len() != expected {
            return Err(AnimError::decode(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} rgba8",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            delay_ms,
            pixels,
        })
    }

    /// Single-color frame. Mostly useful for tests and synthetic sources.
    pub fn solid(width: u32, height: u32, delay_ms: u32, rgba: [u8; 4]) -> Self {
        let len = Size::new(width, height).rgba8_len();
        let mut pixels = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            delay_ms,
            pixels,
        }
    }

    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Sum of frame delays in milliseconds.
pub fn total_delay_ms(frames: &[Frame]) -> u64 {
    frames.iter().map(|f| u64::from(f.delay_ms)).sum()
}

/// Check that every frame shares the first frame's dimensions.
///
/// Returns the common size, or `None` for an empty set.
pub fn uniform_size(frames: &[Frame]) -> AnimResult<Option<Size>> {
    let Some(first) = frames.first() else {
        return Ok(None);
    };
    let size = first.size();
    for (i, f) in frames.iter().enumerate().skip(1) {
        if f.size() != size {
            return Err(AnimError::decode(format!(
                "frame {i} is {}, expected {size} like frame 0",
                f.size()
            )));
        }
    }
    Ok(Some(size))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
