use crate::foundation::core::{Frame, Size};
use crate::foundation::error::AnimResult;

/// Media type of the only output format.
pub const GIF_MEDIA_TYPE: &str = "image/gif";

/// Header facts about an encoded animation, read without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationInfo {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Number of frames in the stream.
    pub frame_count: usize,
}

impl AnimationInfo {
    /// Canvas size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Fully decoded animation: full-canvas frames with disposal already applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAnimation {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Frames in presentation order.
    pub frames: Vec<Frame>,
}

/// Boundary to a palette-based animated-image codec.
///
/// Implementations report unreadable input as [`AnimError::Decode`](crate::AnimError::Decode)
/// and output failures as [`AnimError::Encode`](crate::AnimError::Encode).
pub trait AnimationCodec {
    /// Media type of the bytes `encode` produces.
    fn media_type(&self) -> &'static str;

    /// Read dimensions and frame count.
    fn probe(&self, bytes: &[u8]) -> AnimResult<AnimationInfo>;

    /// Decode every frame to straight-alpha RGBA8.
    fn decode(&self, bytes: &[u8]) -> AnimResult<DecodedAnimation>;

    /// Encode `frames`, all `width x height`, with one global palette of at most `max_colors`
    /// entries.
    fn encode(&self, width: u32, height: u32, frames: &[Frame], max_colors: u8)
    -> AnimResult<Vec<u8>>;
}
