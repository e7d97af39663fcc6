use crate::encode::codec::DecodedAnimation;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Frame;
use crate::foundation::error::{AnimError, AnimResult};
use crate::source::frame_source::FrameSource;

/// Frames materialized up front by the codec boundary, handed out one at a time.
#[derive(Debug)]
pub struct DecodedFrameSource {
    frames: std::vec::IntoIter<Frame>,
    total: usize,
}

impl DecodedFrameSource {
    /// Wrap a decoded animation.
    pub fn new(anim: DecodedAnimation) -> Self {
        Self::from_frames(anim.frames)
    }

    /// Wrap an already decoded frame list.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        let total = frames.len();
        Self {
            frames: frames.into_iter(),
            total,
        }
    }
}

impl FrameSource for DecodedFrameSource {
    fn total_frames(&self) -> usize {
        self.total
    }

    fn has_more(&self) -> bool {
        self.frames.len() > 0
    }

    async fn next_frame(&mut self, cancel: &CancelToken) -> AnimResult<Frame> {
        cancel.check()?;
        self.frames
            .next()
            .ok_or_else(|| AnimError::decode("decoded source is exhausted"))
    }
}
