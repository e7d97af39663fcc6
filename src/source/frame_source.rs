use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Frame;
use crate::foundation::error::AnimResult;
use crate::media::seekable::SeekableMedia;
use crate::source::captured::CapturedFrameSource;
use crate::source::decoded::DecodedFrameSource;

/// Ordered producer of raw frames.
///
/// Frames come out in strict index order; downstream stages rely on it.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Number of frames this source will produce in total.
    fn total_frames(&self) -> usize;

    /// `true` while [`FrameSource::next_frame`] has frames left.
    fn has_more(&self) -> bool;

    /// Produce the next frame.
    async fn next_frame(&mut self, cancel: &CancelToken) -> AnimResult<Frame>;
}

/// The two frame-source variants behind one interface, chosen when a job starts.
pub enum AnyFrameSource<'m, M: SeekableMedia> {
    /// Frames already decoded from an animated image.
    Decoded(DecodedFrameSource),
    /// Frames captured by seeking a media stream.
    Captured(CapturedFrameSource<'m, M>),
}

impl<M: SeekableMedia> FrameSource for AnyFrameSource<'_, M> {
    fn total_frames(&self) -> usize {
        match self {
            Self::Decoded(s) => s.total_frames(),
            Self::Captured(s) => s.total_frames(),
        }
    }

    fn has_more(&self) -> bool {
        match self {
            Self::Decoded(s) => s.has_more(),
            Self::Captured(s) => s.has_more(),
        }
    }

    async fn next_frame(&mut self, cancel: &CancelToken) -> AnimResult<Frame> {
        match self {
            Self::Decoded(s) => s.next_frame(cancel).await,
            Self::Captured(s) => s.next_frame(cancel).await,
        }
    }
}

/// Drain `source` into a frame set, polling `cancel` between frames.
///
/// `progress(done, total)` fires after every frame.
pub async fn collect_frames<S: FrameSource>(
    source: &mut S,
    cancel: &CancelToken,
    mut progress: impl FnMut(usize, usize),
) -> AnimResult<Vec<Frame>> {
    let total = source.total_frames();
    let mut frames = Vec::with_capacity(total);
    while source.has_more() {
        cancel.check()?;
        let frame = source.next_frame(cancel).await?;
        frames.push(frame);
        progress(frames.len(), total);
    }
    cancel.check()?;
    Ok(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/source/frame_source.rs"]
mod tests;
