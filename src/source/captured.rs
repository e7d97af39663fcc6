use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Frame, Size};
use crate::foundation::error::{AnimError, AnimResult};
use crate::governor::limits::capture_frame_count;
use crate::job::settings::EncodeSettings;
use crate::media::seekable::SeekableMedia;
use crate::source::acquire::{AcquireOpts, acquire_frame};
use crate::source::frame_source::FrameSource;

/// Frames captured by seeking a media stream to `start + i / fps` for `i` in
/// `0..ceil(fps * duration)`.
pub struct CapturedFrameSource<'m, M: SeekableMedia> {
    media: &'m mut M,
    opts: AcquireOpts,
    natural: Size,
    start_sec: f64,
    fps: u32,
    count: usize,
    next: usize,
    delay_ms: u32,
}

impl<'m, M: SeekableMedia> CapturedFrameSource<'m, M> {
    /// Plan a capture of `media` using the capture fields of `settings`.
    pub fn new(media: &'m mut M, settings: &EncodeSettings, opts: AcquireOpts) -> AnimResult<Self> {
        let fps = settings
            .capture_fps
            .filter(|&f| f > 0)
            .ok_or_else(|| AnimError::validation("capture requires capture_fps >= 1"))?;
        let duration = settings
            .capture_duration_sec
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| AnimError::validation("capture requires capture_duration_sec > 0"))?;

        let natural = media.info().size();
        let count = capture_frame_count(fps, duration) as usize;
        let delay_ms = (1000.0 / f64::from(fps)).round() as u32;

        Ok(Self {
            media,
            opts,
            natural,
            start_sec: settings.start_sec(),
            fps,
            count,
            next: 0,
            delay_ms,
        })
    }

    /// Presentation timestamp of frame `index`.
    pub fn timestamp(&self, index: usize) -> f64 {
        self.start_sec + index as f64 / f64::from(self.fps)
    }
}

impl<M: SeekableMedia> FrameSource for CapturedFrameSource<'_, M> {
    fn total_frames(&self) -> usize {
        self.count
    }

    fn has_more(&self) -> bool {
        self.next < self.count
    }

    async fn next_frame(&mut self, cancel: &CancelToken) -> AnimResult<Frame> {
        if !self.has_more() {
            return Err(AnimError::decode("capture source is exhausted"));
        }
        let t = self.timestamp(self.next);
        acquire_frame(self.media, t, cancel, &self.opts).await?;

        let pixels = self.media.read_frame()?;
        let frame = Frame::new(self.natural.width, self.natural.height, self.delay_ms, pixels)
            .map_err(|e| e.with_context(format!("frame at {t:.3}s")))?;
        self.next += 1;
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/captured.rs"]
mod tests;
