use crate::foundation::core::Size;
use crate::foundation::error::AnimResult;

/// Static facts about a time-seekable media source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaInfo {
    /// Natural frame width in pixels.
    pub width: u32,
    /// Natural frame height in pixels.
    pub height: u32,
    /// Total duration in seconds.
    pub duration_secs: f64,
}

impl MediaInfo {
    /// Natural frame size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A media stream that can be repositioned to a timestamp and read back as one RGBA8 frame.
///
/// The shape mirrors an event-driven player: `seek` only *requests* a reposition, and the
/// `async` methods resolve when the corresponding signal fires. Callers bound every wait with
/// their own timeout; implementations should simply stay pending until the signal arrives.
/// Errors returned from the waits are treated as fatal (not retried).
#[allow(async_fn_in_trait)]
pub trait SeekableMedia {
    /// Natural size and duration.
    fn info(&self) -> MediaInfo;

    /// Size of the underlying input in bytes, when known.
    fn byte_len(&self) -> u64 {
        0
    }

    /// Request a reposition to `t_secs`.
    fn seek(&mut self, t_secs: f64) -> AnimResult<()>;

    /// Resolves once the last requested reposition has completed.
    async fn repositioned(&mut self) -> AnimResult<()>;

    /// `true` when enough data is buffered to present the current position.
    fn has_enough_data(&self) -> bool;

    /// Resolves once more data has been buffered.
    async fn data_available(&mut self) -> AnimResult<()>;

    /// `true` when [`SeekableMedia::frame_painted`] delivers a real notification.
    fn supports_frame_painted(&self) -> bool {
        false
    }

    /// Resolves once the frame at the current position has been presented.
    async fn frame_painted(&mut self) -> AnimResult<()> {
        Ok(())
    }

    /// Copy out the current frame as straight-alpha RGBA8 at natural size.
    fn read_frame(&mut self) -> AnimResult<Vec<u8>>;
}

/// Placeholder media type for controllers that only ever process encoded images.
///
/// Uninhabited: a `SourceAsset::Media(NoMedia)` can never be built.
#[derive(Debug)]
pub enum NoMedia {}

impl SeekableMedia for NoMedia {
    fn info(&self) -> MediaInfo {
        match *self {}
    }

    fn seek(&mut self, _t_secs: f64) -> AnimResult<()> {
        match *self {}
    }

    async fn repositioned(&mut self) -> AnimResult<()> {
        match *self {}
    }

    fn has_enough_data(&self) -> bool {
        match *self {}
    }

    async fn data_available(&mut self) -> AnimResult<()> {
        match *self {}
    }

    fn read_frame(&mut self) -> AnimResult<Vec<u8>> {
        match *self {}
    }
}
