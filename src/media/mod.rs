//! Time-seekable media boundary used by the capture path.

/// `ffprobe`/`ffmpeg`-backed media (requires the `media-ffmpeg` feature at runtime).
pub mod ffmpeg;
/// The [`SeekableMedia`](seekable::SeekableMedia) contract.
pub mod seekable;
