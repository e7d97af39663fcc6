/// Seek/wait/retry protocol for captured frames.
pub mod acquire;
/// Frames captured from a seekable media stream.
pub mod captured;
/// Frames decoded from an animated image.
pub mod decoded;
/// The shared [`FrameSource`](frame_source::FrameSource) interface.
pub mod frame_source;
