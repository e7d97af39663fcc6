/// The [`AnimationCodec`](codec::AnimationCodec) trait and its data types.
pub mod codec;
/// GIF implementation of the codec boundary.
pub mod gif;
