//! animpipe transcodes animated images.
//!
//! Two inputs share one pipeline: an existing animated image (decoded frames) or a time-seekable
//! video clip (captured frames). Frames are checked against hard resource limits, decimated,
//! resampled to a width cap and encoded with one global palette.
//!
//! - Queue work on a [`JobController`]
//! - Run it with [`JobController::run_next`] / [`JobController::run_all`]
//! - Read the [`OutputArtifact`] of a `Done` job
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Codec boundary and the GIF adapter.
pub mod encode;
pub mod governor;
/// Job queue, lifecycle and output ownership.
pub mod job;
pub mod media;
/// Frame sources and the acquisition protocol.
pub mod source;
pub mod transform;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Frame, Size, total_delay_ms, uniform_size};
pub use crate::foundation::error::{AnimError, AnimResult, ErrorKind};

pub use crate::encode::codec::{AnimationCodec, AnimationInfo, DecodedAnimation, GIF_MEDIA_TYPE};
pub use crate::encode::gif::GifCodec;
pub use crate::governor::limits::ResourceLimits;
pub use crate::governor::validate::{GovernorRequest, RejectReason, Rejection, SourceKind};
pub use crate::job::artifacts::{ArtifactId, ArtifactStats, OutputArtifact};
pub use crate::job::controller::JobController;
pub use crate::job::job::{EncodedAsset, Job, JobError, JobId, JobStats, JobStatus, SourceAsset};
pub use crate::job::observer::{JobObserver, NoopObserver, Phase, TracingObserver};
pub use crate::job::settings::{EncodeSettings, SettingsHandle};
pub use crate::media::ffmpeg::FfmpegMedia;
pub use crate::media::seekable::{MediaInfo, NoMedia, SeekableMedia};
pub use crate::source::acquire::AcquireOpts;
