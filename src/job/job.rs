use crate::encode::codec::AnimationCodec;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Size;
use crate::foundation::error::{AnimError, AnimResult, ErrorKind};
use crate::governor::validate::{GovernorRequest, SourceKind};
use crate::job::artifacts::ArtifactId;
use crate::job::settings::{EncodeSettings, SettingsHandle};
use crate::media::seekable::SeekableMedia;

/// Controller-assigned job handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to run, or rejected by the governor and waiting for new settings.
    Pending,
    /// The one job currently running.
    Processing,
    /// Output artifact available.
    Done,
    /// Runtime failure; see [`Job::error`].
    Failed,
    /// Stopped by the user.
    Cancelled,
}

impl JobStatus {
    /// `true` for `Done`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// Animated image bytes with header facts already probed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Raw input bytes.
    pub bytes: Vec<u8>,
    /// Natural canvas width.
    pub width: u32,
    /// Natural canvas height.
    pub height: u32,
    /// Frame count reported by the probe.
    pub frame_count: usize,
}

impl EncodedAsset {
    /// Probe `bytes` through `codec`.
    pub fn probe<C: AnimationCodec>(codec: &C, bytes: Vec<u8>) -> AnimResult<Self> {
        let info = codec.probe(&bytes)?;
        Ok(Self {
            bytes,
            width: info.width,
            height: info.height,
            frame_count: info.frame_count,
        })
    }
}

/// Input of a job: an encoded animation or a seekable media stream.
#[derive(Debug)]
pub enum SourceAsset<M> {
    /// Decoded-frame path.
    Encoded(EncodedAsset),
    /// Captured-frame path.
    Media(M),
}

impl<M: SeekableMedia> SourceAsset<M> {
    /// Natural (unscaled) dimensions.
    pub fn natural_size(&self) -> Size {
        match self {
            Self::Encoded(a) => Size::new(a.width, a.height),
            Self::Media(m) => m.info().size(),
        }
    }

    /// Input size in bytes, `0` when unknown.
    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Encoded(a) => a.bytes.len() as u64,
            Self::Media(m) => m.byte_len(),
        }
    }

    /// Media duration; `None` for encoded animations.
    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            Self::Encoded(_) => None,
            Self::Media(m) => Some(m.info().duration_secs),
        }
    }

    /// What the governor needs to know about this source.
    pub fn governor_request(&self) -> GovernorRequest {
        let kind = match self {
            Self::Encoded(a) => SourceKind::Decoded {
                frame_count: a.frame_count,
            },
            Self::Media(m) => SourceKind::Captured {
                duration_secs: m.info().duration_secs,
            },
        };
        GovernorRequest {
            natural: self.natural_size(),
            kind,
        }
    }
}

/// Error recorded on a job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobError {
    /// Category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&AnimError> for JobError {
    fn from(e: &AnimError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Per-run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    /// Frames produced by the frame source.
    pub frames_acquired: u64,
    /// Frames left after decimation.
    pub frames_kept: u64,
    /// Frames handed to the codec.
    pub frames_encoded: u64,
    /// Output width in pixels.
    pub output_width: u32,
    /// Output height in pixels.
    pub output_height: u32,
    /// Encoded output size in bytes.
    pub output_bytes: u64,
}

/// One transcoding request and its state.
#[derive(Debug)]
pub struct Job<M> {
    pub(crate) id: JobId,
    pub(crate) source: SourceAsset<M>,
    pub(crate) requested: SettingsHandle,
    pub(crate) active: Option<EncodeSettings>,
    pub(crate) status: JobStatus,
    pub(crate) output: Option<ArtifactId>,
    pub(crate) error: Option<JobError>,
    pub(crate) cancel: CancelToken,
    pub(crate) stats: JobStats,
}

impl<M> Job<M> {
    pub(crate) fn new(id: JobId, source: SourceAsset<M>, settings: EncodeSettings) -> Self {
        Self {
            id,
            source,
            requested: SettingsHandle::new(settings),
            active: None,
            status: JobStatus::Pending,
            output: None,
            error: None,
            cancel: CancelToken::new(),
            stats: JobStats::default(),
        }
    }

    /// Job handle.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Input asset.
    pub fn source(&self) -> &SourceAsset<M> {
        &self.source
    }

    /// Current lifecycle state.
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Last recorded error (validation rejection, failure or cancellation).
    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// Settings frozen when the job last started processing.
    pub fn active_settings(&self) -> Option<&EncodeSettings> {
        self.active.as_ref()
    }

    /// Caller-side editable settings.
    pub fn requested_settings(&self) -> &SettingsHandle {
        &self.requested
    }

    /// Handle of the output buffer, once `Done`.
    pub fn output_id(&self) -> Option<ArtifactId> {
        self.output
    }

    /// Counters from the last run.
    pub fn stats(&self) -> JobStats {
        self.stats
    }

    /// `true` once the job's cancellation token is set.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
