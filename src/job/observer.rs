use crate::foundation::error::ErrorKind;
use crate::job::job::{JobId, JobStats};

/// Which progress counter is moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Frames coming out of the frame source.
    Acquiring,
    /// Frames going through the resampler.
    Resampling,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Acquiring => "acquiring",
            Self::Resampling => "resampling",
        })
    }
}

/// Receives job progress and outcome, synchronously, from the controller.
pub trait JobObserver {
    /// `current` of `total` frames done in `phase`.
    fn on_progress(&mut self, job: JobId, phase: Phase, current: usize, total: usize) {
        let _ = (job, phase, current, total);
    }

    /// Frames are ready and the codec is about to run.
    fn on_encoding(&mut self, job: JobId) {
        let _ = job;
    }

    /// The job was rejected, failed or was cancelled.
    fn on_error(&mut self, job: JobId, kind: ErrorKind, message: &str) {
        let _ = (job, kind, message);
    }

    /// The job finished with an output artifact.
    fn on_done(&mut self, job: JobId, stats: &JobStats) {
        let _ = (job, stats);
    }
}

/// Ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl JobObserver for NoopObserver {}

/// Forwards job events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl JobObserver for TracingObserver {
    fn on_progress(&mut self, job: JobId, phase: Phase, current: usize, total: usize) {
        tracing::debug!(%job, %phase, current, total, "progress");
    }

    fn on_encoding(&mut self, job: JobId) {
        tracing::info!(%job, "encoding");
    }

    fn on_error(&mut self, job: JobId, kind: ErrorKind, message: &str) {
        match kind {
            ErrorKind::Cancelled => tracing::info!(%job, "cancelled"),
            _ => tracing::warn!(%job, %kind, message, "job error"),
        }
    }

    fn on_done(&mut self, job: JobId, stats: &JobStats) {
        tracing::info!(
            %job,
            frames = stats.frames_encoded,
            width = stats.output_width,
            height = stats.output_height,
            bytes = stats.output_bytes,
            "done"
        );
    }
}
