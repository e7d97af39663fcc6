use crate::encode::codec::AnimationCodec;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::uniform_size;
use crate::foundation::error::{AnimError, AnimResult, ErrorKind};
use crate::governor::limits::ResourceLimits;
use crate::governor::validate::validate;
use crate::job::artifacts::{ArtifactRegistry, ArtifactStats, OutputArtifact};
use crate::job::job::{Job, JobError, JobId, JobStats, JobStatus, SourceAsset};
use crate::job::observer::{JobObserver, Phase};
use crate::job::settings::{EncodeSettings, SettingsHandle};
use crate::media::seekable::{NoMedia, SeekableMedia};
use crate::source::acquire::AcquireOpts;
use crate::source::captured::CapturedFrameSource;
use crate::source::decoded::DecodedFrameSource;
use crate::source::frame_source::{AnyFrameSource, collect_frames};
use crate::transform::decimate::decimate;
use crate::transform::resample::Resampler;

/// Owns a queue of jobs and runs them one at a time.
///
/// Every method that advances a job takes `&mut self`, so two jobs can never be `Processing`
/// together. Output buffers live in the controller's [`ArtifactRegistry`] and are released on
/// retry, source replacement and disposal.
pub struct JobController<C, M = NoMedia> {
    codec: C,
    limits: ResourceLimits,
    acquire: AcquireOpts,
    jobs: Vec<Job<M>>,
    next_id: u64,
    artifacts: ArtifactRegistry,
}

impl<C: AnimationCodec, M: SeekableMedia> JobController<C, M> {
    /// Controller with default limits and acquisition timing.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            limits: ResourceLimits::default(),
            acquire: AcquireOpts::default(),
            jobs: Vec::new(),
            next_id: 0,
            artifacts: ArtifactRegistry::new(),
        }
    }

    /// Replace the resource ceilings.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the acquisition timing.
    pub fn with_acquire_opts(mut self, opts: AcquireOpts) -> Self {
        self.acquire = opts;
        self
    }

    /// Active resource ceilings.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Codec used for decode and encode.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Queue a new `Pending` job.
    pub fn add(&mut self, source: SourceAsset<M>, settings: EncodeSettings) -> JobId {
        let id = JobId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.jobs.push(Job::new(id, source, settings));
        tracing::debug!(job = %id, "job added");
        id
    }

    /// Editable settings of a job. Edits apply the next time the job starts.
    pub fn settings(&self, id: JobId) -> AnimResult<SettingsHandle> {
        Ok(self.get(id)?.requested.clone())
    }

    /// Cancellation token of a job, for cancelling from observers or other tasks.
    pub fn cancel_token(&self, id: JobId) -> AnimResult<CancelToken> {
        Ok(self.get(id)?.cancel.clone())
    }

    /// Request cancellation. A `Pending` job moves to `Cancelled` right away; a running job stops
    /// at its next checkpoint. Terminal jobs are left alone.
    pub fn cancel(&mut self, id: JobId) -> AnimResult<()> {
        let job = self.get_mut(id)?;
        job.cancel.cancel();
        if job.status == JobStatus::Pending {
            job.status = JobStatus::Cancelled;
            job.error = Some(JobError::from(&AnimError::Cancelled));
            tracing::info!(job = %id, "pending job cancelled");
        }
        Ok(())
    }

    /// Look up a job.
    pub fn job(&self, id: JobId) -> Option<&Job<M>> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// All jobs in insertion order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job<M>> {
        self.jobs.iter()
    }

    /// Output of a `Done` job.
    pub fn output(&self, id: JobId) -> Option<&OutputArtifact> {
        self.job(id)
            .and_then(|j| j.output)
            .and_then(|aid| self.artifacts.get(aid))
    }

    /// Registry counters.
    pub fn artifact_stats(&self) -> ArtifactStats {
        self.artifacts.stats()
    }

    /// Run the oldest `Pending` job that has not been rejected. Returns its id, or `None` when
    /// nothing is runnable.
    pub async fn run_next(&mut self, observer: &mut dyn JobObserver) -> Option<JobId> {
        let id = self.jobs.iter().find(|j| is_runnable(j)).map(|j| j.id)?;
        self.run_job(id, observer).await;
        Some(id)
    }

    /// Run every currently runnable job once, in insertion order.
    pub async fn run_all(&mut self, observer: &mut dyn JobObserver) -> Vec<JobId> {
        let queued: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|j| is_runnable(j))
            .map(|j| j.id)
            .collect();

        let mut ran = Vec::with_capacity(queued.len());
        for id in queued {
            // An observer may have cancelled a queued job while an earlier one ran.
            if self.job(id).is_some_and(is_runnable) {
                self.run_job(id, observer).await;
                ran.push(id);
            }
        }
        ran
    }

    /// Re-run a job with a fresh settings snapshot.
    ///
    /// Allowed for `Done`, `Failed` and governor-rejected `Pending` jobs. Any previous output is
    /// released first. Cancelled jobs must be recreated.
    pub async fn retry(
        &mut self,
        id: JobId,
        observer: &mut dyn JobObserver,
    ) -> AnimResult<JobStatus> {
        let job = self.get(id)?;
        match job.status {
            JobStatus::Done | JobStatus::Failed | JobStatus::Pending => {}
            JobStatus::Cancelled => {
                return Err(AnimError::validation(format!(
                    "{id} was cancelled; add it again instead of retrying"
                )));
            }
            JobStatus::Processing => {
                return Err(AnimError::validation(format!("{id} is already processing")));
            }
        }

        self.reset(id)?;
        Ok(self.run_job(id, observer).await)
    }

    /// Swap the input of a job and put it back to `Pending`.
    pub fn replace_source(&mut self, id: JobId, source: SourceAsset<M>) -> AnimResult<()> {
        if self.get(id)?.status == JobStatus::Processing {
            return Err(AnimError::validation(format!("{id} is processing")));
        }
        self.reset(id)?;
        self.get_mut(id)?.source = source;
        Ok(())
    }

    /// Remove a job and release its output.
    pub fn dispose(&mut self, id: JobId) -> AnimResult<()> {
        let idx = self.index_of(id)?;
        let job = self.jobs.remove(idx);
        job.cancel.cancel();
        if let Some(aid) = job.output {
            self.artifacts.release(aid);
        }
        tracing::debug!(job = %id, "job disposed");
        Ok(())
    }

    fn reset(&mut self, id: JobId) -> AnimResult<()> {
        let idx = self.index_of(id)?;
        let job = &mut self.jobs[idx];
        if let Some(aid) = job.output.take() {
            self.artifacts.release(aid);
        }
        job.status = JobStatus::Pending;
        job.error = None;
        job.active = None;
        job.stats = JobStats::default();
        job.cancel = CancelToken::new();
        Ok(())
    }

    #[tracing::instrument(level = "info", skip_all, fields(job = %id))]
    async fn run_job(&mut self, id: JobId, observer: &mut dyn JobObserver) -> JobStatus {
        let Ok(idx) = self.index_of(id) else {
            return JobStatus::Pending;
        };
        let job = &mut self.jobs[idx];

        // Copy-on-start: the run only ever sees this snapshot.
        let settings = job.requested.snapshot();
        if let Err(rejection) = validate(&job.source.governor_request(), &settings, &self.limits) {
            let err = AnimError::from(rejection);
            tracing::info!(error = %err, "rejected by governor");
            job.error = Some(JobError::from(&err));
            observer.on_error(id, ErrorKind::Validation, &err.to_string());
            return job.status;
        }

        job.active = Some(settings.clone());
        job.status = JobStatus::Processing;
        job.error = None;
        job.stats = JobStats::default();
        tracing::info!(
            bytes = job.source.byte_len(),
            natural = %job.source.natural_size(),
            "processing"
        );

        let cancel = job.cancel.clone();
        let result = run_pipeline(
            &self.codec,
            &self.acquire,
            id,
            &mut job.source,
            &settings,
            &cancel,
            &mut job.stats,
            observer,
        )
        .await;

        match result {
            Ok(bytes) => {
                let artifact = OutputArtifact::new(bytes, self.codec.media_type());
                job.stats.output_bytes = artifact.byte_len as u64;
                job.output = Some(self.artifacts.acquire(artifact));
                job.status = JobStatus::Done;
                tracing::info!(bytes = job.stats.output_bytes, "done");
                observer.on_done(id, &job.stats);
            }
            Err(AnimError::Cancelled) => {
                job.status = JobStatus::Cancelled;
                job.error = Some(JobError::from(&AnimError::Cancelled));
                tracing::info!("cancelled");
                observer.on_error(id, ErrorKind::Cancelled, "cancelled");
            }
            Err(e) => {
                let e = e.with_context(id);
                job.status = JobStatus::Failed;
                job.error = Some(JobError::from(&e));
                tracing::warn!(error = %e, "failed");
                observer.on_error(id, e.kind(), &e.to_string());
            }
        }
        job.status
    }

    fn index_of(&self, id: JobId) -> AnimResult<usize> {
        self.jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| AnimError::validation(format!("unknown {id}")))
    }

    fn get(&self, id: JobId) -> AnimResult<&Job<M>> {
        let idx = self.index_of(id)?;
        Ok(&self.jobs[idx])
    }

    fn get_mut(&mut self, id: JobId) -> AnimResult<&mut Job<M>> {
        let idx = self.index_of(id)?;
        Ok(&mut self.jobs[idx])
    }
}

fn is_runnable<M>(job: &Job<M>) -> bool {
    job.status == JobStatus::Pending && job.error.is_none()
}

/// Source → decimate → resample → encode for one job.
#[allow(clippy::too_many_arguments)]
async fn run_pipeline<C: AnimationCodec, M: SeekableMedia>(
    codec: &C,
    acquire: &AcquireOpts,
    id: JobId,
    source: &mut SourceAsset<M>,
    settings: &EncodeSettings,
    cancel: &CancelToken,
    stats: &mut JobStats,
    observer: &mut dyn JobObserver,
) -> AnimResult<Vec<u8>> {
    cancel.check()?;

    let decoded_path = matches!(source, SourceAsset::Encoded(_));
    let mut frame_source = match source {
        SourceAsset::Encoded(asset) => {
            AnyFrameSource::Decoded(DecodedFrameSource::new(codec.decode(&asset.bytes)?))
        }
        SourceAsset::Media(media) => {
            AnyFrameSource::Captured(CapturedFrameSource::new(media, settings, *acquire)?)
        }
    };
    let raw = collect_frames(&mut frame_source, cancel, |current, total| {
        observer.on_progress(id, Phase::Acquiring, current, total);
    })
    .await?;
    drop(frame_source);
    stats.frames_acquired = raw.len() as u64;

    let kept = if decoded_path {
        decimate(raw, settings.decimation_factor)?
    } else if raw.is_empty() {
        return Err(AnimError::decode("no decodable frames"));
    } else {
        raw
    };
    stats.frames_kept = kept.len() as u64;

    let mut resampler = Resampler::new();
    let frames = resampler
        .resample_frames(kept, settings.target_max_width, cancel, |current, total| {
            observer.on_progress(id, Phase::Resampling, current, total);
        })
        .await?;
    let Some(size) = uniform_size(&frames)? else {
        return Err(AnimError::decode("no decodable frames"));
    };
    cancel.check()?;

    let max_colors = u8::try_from(settings.max_colors).map_err(|_| {
        AnimError::validation(format!("max_colors {} does not fit u8", settings.max_colors))
    })?;
    observer.on_encoding(id);
    let bytes = codec.encode(size.width, size.height, &frames, max_colors)?;
    cancel.check()?;

    stats.frames_encoded = frames.len() as u64;
    stats.output_width = size.width;
    stats.output_height = size.height;
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/job/controller.rs"]
mod tests;
