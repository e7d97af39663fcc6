use std::future::Future;
use std::time::Duration;

use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{AnimError, AnimResult};
use crate::media::seekable::SeekableMedia;

/// Bound for the reposition and data waits.
pub const SEEK_TIMEOUT: Duration = Duration::from_secs(8);
/// Bound for the frame-painted wait.
pub const PAINT_TIMEOUT: Duration = Duration::from_secs(2);
/// Attempts per frame, including the first.
pub const MAX_ATTEMPTS: u32 = 3;
/// Seek offset added per retry so a retry does not land on the same unreadable keyframe.
pub const JITTER_STEP_SECS: f64 = 0.0005;

/// Timing knobs for [`acquire_frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcquireOpts {
    /// Bound for the reposition and data waits.
    pub seek_timeout: Duration,
    /// Bound for the frame-painted wait.
    pub paint_timeout: Duration,
    /// Attempts per frame, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Seek offset added per retry, in seconds.
    pub jitter_step_secs: f64,
}

impl Default for AcquireOpts {
    fn default() -> Self {
        Self {
            seek_timeout: SEEK_TIMEOUT,
            paint_timeout: PAINT_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            jitter_step_secs: JITTER_STEP_SECS,
        }
    }
}

impl AcquireOpts {
    /// Seek target for a given 0-based attempt.
    pub fn jittered(&self, t_secs: f64, attempt: u32) -> f64 {
        t_secs + f64::from(attempt) * self.jitter_step_secs
    }
}

/// Reposition `media` to `t_secs` and wait until one frame at-or-near it is readable.
///
/// Each attempt runs these checkpoints in order:
/// 1. request the seek (with per-attempt jitter),
/// 2. wait for the reposition signal,
/// 3. wait for buffered data when the media reports it is short,
/// 4. wait for the paint notification, or yield one scheduler tick when there is none.
///
/// Only timeouts are retried, up to `opts.max_attempts` attempts; any other error aborts
/// immediately. `cancel` is polled on entry and after every await.
#[tracing::instrument(level = "debug", skip(media, cancel, opts))]
pub async fn acquire_frame<M: SeekableMedia>(
    media: &mut M,
    t_secs: f64,
    cancel: &CancelToken,
    opts: &AcquireOpts,
) -> AnimResult<()> {
    let attempts = opts.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        cancel.check()?;
        let target = opts.jittered(t_secs, attempt);
        match attempt_once(media, target, cancel, opts).await {
            Ok(()) => {
                if attempt > 0 {
                    tracing::debug!(attempt, target, "frame acquired after retry");
                }
                return Ok(());
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(attempt, target, error = %e, "frame acquisition timed out");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    let detail = last_err.map(|e| e.to_string()).unwrap_or_default();
    Err(AnimError::timeout(format!(
        "no frame at {t_secs:.3}s after {attempts} attempts ({detail})"
    )))
}

async fn attempt_once<M: SeekableMedia>(
    media: &mut M,
    target: f64,
    cancel: &CancelToken,
    opts: &AcquireOpts,
) -> AnimResult<()> {
    media.seek(target)?;

    bounded(opts.seek_timeout, "reposition", media.repositioned()).await?;
    cancel.check()?;

    if !media.has_enough_data() {
        bounded(opts.seek_timeout, "data", media.data_available()).await?;
        cancel.check()?;
    }

    if media.supports_frame_painted() {
        bounded(opts.paint_timeout, "paint", media.frame_painted()).await?;
    } else {
        tokio::task::yield_now().await;
    }
    cancel.check()?;

    Ok(())
}

async fn bounded<F>(limit: Duration, what: &str, fut: F) -> AnimResult<()>
where
    F: Future<Output = AnimResult<()>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(AnimError::timeout(format!(
            "{what} signal not received within {limit:?}"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/acquire.rs"]
mod tests;
