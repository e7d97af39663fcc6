use std::collections::VecDeque;
use std::time::Duration;

use super::*;
use crate::media::seekable::MediaInfo;

#[derive(Clone, Copy, Debug)]
enum Step {
    Ready,
    Hang,
    Fail,
}

struct ScriptedMedia {
    seeks: Vec<f64>,
    reposition: VecDeque<Step>,
    enough_data: bool,
    data: Step,
    data_waits: u32,
    paint: Option<Step>,
    paint_waits: u32,
    cancel_on_reposition: Option<CancelToken>,
    cancel_on_data: Option<CancelToken>,
    cancel_on_paint: Option<CancelToken>,
}

impl ScriptedMedia {
    fn new(reposition: impl IntoIterator<Item = Step>) -> Self {
        Self {
            seeks: Vec::new(),
            reposition: reposition.into_iter().collect(),
            enough_data: true,
            data: Step::Ready,
            data_waits: 0,
            paint: None,
            paint_waits: 0,
            cancel_on_reposition: None,
            cancel_on_data: None,
            cancel_on_paint: None,
        }
    }
}

async fn play(step: Step) -> AnimResult<()> {
    match step {
        Step::Ready => Ok(()),
        Step::Hang => std::future::pending().await,
        Step::Fail => Err(AnimError::decode("media error")),
    }
}

impl SeekableMedia for ScriptedMedia {
    fn info(&self) -> MediaInfo {
        MediaInfo {
            width: 2,
            height: 2,
            duration_secs: 5.0,
        }
    }

    fn seek(&mut self, t_secs: f64) -> AnimResult<()> {
        self.seeks.push(t_secs);
        Ok(())
    }

    async fn repositioned(&mut self) -> AnimResult<()> {
        if let Some(token) = &self.cancel_on_reposition {
            token.cancel();
        }
        let step = self.reposition.pop_front().unwrap_or(Step::Ready);
        play(step).await
    }

    fn has_enough_data(&self) -> bool {
        self.enough_data
    }

    async fn data_available(&mut self) -> AnimResult<()> {
        self.data_waits += 1;
        if let Some(token) = &self.cancel_on_data {
            token.cancel();
        }
        play(self.data).await
    }

    fn supports_frame_painted(&self) -> bool {
        self.paint.is_some()
    }

    async fn frame_painted(&mut self) -> AnimResult<()> {
        self.paint_waits += 1;
        if let Some(token) = &self.cancel_on_paint {
            token.cancel();
        }
        play(self.paint.unwrap_or(Step::Ready)).await
    }

    fn read_frame(&mut self) -> AnimResult<Vec<u8>> {
        Ok(vec![0; 16])
    }
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_seeks_exactly_once() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    let cancel = CancelToken::new();

    acquire_frame(&mut media, 1.25, &cancel, &AcquireOpts::default())
        .await
        .unwrap();

    assert_eq!(media.seeks, vec![1.25]);
    assert_eq!(media.data_waits, 0);
    assert_eq!(media.paint_waits, 0);
}

#[tokio::test(start_paused = true)]
async fn waits_for_data_when_buffer_is_short() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    media.enough_data = false;
    let cancel = CancelToken::new();

    acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap();
    assert_eq!(media.data_waits, 1);
}

#[tokio::test(start_paused = true)]
async fn waits_for_paint_when_supported() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    media.paint = Some(Step::Ready);
    let cancel = CancelToken::new();

    acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap();
    assert_eq!(media.paint_waits, 1);
}

#[tokio::test(start_paused = true)]
async fn reposition_timeout_is_retried_with_jitter() {
    let mut media = ScriptedMedia::new([Step::Hang, Step::Hang, Step::Ready]);
    let cancel = CancelToken::new();
    let started = tokio::time::Instant::now();

    acquire_frame(&mut media, 2.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap();

    assert_eq!(media.seeks.len(), 3);
    assert_eq!(media.seeks[0], 2.0);
    assert!((media.seeks[1] - 2.0005).abs() < 1e-9);
    assert!((media.seeks[2] - 2.001).abs() < 1e-9);
    // two full reposition bounds elapsed on the paused clock
    assert!(started.elapsed() >= SEEK_TIMEOUT * 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_attempts_report_timeout() {
    let mut media = ScriptedMedia::new([Step::Hang, Step::Hang, Step::Hang, Step::Ready]);
    let cancel = CancelToken::new();

    let err = acquire_frame(&mut media, 0.5, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err}");
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Timeout);
    assert_eq!(media.seeks.len(), MAX_ATTEMPTS as usize);
    assert!(err.to_string().contains("after 3 attempts"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn paint_timeout_counts_as_retryable() {
    let mut media = ScriptedMedia::new(Vec::new());
    media.paint = Some(Step::Hang);
    let cancel = CancelToken::new();
    let opts = AcquireOpts {
        paint_timeout: Duration::from_millis(50),
        ..AcquireOpts::default()
    };

    let err = acquire_frame(&mut media, 0.0, &cancel, &opts)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(media.paint_waits, 3);
}

#[tokio::test(start_paused = true)]
async fn non_timeout_error_aborts_without_retry() {
    let mut media = ScriptedMedia::new([Step::Fail, Step::Ready]);
    let cancel = CancelToken::new();

    let err = acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Decode(_)), "{err}");
    assert_eq!(media.seeks.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_stops_before_seeking() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert!(media.seeks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_observed_after_reposition() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    media.enough_data = false;
    let cancel = CancelToken::new();
    media.cancel_on_reposition = Some(cancel.clone());

    let err = acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert_eq!(media.data_waits, 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_observed_after_data_wait() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    media.enough_data = false;
    media.paint = Some(Step::Ready);
    let cancel = CancelToken::new();
    media.cancel_on_data = Some(cancel.clone());

    let err = acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert_eq!(media.data_waits, 1);
    assert_eq!(media.paint_waits, 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_observed_after_paint_wait() {
    let mut media = ScriptedMedia::new([Step::Ready]);
    media.paint = Some(Step::Ready);
    let cancel = CancelToken::new();
    media.cancel_on_paint = Some(cancel.clone());

    let err = acquire_frame(&mut media, 0.0, &cancel, &AcquireOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert_eq!(media.paint_waits, 1);
    assert_eq!(media.seeks.len(), 1);
}

#[test]
fn jitter_grows_per_attempt() {
    let opts = AcquireOpts::default();
    assert_eq!(opts.jittered(3.0, 0), 3.0);
    assert!((opts.jittered(3.0, 2) - 3.001).abs() < 1e-12);
}
