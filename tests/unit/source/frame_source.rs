use super::*;
use crate::foundation::error::AnimError;
use crate::media::seekable::NoMedia;

fn frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame::solid(3, 3, 20 + i as u32, [i as u8, 0, 0, 255]))
        .collect()
}

#[tokio::test]
async fn decoded_source_yields_in_order() {
    let mut source = DecodedFrameSource::from_frames(frames(4));
    let cancel = CancelToken::new();
    assert_eq!(source.total_frames(), 4);

    let mut seen = Vec::new();
    while source.has_more() {
        seen.push(source.next_frame(&cancel).await.unwrap().delay_ms);
    }
    assert_eq!(seen, vec![20, 21, 22, 23]);
    assert!(source.next_frame(&cancel).await.is_err());
}

#[tokio::test]
async fn collect_reports_progress_for_every_frame() {
    let mut source: AnyFrameSource<'_, NoMedia> =
        AnyFrameSource::Decoded(DecodedFrameSource::from_frames(frames(3)));
    let cancel = CancelToken::new();
    let mut ticks = Vec::new();

    let out = collect_frames(&mut source, &cancel, |done, total| ticks.push((done, total)))
        .await
        .unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(ticks, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn collect_stops_when_cancelled_midway() {
    let mut source = DecodedFrameSource::from_frames(frames(5));
    let cancel = CancelToken::new();
    let trigger = cancel.clone();

    let err = collect_frames(&mut source, &cancel, |done, _| {
        if done == 2 {
            trigger.cancel();
        }
    })
    .await
    .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert_eq!(source.total_frames(), 5);
    assert!(source.has_more());
}

#[tokio::test]
async fn empty_decoded_source_collects_nothing() {
    let mut source = DecodedFrameSource::from_frames(Vec::new());
    let out = collect_frames(&mut source, &CancelToken::new(), |_, _| {})
        .await
        .unwrap();
    assert!(out.is_empty());
}
