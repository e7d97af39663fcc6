use super::*;

fn gradient(w: u32, h: u32, delay_ms: u32) -> Frame {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            px.extend_from_slice(&[(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 90, 255]);
        }
    }
    Frame::new(w, h, delay_ms, px).unwrap()
}

#[test]
fn output_size_rules() {
    let src = Size::new(1920, 1080);
    assert_eq!(output_size(src, 0), src);
    assert_eq!(output_size(src, 1920), src);
    assert_eq!(output_size(src, 4000), src);
    assert_eq!(output_size(src, 480), Size::new(480, 270));
    assert_eq!(output_size(Size::new(300, 101), 100), Size::new(100, 34));
    // extreme aspect still keeps one row
    assert_eq!(output_size(Size::new(1000, 1), 10), Size::new(10, 1));
}

#[tokio::test]
async fn identity_when_target_is_zero_or_wider() {
    let frames = vec![gradient(16, 8, 40), gradient(16, 8, 50)];
    let mut r = Resampler::new();
    let cancel = CancelToken::new();

    let out = r
        .resample_frames(frames.clone(), 0, &cancel, |_, _| {})
        .await
        .unwrap();
    assert_eq!(out, frames);

    let out = r
        .resample_frames(frames.clone(), 16, &cancel, |_, _| {})
        .await
        .unwrap();
    assert_eq!(out, frames);

    let out = r
        .resample_frames(frames.clone(), 99, &cancel, |_, _| {})
        .await
        .unwrap();
    assert_eq!(out, frames);
    assert_eq!(r.plans_built(), 0);
}

#[tokio::test]
async fn scaled_frames_share_target_dims_and_keep_delays() {
    let frames = vec![gradient(40, 30, 10), gradient(40, 30, 20), gradient(40, 30, 30)];
    let mut r = Resampler::new();
    let mut seen = Vec::new();
    let out = r
        .resample_frames(frames, 10, &CancelToken::new(), |i, n| seen.push((i, n)))
        .await
        .unwrap();

    assert_eq!(out.len(), 3);
    for f in &out {
        assert_eq!((f.width, f.height), (10, 8));
        assert_eq!(f.pixels.len(), 10 * 8 * 4);
    }
    let delays: Vec<u32> = out.iter().map(|f| f.delay_ms).collect();
    assert_eq!(delays, vec![10, 20, 30]);
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn scratch_and_weights_are_reused_across_frames() {
    let frames: Vec<Frame> = (0..6).map(|i| gradient(64, 48, 10 * i)).collect();
    let mut r = Resampler::new();
    let first = r.resample_frame(&frames[0], Size::new(16, 12)).unwrap();
    let cap = r.scratch_capacity();
    assert!(cap >= 16 * 48 * 4);

    let out = r
        .resample_frames(frames, 16, &CancelToken::new(), |_, _| {})
        .await
        .unwrap();
    assert_eq!(r.plans_built(), 1);
    assert_eq!(r.scratch_capacity(), cap);
    assert_eq!(out[0], first);
}

#[test]
fn solid_color_survives_resampling() {
    let src = Frame::solid(37, 23, 10, [200, 30, 60, 255]);
    let mut r = Resampler::new();
    let out = r.resample_frame(&src, Size::new(11, 7)).unwrap();
    assert!(out.pixels.chunks_exact(4).all(|px| px == [200, 30, 60, 255]));

    // translucent color keeps both its color and its alpha
    let src = Frame::solid(20, 20, 10, [10, 220, 120, 128]);
    let out = r.resample_frame(&src, Size::new(7, 7)).unwrap();
    assert!(out.pixels.chunks_exact(4).all(|px| px == [10, 220, 120, 128]));
}

#[test]
fn transparent_pixels_do_not_bleed_color() {
    // left half opaque red, right half fully transparent green
    let (w, h) = (32u32, 8u32);
    let mut px = Vec::new();
    for _ in 0..h {
        for x in 0..w {
            if x < w / 2 {
                px.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                px.extend_from_slice(&[0, 255, 0, 0]);
            }
        }
    }
    let src = Frame::new(w, h, 10, px).unwrap();
    let out = Resampler::new()
        .resample_frame(&src, Size::new(8, 2))
        .unwrap();
    for px in out.pixels.chunks_exact(4) {
        if px[3] > 0 {
            assert!(px[1] < 8, "green leaked into visible pixel: {px:?}");
        }
    }
}

#[tokio::test]
async fn mismatched_frame_sizes_are_rejected() {
    let frames = vec![gradient(16, 8, 10), gradient(8, 8, 10)];
    let err = Resampler::new()
        .resample_frames(frames, 4, &CancelToken::new(), |_, _| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Decode);
}

#[tokio::test]
async fn cancellation_is_observed_between_frames() {
    let frames: Vec<Frame> = (0..5).map(|_| gradient(16, 16, 10)).collect();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let mut done = 0;
    let err = Resampler::new()
        .resample_frames(frames, 8, &cancel, |i, _| {
            done = i;
            if i == 2 {
                trigger.cancel();
            }
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AnimError::Cancelled));
    assert_eq!(done, 2);
}

#[tokio::test]
async fn empty_input_passes_through() {
    let out = Resampler::new()
        .resample_frames(Vec::new(), 100, &CancelToken::new(), |_, _| {})
        .await
        .unwrap();
    assert!(out.is_empty());
}
