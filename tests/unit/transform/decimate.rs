use super::*;
use crate::foundation::core::total_delay_ms;

fn seq(n: u32, delay_ms: u32) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame::solid(2, 2, delay_ms, [i as u8, 0, 0, 255]))
        .collect()
}

#[test]
fn k1_is_identity() {
    let mut frames = seq(5, 3);
    frames[2].delay_ms = 0;
    let out = decimate(frames.clone(), 1).unwrap();
    assert_eq!(out, frames);
}

#[test]
fn forty_frames_by_four_keeps_ten() {
    let frames = seq(40, 40);
    let out = decimate(frames, 4).unwrap();
    assert_eq!(out.len(), 10);
    for (i, f) in out.iter().enumerate() {
        assert_eq!(f.pixels[0], (i * 4) as u8, "kept frame {i} is source {}", i * 4);
        assert_eq!(f.delay_ms, 160);
    }
}

#[test]
fn short_delays_are_floor_clamped() {
    let out = decimate(seq(6, 2), 3).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|f| f.delay_ms == FLOOR_DELAY_MS));

    let out = decimate(seq(6, 0), 2).unwrap();
    assert!(out.iter().all(|f| f.delay_ms == FLOOR_DELAY_MS));
}

#[test]
fn tail_frames_are_kept_when_not_multiple() {
    // indices 0, 3, 6
    let out = decimate(seq(7, 20), 3).unwrap();
    let kept: Vec<u8> = out.iter().map(|f| f.pixels[0]).collect();
    assert_eq!(kept, vec![0, 3, 6]);
}

#[test]
fn total_duration_tracks_the_source() {
    let frames = seq(40, 50);
    let before = total_delay_ms(&frames);
    let out = decimate(frames, 4).unwrap();
    assert_eq!(total_delay_ms(&out), before);

    // uneven delays: sum of kept delays * k, each clamped
    let mut frames = seq(9, 30);
    frames[3].delay_ms = 70;
    let expected: u64 = [0usize, 3, 6]
        .iter()
        .map(|&i| u64::from(compensated_delay(frames[i].delay_ms, 3)))
        .sum();
    let out = decimate(frames, 3).unwrap();
    assert_eq!(total_delay_ms(&out), expected);
    assert_eq!(expected, 90 + 210 + 90);
}

#[test]
fn empty_input_is_a_decode_error() {
    let err = decimate(Vec::new(), 2).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Decode);
    assert!(err.to_string().contains("no decodable frames"));

    let err = decimate(Vec::new(), 1).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Decode);
}

#[test]
fn zero_factor_is_rejected() {
    let err = decimate(seq(3, 10), 0).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Validation);
}

#[test]
fn factor_larger_than_sequence_keeps_first_frame() {
    let out = decimate(seq(3, 40), 60).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].delay_ms, 2400);
}
