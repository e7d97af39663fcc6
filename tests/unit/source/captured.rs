use super::*;
use crate::media::seekable::MediaInfo;

/// Media whose frames are filled with a gray level derived from the requested timestamp.
struct ClipMedia {
    info: MediaInfo,
    position: f64,
    seeks: Vec<f64>,
    short_frame: bool,
}

impl ClipMedia {
    fn new(width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            info: MediaInfo {
                width,
                height,
                duration_secs,
            },
            position: 0.0,
            seeks: Vec::new(),
            short_frame: false,
        }
    }
}

impl SeekableMedia for ClipMedia {
    fn info(&self) -> MediaInfo {
        self.info
    }

    fn seek(&mut self, t_secs: f64) -> AnimResult<()> {
        self.position = t_secs;
        self.seeks.push(t_secs);
        Ok(())
    }

    async fn repositioned(&mut self) -> AnimResult<()> {
        Ok(())
    }

    fn has_enough_data(&self) -> bool {
        true
    }

    async fn data_available(&mut self) -> AnimResult<()> {
        Ok(())
    }

    fn read_frame(&mut self) -> AnimResult<Vec<u8>> {
        let len = self.info.size().rgba8_len();
        if self.short_frame {
            return Ok(vec![0; len / 2]);
        }
        let level = (self.position * 10.0).round() as u8;
        Ok(vec![level; len])
    }
}

#[tokio::test(start_paused = true)]
async fn one_second_window_at_ten_fps() {
    let mut media = ClipMedia::new(4, 2, 5.0);
    let settings = EncodeSettings::capture(10, 1.0, 3.0);
    let cancel = CancelToken::new();

    let mut source =
        CapturedFrameSource::new(&mut media, &settings, AcquireOpts::default()).unwrap();
    assert_eq!(source.total_frames(), 30);

    let mut frames = Vec::new();
    while source.has_more() {
        frames.push(source.next_frame(&cancel).await.unwrap());
    }
    assert_eq!(frames.len(), 30);
    assert!(frames.iter().all(|f| f.delay_ms == 100));
    assert!(frames.iter().all(|f| f.size() == Size::new(4, 2)));
    assert_eq!(frames[0].pixels[0], 10);
    assert_eq!(frames[29].pixels[0], 39);

    assert_eq!(media.seeks.len(), 30);
    assert!((media.seeks[0] - 1.0).abs() < 1e-9);
    assert!((media.seeks[29] - 3.9).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn fractional_window_rounds_frame_count_up() {
    let mut media = ClipMedia::new(2, 2, 5.0);
    let settings = EncodeSettings::capture(24, 0.0, 0.5);
    let source = CapturedFrameSource::new(&mut media, &settings, AcquireOpts::default()).unwrap();
    assert_eq!(source.total_frames(), 12);
    assert!((source.timestamp(11) - 11.0 / 24.0).abs() < 1e-12);
}

#[test]
fn missing_capture_fields_are_rejected() {
    let mut media = ClipMedia::new(2, 2, 5.0);
    let settings = EncodeSettings::default();
    let err = CapturedFrameSource::new(&mut media, &settings, AcquireOpts::default())
        .err()
        .unwrap();
    assert!(matches!(err, AnimError::Validation(_)));
}

#[tokio::test(start_paused = true)]
async fn short_frame_buffer_is_a_decode_error() {
    let mut media = ClipMedia::new(4, 4, 5.0);
    media.short_frame = true;
    let settings = EncodeSettings::capture(5, 0.0, 1.0);
    let cancel = CancelToken::new();
    let mut source =
        CapturedFrameSource::new(&mut media, &settings, AcquireOpts::default()).unwrap();

    let err = source.next_frame(&cancel).await.unwrap_err();
    assert!(matches!(err, AnimError::Decode(_)), "{err}");
    assert!(err.to_string().contains("frame at 0.000s"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn exhausted_source_errors() {
    let mut media = ClipMedia::new(2, 2, 5.0);
    let settings = EncodeSettings::capture(1, 0.0, 1.0);
    let cancel = CancelToken::new();
    let mut source =
        CapturedFrameSource::new(&mut media, &settings, AcquireOpts::default()).unwrap();

    source.next_frame(&cancel).await.unwrap();
    assert!(!source.has_more());
    assert!(source.next_frame(&cancel).await.is_err());
}
