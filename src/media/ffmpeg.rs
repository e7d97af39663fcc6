use std::path::{Path, PathBuf};

use crate::foundation::core::Size;
use crate::foundation::error::{AnimError, AnimResult};
use crate::media::seekable::{MediaInfo, SeekableMedia};

/// Video file read through the system `ffprobe`/`ffmpeg` binaries.
///
/// Every reposition decodes exactly one RGBA frame at the requested timestamp on the blocking
/// pool, so `repositioned` resolves when that frame is in memory. There is no separate paint
/// notification; the acquisition protocol falls back to one scheduler tick.
#[derive(Debug)]
pub struct FfmpegMedia {
    source_path: PathBuf,
    info: MediaInfo,
    byte_len: u64,
    pending_seek: Option<f64>,
    current: Option<Vec<u8>>,
}

impl FfmpegMedia {
    /// Probe `path` and prepare it for seeking.
    pub fn open(path: impl AsRef<Path>) -> AnimResult<Self> {
        let path = path.as_ref();
        let info = probe_media(path)?;
        let byte_len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            source_path: path.to_path_buf(),
            info,
            byte_len,
            pending_seek: None,
            current: None,
        })
    }

    /// Path being decoded.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

impl SeekableMedia for FfmpegMedia {
    fn info(&self) -> MediaInfo {
        self.info
    }

    fn byte_len(&self) -> u64 {
        self.byte_len
    }

    fn seek(&mut self, t_secs: f64) -> AnimResult<()> {
        if !t_secs.is_finite() || t_secs < 0.0 {
            return Err(AnimError::validation(format!(
                "seek target must be a non-negative time, got {t_secs}"
            )));
        }
        self.pending_seek = Some(t_secs);
        self.current = None;
        Ok(())
    }

    async fn repositioned(&mut self) -> AnimResult<()> {
        let Some(t) = self.pending_seek.take() else {
            return Ok(());
        };
        let path = self.source_path.clone();
        let size = self.info.size();
        let frame = tokio::task::spawn_blocking(move || decode_frame_rgba8(&path, size, t))
            .await
            .map_err(|e| AnimError::Other(anyhow::anyhow!("ffmpeg decode task failed: {e}")))??;
        self.current = Some(frame);
        Ok(())
    }

    fn has_enough_data(&self) -> bool {
        self.current.is_some()
    }

    async fn data_available(&mut self) -> AnimResult<()> {
        // Decoding is all-or-nothing: if the reposition produced no frame, no more data is coming.
        if self.current.is_some() {
            return Ok(());
        }
        Err(AnimError::decode(format!(
            "ffmpeg produced no frame for '{}'",
            self.source_path.display()
        )))
    }

    fn read_frame(&mut self) -> AnimResult<Vec<u8>> {
        self.current.take().ok_or_else(|| {
            AnimError::decode(format!(
                "no decoded frame available for '{}'",
                self.source_path.display()
            ))
        })
    }
}

/// Probe width, height and duration of the first video stream.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_media(source_path: &Path) -> AnimResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| AnimError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AnimError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| AnimError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AnimError::decode("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| AnimError::decode("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| AnimError::decode("missing video height from ffprobe"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| AnimError::decode("missing duration from ffprobe"))?;

    Ok(MediaInfo {
        width,
        height,
        duration_secs,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe width, height and duration of the first video stream.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub fn probe_media(_source_path: &Path) -> AnimResult<MediaInfo> {
    Err(AnimError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Decode the RGBA frame presented at `t_secs`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_frame_rgba8(source_path: &Path, size: Size, t_secs: f64) -> AnimResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{t_secs:.6}")])
        .arg("-i")
        .arg(source_path)
        .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| AnimError::decode(format!("failed to run ffmpeg for frame decode: {e}")))?;

    if !out.status.success() {
        return Err(AnimError::decode(format!(
            "ffmpeg frame decode failed for '{}' at {t_secs:.3}s: {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = size.rgba8_len();
    if expected_len == 0 {
        return Err(AnimError::decode(
            "decoded frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(AnimError::decode(format!(
            "ffmpeg returned {} bytes at {t_secs:.3}s, expected {expected_len}",
            out.stdout.len()
        )));
    }

    let mut frame = out.stdout;
    frame.truncate(expected_len);
    Ok(frame)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode the RGBA frame presented at `t_secs`.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub fn decode_frame_rgba8(_source_path: &Path, _size: Size, _t_secs: f64) -> AnimResult<Vec<u8>> {
    Err(AnimError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn ffmpeg_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

// No unit tests here: these functions shell out to `ffprobe`/`ffmpeg` and are exercised by the
// feature-gated integration test in `tests/media_pipeline.rs`.
