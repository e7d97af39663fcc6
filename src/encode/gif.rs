use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use image::AnimationDecoder as _;
use image::codecs::gif::GifDecoder;

use crate::encode::codec::{AnimationCodec, AnimationInfo, DecodedAnimation, GIF_MEDIA_TYPE};
use crate::foundation::core::{Frame, Size};
use crate::foundation::error::{AnimError, AnimResult};

/// Pixels with alpha below this map to the transparent palette entry.
pub const ALPHA_THRESHOLD: u8 = 128;

/// NeuQuant sampling factor: 1 is slowest/best, 30 fastest.
const NEUQUANT_SAMPLE_FACTOR: i32 = 10;

/// Upper bound on opaque pixels fed to palette training, across all frames.
const PALETTE_TRAINING_PIXELS: usize = 1 << 20;

/// GIF89a codec: `image` decodes, `gif` writes with one global palette.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifCodec;

impl GifCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }
}

impl AnimationCodec for GifCodec {
    fn media_type(&self) -> &'static str {
        GIF_MEDIA_TYPE
    }

    fn probe(&self, bytes: &[u8]) -> AnimResult<AnimationInfo> {
        let mut decoder = gif::DecodeOptions::new()
            .read_info(Cursor::new(bytes))
            .map_err(|e| AnimError::decode(format!("gif header: {e}")))?;
        let width = u32::from(decoder.width());
        let height = u32::from(decoder.height());

        let mut frame_count = 0usize;
        while decoder
            .read_next_frame()
            .map_err(|e| AnimError::decode(format!("gif frame {frame_count}: {e}")))?
            .is_some()
        {
            frame_count += 1;
        }

        Ok(AnimationInfo {
            width,
            height,
            frame_count,
        })
    }

    fn decode(&self, bytes: &[u8]) -> AnimResult<DecodedAnimation> {
        let decoder = GifDecoder::new(Cursor::new(bytes))
            .map_err(|e| AnimError::decode(format!("gif header: {e}")))?;
        let raw = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| AnimError::decode(format!("gif frames: {e}")))?;

        let mut frames = Vec::with_capacity(raw.len());
        for f in raw {
            let (numer, denom) = f.delay().numer_denom_ms();
            let delay_ms = if denom == 0 {
                0
            } else {
                (f64::from(numer) / f64::from(denom)).round() as u32
            };
            let buf = f.into_buffer();
            let (w, h) = buf.dimensions();
            frames.push(Frame::new(w, h, delay_ms, buf.into_raw())?);
        }

        let size = frames.first().map(Frame::size).unwrap_or(Size::new(0, 0));
        Ok(DecodedAnimation {
            width: size.width,
            height: size.height,
            frames,
        })
    }

    fn encode(
        &self,
        width: u32,
        height: u32,
        frames: &[Frame],
        max_colors: u8,
    ) -> AnimResult<Vec<u8>> {
        if frames.is_empty() {
            return Err(AnimError::encode("no frames to encode"));
        }
        let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(AnimError::encode(format!(
                    "{width}x{height} does not fit a gif canvas"
                )));
            }
        };
        let expected = Size::new(width, height);
        if let Some((i, f)) = frames.iter().enumerate().find(|(_, f)| f.size() != expected) {
            return Err(AnimError::encode(format!(
                "frame {i} is {}, expected {expected}",
                f.size()
            )));
        }
        if max_colors < 2 {
            return Err(AnimError::encode(format!(
                "palette needs at least 2 colors, got {max_colors}"
            )));
        }

        let palette = GlobalPalette::train(frames, max_colors);
        let mut encoder = gif::Encoder::new(Vec::new(), w16, h16, &palette.rgb)
            .map_err(|e| AnimError::encode(format!("gif header: {e}")))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| AnimError::encode(format!("gif loop extension: {e}")))?;

        for (i, frame) in frames.iter().enumerate() {
            let gif_frame = gif::Frame {
                width: w16,
                height: h16,
                delay: delay_centis(frame.delay_ms),
                dispose: gif::DisposalMethod::Background,
                transparent: palette.transparent,
                buffer: Cow::Owned(palette.index_frame(&frame.pixels)),
                ..gif::Frame::default()
            };
            encoder
                .write_frame(&gif_frame)
                .map_err(|e| AnimError::encode(format!("gif frame {i}: {e}")))?;
        }

        encoder
            .into_inner()
            .map_err(|e| AnimError::encode(format!("gif trailer: {e}")))
    }
}

/// Milliseconds to GIF centiseconds, rounded, never zero.
pub fn delay_centis(delay_ms: u32) -> u16 {
    let cs = (delay_ms.saturating_add(5) / 10).max(1);
    u16::try_from(cs).unwrap_or(u16::MAX)
}

/// One palette shared by every frame of the output.
struct GlobalPalette {
    lookup: ColorLookup,
    rgb: Vec<u8>,
    transparent: Option<u8>,
}

enum ColorLookup {
    /// Every opaque color fits; indices are exact.
    Exact(HashMap<[u8; 3], u8>),
    /// Too many colors; nearest neuron of the trained network.
    Quantized(color_quant::NeuQuant),
}

impl GlobalPalette {
    fn train(frames: &[Frame], max_colors: u8) -> Self {
        let has_transparency = frames
            .iter()
            .any(|f| f.pixels.chunks_exact(4).any(|px| px[3] < ALPHA_THRESHOLD));
        let opaque_colors = (usize::from(max_colors) - usize::from(has_transparency)).max(1);

        let (lookup, mut rgb) = match exact_colors(frames, opaque_colors) {
            Some(colors) => {
                let mut rgb = Vec::with_capacity(colors.len() * 3 + 3);
                let mut map = HashMap::with_capacity(colors.len());
                for (i, c) in colors.into_iter().enumerate() {
                    rgb.extend_from_slice(&c);
                    map.insert(c, i as u8);
                }
                if rgb.is_empty() {
                    rgb.extend_from_slice(&[0, 0, 0]);
                }
                (ColorLookup::Exact(map), rgb)
            }
            None => {
                let quant = color_quant::NeuQuant::new(
                    NEUQUANT_SAMPLE_FACTOR,
                    opaque_colors,
                    &training_samples(frames),
                );
                let rgb = quant.color_map_rgb();
                (ColorLookup::Quantized(quant), rgb)
            }
        };

        let transparent = if has_transparency {
            let idx = (rgb.len() / 3) as u8;
            rgb.extend_from_slice(&[0, 0, 0]);
            Some(idx)
        } else {
            None
        };

        Self {
            lookup,
            rgb,
            transparent,
        }
    }

    fn index_frame(&self, pixels: &[u8]) -> Vec<u8> {
        pixels
            .chunks_exact(4)
            .map(|px| match self.transparent {
                Some(t) if px[3] < ALPHA_THRESHOLD => t,
                _ => self.index_of([px[0], px[1], px[2]]),
            })
            .collect()
    }

    fn index_of(&self, rgb: [u8; 3]) -> u8 {
        match &self.lookup {
            ColorLookup::Exact(map) => map.get(&rgb).copied().unwrap_or(0),
            ColorLookup::Quantized(quant) => quant.index_of(&[rgb[0], rgb[1], rgb[2], 255]) as u8,
        }
    }
}

/// Distinct opaque colors in first-seen order, or `None` once there are more than `limit`.
fn exact_colors(frames: &[Frame], limit: usize) -> Option<Vec<[u8; 3]>> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for px in frames.iter().flat_map(|f| f.pixels.chunks_exact(4)) {
        if px[3] < ALPHA_THRESHOLD {
            continue;
        }
        let c = [px[0], px[1], px[2]];
        if seen.insert(c) {
            if ordered.len() == limit {
                return None;
            }
            ordered.push(c);
        }
    }
    Some(ordered)
}

/// Opaque pixels from all frames, evenly strided down to the training budget.
fn training_samples(frames: &[Frame]) -> Vec<u8> {
    let total_px: usize = frames.iter().map(|f| f.pixels.len() / 4).sum();
    let stride = total_px.div_ceil(PALETTE_TRAINING_PIXELS).max(1);
    let mut samples = Vec::with_capacity((total_px / stride + 1) * 4);
    for px in frames
        .iter()
        .flat_map(|f| f.pixels.chunks_exact(4))
        .step_by(stride)
        .filter(|px| px[3] >= ALPHA_THRESHOLD)
    {
        samples.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    if samples.is_empty() {
        samples.extend_from_slice(&[0, 0, 0, 255]);
    }
    samples
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
