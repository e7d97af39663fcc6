use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Frame, Size, uniform_size};
use crate::foundation::error::{AnimError, AnimResult};

/// Yield to the scheduler after this many resampled frames.
pub const YIELD_EVERY_FRAMES: usize = 2;

const LANCZOS_LOBES: f64 = 3.0;

/// Output dimensions for a source scaled to at most `target_max_width`, aspect preserved.
///
/// `0` or a target at/above the source width keeps the source size (no upscaling).
pub fn output_size(src: Size, target_max_width: u32) -> Size {
    if target_max_width == 0 || src.width == 0 || target_max_width >= src.width {
        return src;
    }
    let h = (f64::from(src.height) * f64::from(target_max_width) / f64::from(src.width))
        .round()
        .max(1.0) as u32;
    Size::new(target_max_width, h)
}

/// Precomputed 1-D filter taps for one axis.
///
/// Output sample `i` reads `len[i]` source samples starting at `start[i]`, weighted by
/// `coeffs[i * taps..]`.
#[derive(Debug, Clone)]
struct AxisWeights {
    taps: usize,
    start: Vec<usize>,
    len: Vec<usize>,
    coeffs: Vec<f32>,
}

impl AxisWeights {
    fn new(src_len: u32, dst_len: u32) -> Self {
        let scale = f64::from(src_len) / f64::from(dst_len);
        // Widen the kernel when minifying so every source sample contributes.
        let filter_scale = scale.max(1.0);
        let support = LANCZOS_LOBES * filter_scale;
        let taps = (support * 2.0).ceil() as usize + 1;

        let mut start = Vec::with_capacity(dst_len as usize);
        let mut len = Vec::with_capacity(dst_len as usize);
        let mut coeffs = vec![0f32; taps * dst_len as usize];

        for i in 0..dst_len as usize {
            let center = (i as f64 + 0.5) * scale;
            let left = ((center - support).floor().max(0.0)) as usize;
            let right = ((center + support).ceil() as usize).min(src_len as usize);
            let n = right.saturating_sub(left).min(taps);

            let row = &mut coeffs[i * taps..i * taps + taps];
            let mut raw = Vec::with_capacity(n);
            for j in left..left + n {
                raw.push(lanczos3((j as f64 + 0.5 - center) / filter_scale));
            }
            let sum: f64 = raw.iter().sum();
            if sum.abs() > f64::EPSILON {
                for (w, r) in row.iter_mut().zip(&raw) {
                    *w = (r / sum) as f32;
                }
            } else {
                // Degenerate window: nearest neighbour.
                let nearest = (center.floor() as usize).min(src_len as usize - 1);
                start.push(nearest);
                len.push(1);
                row[0] = 1.0;
                continue;
            }

            start.push(left);
            len.push(n);
        }

        Self {
            taps,
            start,
            len,
            coeffs,
        }
    }

    #[inline]
    fn window(&self, i: usize) -> (usize, &[f32]) {
        let base = i * self.taps;
        (self.start[i], &self.coeffs[base..base + self.len[i]])
    }
}

fn lanczos3(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    if x.abs() >= LANCZOS_LOBES {
        return 0.0;
    }
    let px = std::f64::consts::PI * x;
    LANCZOS_LOBES * px.sin() * (px / LANCZOS_LOBES).sin() / (px * px)
}

#[derive(Debug)]
struct ResamplePlan {
    src: Size,
    dst: Size,
    horiz: AxisWeights,
    vert: AxisWeights,
}

/// Separable Lanczos-3 resampler with a reusable scratch raster.
///
/// Filtering happens in premultiplied-alpha space so fully transparent pixels never bleed their
/// (meaningless) color into visible neighbours. The intermediate horizontal-pass raster and the
/// filter weights are kept between frames; a sequence of same-sized frames allocates them once.
#[derive(Debug, Default)]
pub struct Resampler {
    scratch: Vec<f32>,
    plan: Option<ResamplePlan>,
    plans_built: u32,
}

impl Resampler {
    /// Create a resampler with an empty scratch raster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scratch raster capacity in samples.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Number of filter-weight tables built so far.
    pub fn plans_built(&self) -> u32 {
        self.plans_built
    }

    /// Resample one frame to exactly `dst`. The delay is carried over.
    pub fn resample_frame(&mut self, frame: &Frame, dst: Size) -> AnimResult<Frame> {
        let src = frame.size();
        if src.is_empty() || dst.is_empty() {
            return Err(AnimError::validation(format!(
                "cannot resample {src} to {dst}"
            )));
        }
        if frame.pixels.len() != src.rgba8_len() {
            return Err(AnimError::decode(format!(
                "frame buffer has {} bytes, expected {}",
                frame.pixels.len(),
                src.rgba8_len()
            )));
        }
        if src == dst {
            return Ok(frame.clone());
        }

        let needs_plan = !matches!(&self.plan, Some(p) if p.src == src && p.dst == dst);
        if needs_plan {
            self.plan = Some(ResamplePlan {
                src,
                dst,
                horiz: AxisWeights::new(src.width, dst.width),
                vert: AxisWeights::new(src.height, dst.height),
            });
            self.plans_built = self.plans_built.saturating_add(1);
        }
        let Some(plan) = self.plan.as_ref() else {
            return Err(AnimError::validation("resample plan missing"));
        };

        let scratch_len = dst.width as usize * src.height as usize * 4;
        self.scratch.clear();
        self.scratch.resize(scratch_len, 0.0);

        horizontal_pass(&frame.pixels, &mut self.scratch, src, dst.width, &plan.horiz);
        let mut out = vec![0u8; dst.rgba8_len()];
        vertical_pass(&self.scratch, &mut out, dst, &plan.vert);

        Frame::new(dst.width, dst.height, frame.delay_ms, out)
    }

    /// Scale every frame to one common size derived from `target_max_width`.
    ///
    /// All input frames must share dimensions. `progress(done, total)` fires after each frame;
    /// the task yields every [`YIELD_EVERY_FRAMES`] frames and polls `cancel` between frames.
    pub async fn resample_frames(
        &mut self,
        frames: Vec<Frame>,
        target_max_width: u32,
        cancel: &CancelToken,
        mut progress: impl FnMut(usize, usize),
    ) -> AnimResult<Vec<Frame>> {
        let Some(src) = uniform_size(&frames)? else {
            return Ok(frames);
        };
        let dst = output_size(src, target_max_width);
        let total = frames.len();

        if dst == src {
            cancel.check()?;
            progress(total, total);
            return Ok(frames);
        }

        tracing::debug!(%src, %dst, frames = total, "resampling");
        let mut out = Vec::with_capacity(total);
        for (i, frame) in frames.into_iter().enumerate() {
            cancel.check()?;
            out.push(self.resample_frame(&frame, dst)?);
            drop(frame);
            progress(i + 1, total);

            if (i + 1) % YIELD_EVERY_FRAMES == 0 {
                tokio::task::yield_now().await;
            }
        }
        cancel.check()?;
        Ok(out)
    }
}

fn horizontal_pass(src: &[u8], dst: &mut [f32], src_size: Size, dst_w: u32, w: &AxisWeights) {
    let sw = src_size.width as usize;
    let dw = dst_w as usize;
    for y in 0..src_size.height as usize {
        let row = &src[y * sw * 4..(y + 1) * sw * 4];
        for x in 0..dw {
            let (start, coeffs) = w.window(x);
            let mut acc = [0f32; 4];
            for (k, &c) in coeffs.iter().enumerate() {
                let px = &row[(start + k) * 4..(start + k) * 4 + 4];
                let a = f32::from(px[3]);
                let pa = a / 255.0;
                acc[0] += c * f32::from(px[0]) * pa;
                acc[1] += c * f32::from(px[1]) * pa;
                acc[2] += c * f32::from(px[2]) * pa;
                acc[3] += c * a;
            }
            let o = (y * dw + x) * 4;
            dst[o..o + 4].copy_from_slice(&acc);
        }
    }
}

fn vertical_pass(src: &[f32], dst: &mut [u8], dst_size: Size, w: &AxisWeights) {
    let dw = dst_size.width as usize;
    for y in 0..dst_size.height as usize {
        let (start, coeffs) = w.window(y);
        for x in 0..dw {
            let mut acc = [0f32; 4];
            for (k, &c) in coeffs.iter().enumerate() {
                let i = ((start + k) * dw + x) * 4;
                acc[0] += c * src[i];
                acc[1] += c * src[i + 1];
                acc[2] += c * src[i + 2];
                acc[3] += c * src[i + 3];
            }
            let o = (y * dw + x) * 4;
            let a = acc[3].clamp(0.0, 255.0);
            if a < 0.5 {
                dst[o..o + 4].copy_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let inv = 255.0 / a;
            dst[o] = to_u8(acc[0] * inv);
            dst[o + 1] = to_u8(acc[1] * inv);
            dst[o + 2] = to_u8(acc[2] * inv);
            dst[o + 3] = to_u8(a);
        }
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/transform/resample.rs"]
mod tests;
