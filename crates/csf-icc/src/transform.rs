//! Pixel transforms from an embedded source profile to an RGB destination.

use crate::{ColorModel, IccError, IccResult, Intent, Profile};
use lcms2::{PixelFormat, Pod, Transform as LcmsTransform};

/// Bits per sample of the pixel buffer handed to a [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    /// 8-bit samples.
    Eight,
    /// 16-bit samples (native endian).
    Sixteen,
}

enum Inner {
    Gray8(LcmsTransform<u8, [u8; 3]>),
    Rgb8(LcmsTransform<[u8; 3], [u8; 3]>),
    Cmyk8(LcmsTransform<[u8; 4], [u8; 3]>),
    Gray16(LcmsTransform<u16, [u16; 3]>),
    Rgb16(LcmsTransform<[u16; 3], [u16; 3]>),
    Cmyk16(LcmsTransform<[u16; 4], [u16; 3]>),
}

/// A color transform from a gray, RGB or CMYK source profile into an RGB
/// destination profile.
///
/// Input samples are interleaved color channels only (no alpha); output is
/// always interleaved RGB at the same depth.
///
/// # Example
///
/// ```rust
/// use csf_icc::{ColorModel, Intent, Profile, SampleDepth, Transform};
///
/// let gray = Profile::gray(2.2).unwrap();
/// let srgb = Profile::srgb();
/// let t = Transform::to_rgb(&gray, ColorModel::Gray, SampleDepth::Eight, &srgb, Intent::Perceptual).unwrap();
///
/// let rgb = t.apply_u8(&[0, 128, 255]).unwrap();
/// assert_eq!(rgb.len(), 9);
/// ```
pub struct Transform {
    inner: Inner,
    model: ColorModel,
}

impl Transform {
    /// Creates a transform from `source` (describing pixels of `model`) into
    /// the RGB profile `dest`.
    ///
    /// # Errors
    ///
    /// [`IccError::ColorSpaceMismatch`] when the source profile does not
    /// describe `model` or the destination is not RGB, and
    /// [`IccError::TransformFailed`] when lcms2 rejects the pair.
    pub fn to_rgb(
        source: &Profile,
        model: ColorModel,
        depth: SampleDepth,
        dest: &Profile,
        intent: Intent,
    ) -> IccResult<Self> {
        check_model(source, model)?;
        check_model(dest, ColorModel::Rgb)?;

        let inner = match (model, depth) {
            (ColorModel::Gray, SampleDepth::Eight) => {
                Inner::Gray8(build(source, PixelFormat::GRAY_8, dest, PixelFormat::RGB_8, intent)?)
            }
            (ColorModel::Rgb, SampleDepth::Eight) => {
                Inner::Rgb8(build(source, PixelFormat::RGB_8, dest, PixelFormat::RGB_8, intent)?)
            }
            (ColorModel::Cmyk, SampleDepth::Eight) => {
                Inner::Cmyk8(build(source, PixelFormat::CMYK_8, dest, PixelFormat::RGB_8, intent)?)
            }
            (ColorModel::Gray, SampleDepth::Sixteen) => {
                Inner::Gray16(build(source, PixelFormat::GRAY_16, dest, PixelFormat::RGB_16, intent)?)
            }
            (ColorModel::Rgb, SampleDepth::Sixteen) => {
                Inner::Rgb16(build(source, PixelFormat::RGB_16, dest, PixelFormat::RGB_16, intent)?)
            }
            (ColorModel::Cmyk, SampleDepth::Sixteen) => {
                Inner::Cmyk16(build(source, PixelFormat::CMYK_16, dest, PixelFormat::RGB_16, intent)?)
            }
        };

        tracing::trace!(?model, ?depth, ?intent, "created ICC transform");
        Ok(Self { inner, model })
    }

    /// Source sample depth of this transform.
    pub fn depth(&self) -> SampleDepth {
        match self.inner {
            Inner::Gray8(_) | Inner::Rgb8(_) | Inner::Cmyk8(_) => SampleDepth::Eight,
            Inner::Gray16(_) | Inner::Rgb16(_) | Inner::Cmyk16(_) => SampleDepth::Sixteen,
        }
    }

    /// Transforms interleaved 8-bit color samples into interleaved RGB.
    pub fn apply_u8(&self, samples: &[u8]) -> IccResult<Vec<u8>> {
        match &self.inner {
            Inner::Gray8(t) => Ok(run(t, samples)),
            Inner::Rgb8(t) => Ok(run(t, &pixels::<u8, 3>(samples)?)),
            Inner::Cmyk8(t) => Ok(run(t, &pixels::<u8, 4>(samples)?)),
            _ => Err(IccError::BufferMismatch(
                "8-bit samples passed to a 16-bit transform".into(),
            )),
        }
    }

    /// Transforms interleaved 16-bit color samples into interleaved RGB.
    pub fn apply_u16(&self, samples: &[u16]) -> IccResult<Vec<u16>> {
        match &self.inner {
            Inner::Gray16(t) => Ok(run(t, samples)),
            Inner::Rgb16(t) => Ok(run(t, &pixels::<u16, 3>(samples)?)),
            Inner::Cmyk16(t) => Ok(run(t, &pixels::<u16, 4>(samples)?)),
            _ => Err(IccError::BufferMismatch(
                "16-bit samples passed to an 8-bit transform".into(),
            )),
        }
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("model", &self.model)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

fn check_model(profile: &Profile, expected: ColorModel) -> IccResult<()> {
    match profile.color_model() {
        Some(model) if model == expected => Ok(()),
        _ => Err(IccError::ColorSpaceMismatch {
            expected: format!("{:?}", expected),
            actual: profile.color_space(),
        }),
    }
}

fn build<I: Copy + Pod, O: Copy + Pod>(
    source: &Profile,
    in_format: PixelFormat,
    dest: &Profile,
    out_format: PixelFormat,
    intent: Intent,
) -> IccResult<LcmsTransform<I, O>> {
    LcmsTransform::new(&source.inner, in_format, &dest.inner, out_format, intent.into())
        .map_err(|e| IccError::TransformFailed(e.to_string()))
}

/// Groups a flat sample buffer into fixed-size pixels.
fn pixels<T: Copy + Default, const N: usize>(flat: &[T]) -> IccResult<Vec<[T; N]>> {
    if flat.len() % N != 0 {
        return Err(IccError::BufferMismatch(format!(
            "{} samples is not a multiple of {} channels",
            flat.len(),
            N
        )));
    }
    Ok(flat
        .chunks_exact(N)
        .map(|c| {
            let mut px = [T::default(); N];
            px.copy_from_slice(c);
            px
        })
        .collect())
}

fn run<I: Copy + Pod, T: Copy + Default + Pod>(t: &LcmsTransform<I, [T; 3]>, input: &[I]) -> Vec<T> {
    let mut out = vec![[T::default(); 3]; input.len()];
    t.transform_pixels(input, &mut out);
    out.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_u8() {
        let srgb = Profile::srgb();
        let t = Transform::to_rgb(&srgb, ColorModel::Rgb, SampleDepth::Eight, &srgb, Intent::Perceptual)
            .unwrap();

        let original = [200u8, 120, 40, 0, 255, 128];
        let out = t.apply_u8(&original).unwrap();
        for (a, b) in original.iter().zip(&out) {
            assert!((*a as i32 - *b as i32).abs() <= 1, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_adobe_to_srgb_changes_saturated_green() {
        let adobe = Profile::adobe_rgb().unwrap();
        let srgb = Profile::srgb();
        let t = Transform::to_rgb(&adobe, ColorModel::Rgb, SampleDepth::Eight, &srgb, Intent::RelativeColorimetric)
            .unwrap();

        // Adobe RGB pure green lies outside sRGB and must clip.
        let out = t.apply_u8(&[0, 255, 0]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[1] > 200);
    }

    #[test]
    fn test_gray_expands_to_rgb() {
        let gray = Profile::gray(2.2).unwrap();
        let srgb = Profile::srgb();
        let t = Transform::to_rgb(&gray, ColorModel::Gray, SampleDepth::Sixteen, &srgb, Intent::Perceptual)
            .unwrap();

        let out = t.apply_u16(&[0, 32768, 65535]).unwrap();
        assert_eq!(out.len(), 9);
        // Neutral input stays neutral.
        assert!((out[3] as i32 - out[4] as i32).abs() < 64);
        assert!((out[4] as i32 - out[5] as i32).abs() < 64);
    }

    #[test]
    fn test_model_mismatch() {
        let gray = Profile::gray(2.2).unwrap();
        let srgb = Profile::srgb();
        let err = Transform::to_rgb(&gray, ColorModel::Rgb, SampleDepth::Eight, &srgb, Intent::Perceptual)
            .unwrap_err();
        assert!(matches!(err, IccError::ColorSpaceMismatch { .. }));
    }

    #[test]
    fn test_depth_mismatch() {
        let srgb = Profile::srgb();
        let t = Transform::to_rgb(&srgb, ColorModel::Rgb, SampleDepth::Eight, &srgb, Intent::Perceptual)
            .unwrap();
        assert!(t.apply_u16(&[1, 2, 3]).is_err());
        assert!(t.apply_u8(&[1, 2]).is_err());
    }
}
