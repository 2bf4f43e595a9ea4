//! Profile-to-sRGB conversion.

use crate::{FixError, FixResult, ImageHandle, ImageStore};
use csf_icc::{ColorModel, IccError, Intent, Profile, SampleDepth, SrgbAsset, Transform};
use csf_io::{merge_alpha, Colorspace, PixelData, PixelLayout, RasterImage};

/// An image rewritten in sRGB.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    /// New raster, labelled [`Colorspace::Srgb`] and carrying the sRGB asset.
    pub image: RasterImage,
    /// Description of the embedded sRGB profile.
    pub icc_description: String,
}

/// Transforms images from their embedded profile to sRGB and writes them
/// back through an [`ImageStore`].
#[derive(Debug)]
pub struct Converter<S> {
    asset: SrgbAsset,
    intent: Intent,
    store: S,
}

impl<S: ImageStore> Converter<S> {
    /// Creates a converter with the perceptual intent.
    pub fn new(asset: SrgbAsset, store: S) -> Self {
        Self {
            asset,
            intent: Intent::default(),
            store,
        }
    }

    /// Sets the rendering intent.
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    /// The sRGB profile embedded into converted images.
    pub fn asset(&self) -> &SrgbAsset {
        &self.asset
    }

    /// Rendering intent in use.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Converts the image and replaces it in the store.
    ///
    /// Does not re-check the policy.
    ///
    /// # Errors
    ///
    /// [`FixError::Transform`] if the embedded profile is missing, malformed
    /// or does not fit the pixels; [`FixError::Write`] if the result cannot be
    /// persisted. The stored image is untouched in both cases.
    pub fn convert(&self, handle: &ImageHandle) -> FixResult<ConvertedImage> {
        let image = self.transform(handle.image())?;
        self.store.store(handle.path(), &image)?;

        tracing::debug!(
            path = %handle.path().display(),
            format = image.format.name(),
            intent = ?self.intent,
            "wrote sRGB image"
        );
        Ok(ConvertedImage {
            image,
            icc_description: self.asset.description().to_string(),
        })
    }

    /// Converts pixel data in memory without writing anything.
    pub fn transform(&self, image: &RasterImage) -> FixResult<RasterImage> {
        let icc = image
            .icc_profile
            .as_deref()
            .ok_or_else(|| FixError::Transform("image has no embedded profile".into()))?;
        let source = Profile::from_icc(icc).map_err(transform_error)?;
        let dest = self.asset.profile().map_err(transform_error)?;

        let model = match image.layout {
            PixelLayout::Gray | PixelLayout::GrayAlpha => ColorModel::Gray,
            PixelLayout::Rgb | PixelLayout::Rgba => ColorModel::Rgb,
            PixelLayout::Cmyk => ColorModel::Cmyk,
        };
        let depth = match image.data {
            PixelData::U8(_) => SampleDepth::Eight,
            PixelData::U16(_) => SampleDepth::Sixteen,
        };
        let transform = Transform::to_rgb(&source, model, depth, &dest, self.intent).map_err(transform_error)?;

        let data = match image.split_alpha() {
            (PixelData::U8(color), None) => PixelData::U8(transform.apply_u8(&color).map_err(transform_error)?),
            (PixelData::U8(color), Some(PixelData::U8(alpha))) => {
                let rgb = transform.apply_u8(&color).map_err(transform_error)?;
                PixelData::U8(merge_alpha(&rgb, &alpha))
            }
            (PixelData::U16(color), None) => PixelData::U16(transform.apply_u16(&color).map_err(transform_error)?),
            (PixelData::U16(color), Some(PixelData::U16(alpha))) => {
                let rgb = transform.apply_u16(&color).map_err(transform_error)?;
                PixelData::U16(merge_alpha(&rgb, &alpha))
            }
            _ => return Err(FixError::Transform("alpha depth differs from color depth".into())),
        };

        let layout = if image.layout.has_alpha() {
            PixelLayout::Rgba
        } else {
            PixelLayout::Rgb
        };

        Ok(RasterImage {
            width: image.width,
            height: image.height,
            format: image.format,
            layout,
            colorspace: Colorspace::Srgb,
            data,
            icc_profile: Some(self.asset.bytes().to_vec()),
            metadata: image.metadata.clone(),
        })
    }
}

fn transform_error(e: IccError) -> FixError {
    FixError::Transform(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsStore;
    use csf_icc::StandardProfile;
    use csf_io::{Format, Metadata};

    fn converter() -> Converter<FsStore> {
        Converter::new(SrgbAsset::builtin().unwrap(), FsStore::new())
    }

    fn tagged(layout: PixelLayout, colorspace: Colorspace, data: PixelData, icc: Vec<u8>) -> RasterImage {
        RasterImage {
            width: 2,
            height: 2,
            format: Format::Png,
            layout,
            colorspace,
            data,
            icc_profile: Some(icc),
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn test_adobe_rgb_to_srgb() {
        let icc = StandardProfile::AdobeRgb.to_profile().unwrap().to_icc().unwrap();
        let image = tagged(PixelLayout::Rgb, Colorspace::Srgb, PixelData::U8(vec![0, 200, 40].repeat(4)), icc);

        let out = converter().transform(&image).unwrap();
        assert_eq!(out.layout, PixelLayout::Rgb);
        assert_eq!(out.colorspace, Colorspace::Srgb);
        assert_eq!(out.data.len(), 12);
        assert_ne!(out.data, image.data);
        assert_eq!(out.icc_profile.as_deref(), Some(converter().asset().bytes()));
    }

    #[test]
    fn test_metadata_carried_through() {
        let icc = Profile::adobe_rgb().unwrap().to_icc().unwrap();
        let mut image = tagged(PixelLayout::Rgb, Colorspace::Srgb, PixelData::U8(vec![9; 12]), icc);
        image.metadata.exif = Some(vec![b'I', b'I', 42, 0]);
        image.metadata.xmp = Some(b"<x:xmpmeta/>".to_vec());

        let out = converter().transform(&image).unwrap();
        assert_eq!(out.metadata, image.metadata);
    }

    #[test]
    fn test_alpha_carried_through() {
        let icc = Profile::adobe_rgb().unwrap().to_icc().unwrap();
        let data = vec![10, 20, 30, 7, 40, 50, 60, 77, 70, 80, 90, 177, 100, 110, 120, 255];
        let image = tagged(PixelLayout::Rgba, Colorspace::Srgb, PixelData::U8(data), icc);

        let out = converter().transform(&image).unwrap();
        assert_eq!(out.layout, PixelLayout::Rgba);
        let PixelData::U8(samples) = out.data else {
            panic!("expected 8-bit output");
        };
        let alpha: Vec<u8> = samples.chunks_exact(4).map(|px| px[3]).collect();
        assert_eq!(alpha, vec![7, 77, 177, 255]);
    }

    #[test]
    fn test_gray_sixteen_bit_expands_to_rgb() {
        let icc = Profile::gray(1.8).unwrap().to_icc().unwrap();
        let image = tagged(
            PixelLayout::GrayAlpha,
            Colorspace::Gray,
            PixelData::U16(vec![0, 65535, 30000, 65535, 60000, 0, 1, 2]),
            icc,
        );

        let out = converter().transform(&image).unwrap();
        assert_eq!(out.layout, PixelLayout::Rgba);
        assert_eq!(out.data.bits(), 16);
        assert_eq!(out.data.len(), 16);
    }

    #[test]
    fn test_profile_pixel_mismatch() {
        let icc = Profile::gray(2.2).unwrap().to_icc().unwrap();
        let image = tagged(PixelLayout::Rgb, Colorspace::Srgb, PixelData::U8(vec![1; 12]), icc);
        assert!(matches!(converter().transform(&image), Err(FixError::Transform(_))));
    }

    #[test]
    fn test_malformed_profile() {
        let image = tagged(PixelLayout::Rgb, Colorspace::Srgb, PixelData::U8(vec![1; 12]), b"junk".to_vec());
        assert!(matches!(converter().transform(&image), Err(FixError::Transform(_))));

        let mut untagged = image;
        untagged.icc_profile = None;
        assert!(matches!(converter().transform(&untagged), Err(FixError::Transform(_))));
    }
}
