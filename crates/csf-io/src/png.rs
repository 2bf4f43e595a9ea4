//! PNG format support.
//!
//! Reads 8/16-bit gray, gray+alpha, RGB and RGBA images (palette and
//! sub-byte depths are expanded), together with the `iCCP` profile and the
//! `gAMA` chunk used to tell linear data from sRGB. `eXIf`, `pHYs` and the
//! text chunks are kept as [`Metadata`]. Writing embeds the ICC profile in a
//! zlib-compressed `iCCP` chunk ahead of the image data.

use crate::{
    Colorspace, Density, Format, IoError, IoResult, Metadata, PixelData, PixelLayout, RasterImage, TextEntry, TextKind,
};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

/// `gAMA` value (scaled by 100000) that marks linear data.
const LINEAR_GAMMA: u32 = 100_000;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RasterImage> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Reads a PNG from a byte slice.
pub fn read_from_memory(data: &[u8]) -> IoResult<RasterImage> {
    decode(Cursor::new(data))
}

fn decode<R: BufRead + Seek>(source: R) -> IoResult<RasterImage> {
    let mut decoder = png::Decoder::new(source);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let icc_profile = reader.info().icc_profile.as_ref().map(|p| p.to_vec());
    // gamma() also accounts for an sRGB chunk
    let linear = reader
        .info()
        .gamma()
        .is_some_and(|g| g.into_scaled() == LINEAR_GAMMA);
    let metadata = read_metadata(reader.info());

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let bytes = &buf[..info.buffer_size()];

    let layout = match info.color_type {
        png::ColorType::Grayscale => PixelLayout::Gray,
        png::ColorType::GrayscaleAlpha => PixelLayout::GrayAlpha,
        png::ColorType::Rgb => PixelLayout::Rgb,
        png::ColorType::Rgba => PixelLayout::Rgba,
        png::ColorType::Indexed => {
            return Err(IoError::UnsupportedBitDepth("unexpanded palette image".into()));
        }
    };

    let data = match info.bit_depth {
        png::BitDepth::Eight => PixelData::U8(bytes.to_vec()),
        png::BitDepth::Sixteen => PixelData::U16(bytes_to_u16(bytes)),
        other => {
            return Err(IoError::UnsupportedBitDepth(format!("{:?} {:?}", info.color_type, other)));
        }
    };

    let colorspace = match (layout, linear) {
        (PixelLayout::Gray | PixelLayout::GrayAlpha, false) => Colorspace::Gray,
        (PixelLayout::Gray | PixelLayout::GrayAlpha, true) => Colorspace::LinearGray,
        (_, false) => Colorspace::Srgb,
        (_, true) => Colorspace::Rgb,
    };

    tracing::trace!(
        width = info.width,
        height = info.height,
        ?layout,
        %colorspace,
        icc = icc_profile.as_ref().map(|p| p.len()),
        exif = metadata.exif.as_ref().map(|e| e.len()),
        text = metadata.text.len(),
        "decoded PNG"
    );

    Ok(RasterImage {
        width: info.width,
        height: info.height,
        format: Format::Png,
        layout,
        colorspace,
        data,
        icc_profile,
        metadata,
    })
}

fn read_metadata(info: &png::Info<'_>) -> Metadata {
    let mut text: Vec<TextEntry> = info
        .uncompressed_latin1_text
        .iter()
        .map(|t| TextEntry {
            kind: TextKind::Latin1,
            keyword: t.keyword.clone(),
            text: t.text.clone(),
        })
        .collect();
    for chunk in &info.compressed_latin1_text {
        match chunk.get_text() {
            Ok(value) => text.push(TextEntry {
                kind: TextKind::CompressedLatin1,
                keyword: chunk.keyword.clone(),
                text: value,
            }),
            Err(e) => tracing::warn!(keyword = %chunk.keyword, error = %e, "dropping unreadable zTXt chunk"),
        }
    }
    for chunk in &info.utf8_text {
        match chunk.get_text() {
            Ok(value) => text.push(TextEntry {
                kind: TextKind::Utf8,
                keyword: chunk.keyword.clone(),
                text: value,
            }),
            Err(e) => tracing::warn!(keyword = %chunk.keyword, error = %e, "dropping unreadable iTXt chunk"),
        }
    }

    Metadata {
        exif: info.exif_metadata.as_ref().map(|e| e.to_vec()),
        xmp: None,
        text,
        density: info.pixel_dims.map(|d| Density {
            x: d.xppu,
            y: d.yppu,
            per_meter: d.unit == png::Unit::Meter,
        }),
    }
}

/// Encodes an image as PNG, embedding its ICC profile.
pub fn encode(image: &RasterImage) -> IoResult<Vec<u8>> {
    let color_type = match image.layout {
        PixelLayout::Gray => png::ColorType::Grayscale,
        PixelLayout::GrayAlpha => png::ColorType::GrayscaleAlpha,
        PixelLayout::Rgb => png::ColorType::Rgb,
        PixelLayout::Rgba => png::ColorType::Rgba,
        PixelLayout::Cmyk => {
            return Err(IoError::EncodeError("PNG cannot store CMYK data".into()));
        }
    };

    let (bit_depth, samples) = match &image.data {
        PixelData::U8(v) => (png::BitDepth::Eight, Cow::Borrowed(v.as_slice())),
        PixelData::U16(v) => (png::BitDepth::Sixteen, Cow::Owned(u16_to_bytes(v))),
    };

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, image.width, image.height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        if matches!(image.colorspace, Colorspace::Rgb | Colorspace::LinearGray) {
            encoder.set_source_gamma(png::ScaledFloat::from_scaled(LINEAR_GAMMA));
        }
        encoder.set_pixel_dims(image.metadata.density.map(|d| png::PixelDimensions {
            xppu: d.x,
            yppu: d.y,
            unit: if d.per_meter { png::Unit::Meter } else { png::Unit::Unspecified },
        }));
        for entry in &image.metadata.text {
            let (keyword, text) = (entry.keyword.clone(), entry.text.clone());
            match entry.kind {
                TextKind::Latin1 => encoder.add_text_chunk(keyword, text),
                TextKind::CompressedLatin1 => encoder.add_ztxt_chunk(keyword, text),
                TextKind::Utf8 => encoder.add_itxt_chunk(keyword, text),
            }
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        if let Some(icc) = &image.icc_profile {
            writer
                .write_chunk(png::chunk::iCCP, &iccp_chunk(icc))
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        if let Some(exif) = &image.metadata.exif {
            writer
                .write_chunk(png::chunk::eXIf, exif)
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        writer
            .write_image_data(&samples)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
    }
    Ok(buffer)
}

/// `iCCP` payload: profile name, NUL, compression method 0, zlib data.
fn iccp_chunk(icc: &[u8]) -> Vec<u8> {
    let mut data = b"ICC Profile\0\0".to_vec();
    data.extend(miniz_oxide::deflate::compress_to_vec_zlib(icc, 7));
    data
}

/// Converts big-endian byte slice to u16 vector.
fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}

fn u16_to_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}
