//! JPEG-coded layers (`BGjp`, `FGjp`).

use log::warn;
use std::io::Cursor;
use zune_jpeg::JpegDecoder;
use zune_jpeg::zune_core::colorspace::ColorSpace;
use zune_jpeg::zune_core::options::DecoderOptions;

/// A decoded JPEG image with three channels per pixel.
#[derive(Debug, Clone)]
pub struct RgbImage {
    /// The width of the image.
    pub width: u16,
    /// The height of the image.
    pub height: u16,
    /// The RGB samples in row-major order.
    pub data: Vec<u8>,
}

fn options() -> DecoderOptions {
    DecoderOptions::default()
        .set_max_width(u16::MAX as usize)
        .set_max_height(u16::MAX as usize)
}

/// Read the dimensions of a JPEG image without decoding it.
pub fn dimensions(data: &[u8]) -> Option<(u16, u16)> {
    let mut decoder = JpegDecoder::new_with_options(Cursor::new(data), options());
    decoder.decode_headers().ok()?;
    let (width, height) = decoder.dimensions()?;

    Some((u16::try_from(width).ok()?, u16::try_from(height).ok()?))
}

/// Decode a JPEG image to RGB.
pub fn decode(data: &[u8]) -> Option<RgbImage> {
    let mut decoder = JpegDecoder::new_with_options(Cursor::new(data), options());
    decoder
        .decode_headers()
        .inspect_err(|e| warn!("failed to read JPEG headers: {e}"))
        .ok()?;

    let out_colorspace = match decoder.input_colorspace()? {
        ColorSpace::Luma | ColorSpace::LumaA => ColorSpace::Luma,
        _ => ColorSpace::RGB,
    };

    decoder.set_options(options().jpeg_set_out_colorspace(out_colorspace));
    let decoded = decoder
        .decode()
        .inspect_err(|e| warn!("failed to decode JPEG: {e}"))
        .ok()?;
    let (width, height) = decoder.dimensions()?;
    let width = u16::try_from(width).ok()?;
    let height = u16::try_from(height).ok()?;

    let data = if out_colorspace == ColorSpace::Luma {
        decoded.iter().flat_map(|&l| [l, l, l]).collect()
    } else {
        decoded
    };

    if data.len() != width as usize * height as usize * 3 {
        warn!("JPEG decoded to an unexpected number of samples");

        return None;
    }

    Some(RgbImage {
        width,
        height,
        data,
    })
}
