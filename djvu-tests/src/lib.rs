//! Fixtures shared by the integration tests.

use djvu_syntax::{Container, Leaf, PageInfo, Signature};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

/// Encode an RGB image as a JPEG file, with the color of each pixel given by
/// `color(x, y)`.
pub fn jpeg(width: u16, height: u16, color: impl Fn(u16, u16) -> [u8; 3]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&color(x, y));
        }
    }

    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, 100)
        .encode(&pixels, width as u32, height as u32, ExtendedColorType::Rgb8)
        .unwrap();

    data
}

/// Encode a single-color JPEG file.
pub fn flat_jpeg(width: u16, height: u16, color: [u8; 3]) -> Vec<u8> {
    jpeg(width, height, |_, _| color)
}

/// Build a page with the given geometry and layer chunks.
pub fn page(info: PageInfo, layers: Vec<(Signature, Vec<u8>)>) -> Container {
    let mut page = Container::new_page();
    page.push(info.to_chunk());

    for (signature, data) in layers {
        page.push(Leaf::new(signature, data).unwrap());
    }

    page
}

/// Whether two colors differ by at most `tolerance` in every channel.
pub fn close(a: [u8; 3], b: [u8; 3], tolerance: u8) -> bool {
    a.iter().zip(b).all(|(a, b)| a.abs_diff(b) <= tolerance)
}
