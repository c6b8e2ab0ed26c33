use crate::error::{DecodeError, LayoutError, Result, bail};
use crate::geometry::rotate::buffer_len;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FirImage,
};
use log::warn;

/// Scale an image up to the given dimensions.
///
/// Only enlarging is supported: a source that is larger than the target in
/// either axis fails with [`DecodeError::LargerThanPage`]. A source with the
/// target dimensions is returned unchanged.
pub fn resample(
    src: Vec<u8>,
    old: (u16, u16),
    new: (u16, u16),
    channels: u8,
) -> Result<Vec<u8>> {
    if old.0 > new.0 || old.1 > new.1 {
        bail!(DecodeError::LargerThanPage);
    }

    let len = buffer_len(old.0, old.1, channels).ok_or(LayoutError::InvalidDimensions)?;

    if src.len() != len {
        bail!(LayoutError::BufferSize {
            expected: len,
            found: src.len(),
        });
    }

    if old == new {
        return Ok(src);
    }

    let pixel_type = match channels {
        1 => PixelType::U8,
        3 => PixelType::U8x3,
        _ => bail!(LayoutError::InvalidDimensions),
    };

    let src_image = FirImage::from_vec_u8(old.0 as u32, old.1 as u32, src, pixel_type)
        .map_err(|_| LayoutError::InvalidDimensions)?;
    let mut dst_image = FirImage::new(new.0 as u32, new.1 as u32, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom)),
        )
        .map_err(|e| {
            warn!("failed to resample layer: {e}");

            DecodeError::Codec
        })?;

    Ok(dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[test]
    fn enlarge_flat() {
        let out = resample(vec![40; 2 * 2 * 3], (2, 2), (4, 3), 3).unwrap();

        assert_eq!(out.len(), 4 * 3 * 3);
        assert!(out.iter().all(|v| (39..=41).contains(v)));
    }

    #[test]
    fn same_size_is_identity() {
        let data = vec![1, 2, 3, 4];

        assert_eq!(resample(data.clone(), (2, 2), (2, 2), 1).unwrap(), data);
    }

    #[test]
    fn larger_source_fails() {
        assert_eq!(
            resample(vec![0; 6], (3, 2), (2, 4), 1),
            Err(RenderError::Decode(DecodeError::LargerThanPage))
        );
    }
}
