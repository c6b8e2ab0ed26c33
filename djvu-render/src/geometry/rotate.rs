use crate::error::{LayoutError, Result, bail};
use djvu_syntax::Rotation;

/// The size of an image buffer, if it can be represented.
pub(crate) fn buffer_len(width: u16, height: u16, channels: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels as usize)
}

fn check(
    rotation: Rotation,
    (old_w, old_h): (u16, u16),
    (new_w, new_h): (u16, u16),
    channels: u8,
) -> Result<usize> {
    if old_w == 0 || old_h == 0 || channels == 0 {
        bail!(LayoutError::InvalidDimensions);
    }

    let matches = if rotation.swaps_axes() {
        old_w == new_h && old_h == new_w
    } else {
        old_w == new_w && old_h == new_h
    };

    if !matches {
        bail!(LayoutError::InvalidDimensions);
    }

    buffer_len(old_w, old_h, channels).ok_or(LayoutError::InvalidDimensions.into())
}

fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() != expected {
        bail!(LayoutError::BufferSize {
            expected,
            found: buf.len(),
        });
    }

    Ok(())
}

/// Rotate an image from `src` into `dst`.
///
/// `old` are the dimensions of `src`, `new` those of `dst`. They must be equal
/// for [`Rotation::Deg0`] and [`Rotation::Deg180`] and swapped otherwise.
pub fn rotate_into(
    rotation: Rotation,
    old: (u16, u16),
    new: (u16, u16),
    channels: u8,
    src: &[u8],
    dst: &mut [u8],
) -> Result<()> {
    let len = check(rotation, old, new, channels)?;
    check_len(src, len)?;
    check_len(dst, len)?;

    let ch = channels as usize;
    let (old_w, old_h) = (old.0 as usize, old.1 as usize);
    let (new_w, new_h) = (new.0 as usize, new.1 as usize);
    let pixels = old_w * old_h;

    let target = |x: usize, y: usize| match rotation {
        Rotation::Deg0 => y * old_w + x,
        Rotation::Deg180 => pixels - 1 - (y * old_w + x),
        Rotation::Deg90 => new_w * x + (new_w - y - 1),
        Rotation::Deg270 => new_w * (new_h - x - 1) + y,
    };

    for (i, pixel) in src.chunks_exact(ch).enumerate() {
        let d = target(i % old_w, i / old_w) * ch;
        dst[d..d + ch].copy_from_slice(pixel);
    }

    Ok(())
}

/// Rotate an image in place.
///
/// For [`Rotation::Deg90`] and [`Rotation::Deg270`] the buffer afterwards holds
/// the image with the `new` (swapped) dimensions.
pub fn rotate(
    rotation: Rotation,
    old: (u16, u16),
    new: (u16, u16),
    channels: u8,
    buf: &mut [u8],
) -> Result<()> {
    let len = check(rotation, old, new, channels)?;
    check_len(buf, len)?;

    match rotation {
        Rotation::Deg0 => {}
        Rotation::Deg180 => {
            let ch = channels as usize;
            let pixels = len / ch;

            for i in 0..pixels / 2 {
                let j = pixels - 1 - i;

                for c in 0..ch {
                    buf.swap(i * ch + c, j * ch + c);
                }
            }
        }
        Rotation::Deg90 | Rotation::Deg270 => {
            let src = buf.to_vec();
            rotate_into(rotation, old, new, channels, &src, buf)?;
        }
    }

    Ok(())
}
