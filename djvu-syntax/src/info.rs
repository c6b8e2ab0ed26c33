//! Page geometry stored in the INFO chunk.

use crate::byte_reader::Reader;
use crate::chunk::{Chunk, Leaf};
use crate::error::{FormatError, ParseError, Result, bail};
use crate::log::lwarn;
use crate::signature::Signature;

const INFO_LEN: usize = 10;
const MINOR_VERSION: u8 = 26;
const MAJOR_VERSION: u8 = 0;

/// The display rotation of a page, with the codes used in the INFO chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0 = 1,
    /// Rotated by 90 degrees.
    Deg90 = 5,
    /// Rotated by 180 degrees.
    Deg180 = 2,
    /// Rotated by 270 degrees.
    Deg270 = 6,
}

impl Rotation {
    /// Return the rotation for an INFO rotation code (low three bits).
    ///
    /// Codes without a meaning map to [`Rotation::Deg0`].
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            5 => Self::Deg90,
            2 => Self::Deg180,
            6 => Self::Deg270,
            1 => Self::Deg0,
            other => {
                lwarn!("invalid rotation code {}, assuming no rotation", other);

                Self::Deg0
            }
        }
    }

    /// Return the INFO code of the rotation.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the rotation exchanges width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// The geometry of a page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// The width of the page in pixels, before rotation.
    pub width: u16,
    /// The height of the page in pixels, before rotation.
    pub height: u16,
    /// The resolution in dots per inch.
    pub dpi: u16,
    /// Ten times the display gamma.
    pub gamma: u8,
    /// The display rotation.
    pub rotation: Rotation,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            dpi: 300,
            gamma: 22,
            rotation: Rotation::Deg0,
        }
    }
}

impl PageInfo {
    /// Create the geometry of a `width` x `height` page with default settings.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Decode the geometry from an INFO chunk.
    pub fn from_chunk(chunk: &Chunk) -> Result<Self> {
        let leaf = chunk.as_leaf().ok_or(ParseError::SignatureMismatch)?;

        Self::from_leaf(leaf)
    }

    /// Decode the geometry from an INFO leaf.
    pub fn from_leaf(leaf: &Leaf) -> Result<Self> {
        if leaf.signature() != Signature::INFO {
            bail!(ParseError::SignatureMismatch);
        }

        if leaf.data().len() != INFO_LEN {
            bail!(FormatError::MalformedInfo);
        }

        let mut r = Reader::new(leaf.data());
        let mut read = || -> Option<Self> {
            let width = r.read_u16()?;
            let height = r.read_u16()?;
            r.skip_bytes(2)?;
            let dpi = r.read_u16_le()?;
            let gamma = r.read_byte()?;
            let rotation = Rotation::from_code(r.read_byte()?);

            Some(Self {
                width,
                height,
                dpi,
                gamma,
                rotation,
            })
        };

        read().ok_or(FormatError::MalformedInfo.into())
    }

    /// Encode the geometry as a new INFO chunk.
    pub fn to_chunk(&self) -> Chunk {
        let mut data = [0; INFO_LEN];
        data[4] = MINOR_VERSION;
        data[5] = MAJOR_VERSION;
        self.encode_into(&mut data, 0);

        Chunk::Leaf(Leaf::from_parts(Signature::INFO, data.to_vec()))
    }

    /// Update an existing INFO leaf in place.
    ///
    /// The version bytes and the upper five bits of the rotation byte are kept.
    pub fn write_to(&self, leaf: &mut Leaf) -> Result<()> {
        if leaf.signature() != Signature::INFO {
            bail!(ParseError::SignatureMismatch);
        }

        let data: &mut [u8; INFO_LEN] = leaf
            .data_mut()
            .try_into()
            .map_err(|_| FormatError::MalformedInfo)?;
        let reserved = data[9] & !0x07;
        self.encode_into(data, reserved);

        Ok(())
    }

    fn encode_into(&self, data: &mut [u8; INFO_LEN], reserved: u8) {
        data[0..2].copy_from_slice(&self.width.to_be_bytes());
        data[2..4].copy_from_slice(&self.height.to_be_bytes());
        data[6..8].copy_from_slice(&self.dpi.to_le_bytes());
        data[8] = self.gamma;
        data[9] = reserved | self.rotation.code();
    }

    /// Return the width and height of the page as displayed, after rotation.
    pub fn final_dimensions(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        let info = PageInfo {
            width: 0x0102,
            height: 0x0304,
            dpi: 600,
            gamma: 22,
            rotation: Rotation::Deg90,
        };
        let chunk = info.to_chunk();

        assert_eq!(
            chunk.as_leaf().unwrap().data(),
            [0x01, 0x02, 0x03, 0x04, 26, 0, 0x58, 0x02, 22, 5]
        );
        assert_eq!(PageInfo::from_chunk(&chunk), Ok(info));
        assert_eq!(info.final_dimensions(), (0x0304, 0x0102));
    }

    #[test]
    fn rotation_uses_low_bits() {
        let leaf = Leaf::new(Signature::INFO, [0, 1, 0, 1, 26, 0, 0, 0, 0, 0xfa]).unwrap();

        assert_eq!(
            PageInfo::from_leaf(&leaf).unwrap().rotation,
            Rotation::Deg180
        );
        assert_eq!(Rotation::from_code(0), Rotation::Deg0);
        assert_eq!(Rotation::from_code(7), Rotation::Deg0);
    }

    #[test]
    fn write_keeps_reserved_bits() {
        let mut leaf = Leaf::new(Signature::INFO, [0, 1, 0, 1, 25, 1, 0, 0, 0, 0xf9]).unwrap();
        let mut info = PageInfo::from_leaf(&leaf).unwrap();
        info.dpi = 150;
        info.rotation = Rotation::Deg270;
        info.write_to(&mut leaf).unwrap();

        assert_eq!(leaf.data(), [0, 1, 0, 1, 25, 1, 150, 0, 0, 0xfe]);
    }

    #[test]
    fn wrong_length() {
        let mut leaf = Leaf::new(Signature::INFO, [0; 9]).unwrap();

        assert_eq!(
            PageInfo::from_leaf(&leaf),
            Err(FormatError::MalformedInfo.into())
        );
        assert_eq!(
            PageInfo::default().write_to(&mut leaf),
            Err(FormatError::MalformedInfo.into())
        );
    }
}
