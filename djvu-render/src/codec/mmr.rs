//! MMR-coded masks (`Smmr`).
//!
//! Only the header is interpreted here. Decoding the G4 data itself is the job
//! of a caller-supplied bitonal decoder.

use djvu_syntax::byte_reader::Reader;

/// The header of an `Smmr` chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MmrHeader {
    /// Whether black is coded as zero.
    pub inverted: bool,
    /// Whether the data is split into independently coded stripes.
    pub striped: bool,
    /// The width of the mask.
    pub width: u16,
    /// The height of the mask.
    pub height: u16,
}

impl MmrHeader {
    /// The length of the header in bytes.
    pub const LEN: usize = 8;

    /// Parse the header at the start of an `Smmr` payload.
    ///
    /// Returns `None` if the magic is missing or reserved flag bits are set.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut r = Reader::new(data);
        r.forward_tag(b"MMR")?;

        let flags = r.read_byte()?;

        if flags & 0xfc != 0 {
            return None;
        }

        Some(Self {
            inverted: flags & 0x01 != 0,
            striped: flags & 0x02 != 0,
            width: r.read_u16()?,
            height: r.read_u16()?,
        })
    }
}
