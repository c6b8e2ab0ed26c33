//! Four-byte chunk signatures.

use core::fmt;

/// A four-byte ASCII tag identifying the kind of a chunk.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(pub [u8; 4]);

impl Signature {
    /// The magic that precedes the root chunk of every document.
    pub const ATNT: Self = Self(*b"AT&T");
    /// The signature shared by all container chunks.
    pub const FORM: Self = Self(*b"FORM");
    /// The sub-form tag of a multi-page document.
    pub const DJVM: Self = Self(*b"DJVM");
    /// The sub-form tag of a single page.
    pub const DJVU: Self = Self(*b"DJVU");
    /// The directory of a multi-page document.
    pub const DIRM: Self = Self(*b"DIRM");
    /// Page geometry.
    pub const INFO: Self = Self(*b"INFO");
    /// Wavelet-coded background.
    pub const BG44: Self = Self(*b"BG44");
    /// JPEG-coded background.
    pub const BGJP: Self = Self(*b"BGjp");
    /// JB2-coded mask.
    pub const SJBZ: Self = Self(*b"Sjbz");
    /// MMR-coded mask.
    pub const SMMR: Self = Self(*b"Smmr");
    /// Wavelet-coded foreground.
    pub const FG44: Self = Self(*b"FG44");
    /// JPEG-coded foreground.
    pub const FGJP: Self = Self(*b"FGjp");

    /// Create a signature from a byte string.
    ///
    /// Returns `None` if the slice is not exactly four bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Return the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether chunks with this signature follow the container convention.
    pub fn is_container(&self) -> bool {
        *self == Self::FORM
    }
}

impl From<[u8; 4]> for Signature {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::Signature;

    #[test]
    fn display() {
        assert_eq!(Signature::BGJP.to_string(), "BGjp");
        assert_eq!(Signature([b'A', 0, b'B', 0xff]).to_string(), "A\\x00B\\xff");
    }

    #[test]
    fn only_form_is_container() {
        assert!(Signature::FORM.is_container());
        assert!(!Signature::DJVU.is_container());
        assert_eq!(Signature::from_slice(b"FORMX"), None);
    }
}
