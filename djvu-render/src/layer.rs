//! Layer roles and the coders that can carry them.

use djvu_syntax::Signature;
use smallvec::SmallVec;

/// The role a layer plays in the composed page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    /// The color image behind everything else.
    Background,
    /// A bitonal mask selecting where the foreground shows.
    Mask,
    /// The color image shown through the mask.
    Foreground,
}

/// A chunk kind carrying layer data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Coder {
    /// Wavelet-coded background.
    Bg44,
    /// JPEG-coded background.
    BgJp,
    /// JB2-coded mask.
    Sjbz,
    /// MMR-coded mask.
    Smmr,
    /// Wavelet-coded foreground.
    Fg44,
    /// JPEG-coded foreground.
    FgJp,
}

impl Coder {
    /// All coders, in preference order within each role.
    pub const ALL: [Self; 6] = [
        Self::Bg44,
        Self::BgJp,
        Self::Sjbz,
        Self::Smmr,
        Self::Fg44,
        Self::FgJp,
    ];

    /// Return the signature of the chunks using this coder.
    pub fn signature(self) -> Signature {
        match self {
            Self::Bg44 => Signature::BG44,
            Self::BgJp => Signature::BGJP,
            Self::Sjbz => Signature::SJBZ,
            Self::Smmr => Signature::SMMR,
            Self::Fg44 => Signature::FG44,
            Self::FgJp => Signature::FGJP,
        }
    }

    /// Return the role of layers using this coder.
    pub fn role(self) -> Role {
        match self {
            Self::Bg44 | Self::BgJp => Role::Background,
            Self::Sjbz | Self::Smmr => Role::Mask,
            Self::Fg44 | Self::FgJp => Role::Foreground,
        }
    }

    /// Whether the coder produces a bitonal image.
    pub fn is_bitonal(self) -> bool {
        self.role() == Role::Mask
    }
}

impl Role {
    /// Return the coders for this role, most preferred first.
    pub fn preference(self) -> SmallVec<[Coder; 2]> {
        Coder::ALL.into_iter().filter(|c| c.role() == self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_order() {
        assert_eq!(
            Role::Background.preference().as_slice(),
            [Coder::Bg44, Coder::BgJp]
        );
        assert_eq!(Role::Mask.preference().as_slice(), [Coder::Sjbz, Coder::Smmr]);
        assert_eq!(
            Role::Foreground.preference().as_slice(),
            [Coder::Fg44, Coder::FgJp]
        );
    }
}
