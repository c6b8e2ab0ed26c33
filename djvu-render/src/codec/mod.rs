//! Decoders for layer data.
//!
//! JPEG layers are decoded here. Wavelet-coded layers (`BG44`, `FG44`) are not
//! supported, and bitonal masks are decoded by the caller through
//! [`RenderSettings::bitonal_decoder`](crate::RenderSettings::bitonal_decoder).

pub mod jpeg;
pub mod mmr;

use crate::layer::Coder;

/// Whether a color layer coded with `coder` can be decoded without help from
/// the caller.
pub(crate) fn has_builtin_decoder(coder: Coder) -> bool {
    matches!(coder, Coder::BgJp | Coder::FgJp)
}
