/*!
Composes the image layers of DjVu pages into rasters.

A DjVu page holds up to three image layers: a color background, a bitonal mask
and a color foreground that shows wherever the mask is set. [`PageRenderer`]
decodes them one stage per call to [`PageRenderer::advance`], so that callers
can stop between stages, and writes the result into a buffer the caller owns.
[`render_page`] drives all stages at once.

JPEG-coded layers are decoded with `zune-jpeg`. Wavelet-coded layers are not
supported and are treated as absent. Bitonal masks are decoded by a callback in
[`RenderSettings`].

# Example
```rust,no_run
use djvu_render::{RenderSettings, render_page};
use djvu_syntax::{Document, NoExternalFiles};

let data = std::fs::read("page.djvu").unwrap();
let doc = Document::from_bytes(&data).unwrap();
let page = doc.get_page(0, &mut NoExternalFiles).unwrap();

let raster = render_page(&page, &RenderSettings::default()).unwrap();
std::fs::write("page.png", raster.take_png().unwrap()).unwrap();
```

# Cargo features
- `png` (default): Export rasters as PNG and PNM through the `image` crate.
- `logging`: Forward diagnostics of `djvu-syntax` to the `log` crate.
*/

#![forbid(unsafe_code)]

use std::sync::Arc;

pub mod codec;
mod compose;
mod error;
pub mod geometry;
mod layer;
mod raster;

pub use compose::{PageRenderer, Stage, Step, render_page};
pub use djvu_syntax;
pub use error::{ComposeError, DecodeError, LayoutError, RenderError, Result};
pub use layer::{Coder, Role};
pub use raster::Raster;

/// A request to decode a bitonal mask.
#[derive(Debug, Copy, Clone)]
pub struct BitonalQuery<'a> {
    /// The coder of the mask data.
    pub coder: Coder,
    /// The payload of the mask chunk.
    pub data: &'a [u8],
    /// The width of the mask, before rotation.
    pub width: u16,
    /// The height of the mask, before rotation.
    pub height: u16,
}

/// A callback function for decoding bitonal masks.
///
/// The callback returns `width * height` samples in row-major order, where `0`
/// is ink and `255` is paper, or `None` if the mask cannot be decoded.
pub type BitonalDecoderFn = Arc<dyn Fn(BitonalQuery<'_>) -> Option<Vec<u8>> + Send + Sync>;

/// A callback function for collecting warnings during composition.
pub type WarningSinkFn = Arc<dyn Fn(RenderWarning) + Send + Sync>;

/// Settings that should be applied when composing a page.
#[derive(Clone)]
pub struct RenderSettings {
    /// A decoder for `Sjbz` and `Smmr` masks.
    ///
    /// No bitonal decoder is built in. Without this callback, masks count as
    /// absent and pages are rendered from their background alone.
    pub bitonal_decoder: Option<BitonalDecoderFn>,

    /// Receives a warning whenever a layer is skipped or adjusted.
    pub warning_sink: WarningSinkFn,

    /// Whether color layers that are smaller than the page are scaled up to
    /// the page dimensions. If disabled, such layers fail to decode.
    pub resample: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bitonal_decoder: None,
            warning_sink: Arc::new(|_| {}),
            resample: true,
        }
    }
}

/// Warnings that can occur while composing a page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderWarning {
    /// A layer uses a coder that is not supported and was skipped.
    UnsupportedCoder(Coder),
    /// A mask was skipped because no bitonal decoder is configured.
    MissingBitonalDecoder(Coder),
    /// A layer was scaled up to the page dimensions.
    Resampled(Coder),
}
