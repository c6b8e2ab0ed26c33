//! Error types for page composition.

use core::fmt;

/// The main error type for page composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// The page structure could not be read.
    Syntax(djvu_syntax::Error),
    /// The page or the output buffer has an unusable shape.
    Layout(LayoutError),
    /// A layer could not be decoded.
    Decode(DecodeError),
    /// The layers of the page cannot be combined.
    Compose(ComposeError),
}

/// Errors related to the shape of a page or of the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The first child of the page is not an INFO chunk.
    MissingInfo,
    /// The page has no background or mask layer that can be decoded.
    NoLayer,
    /// A buffer does not have the size required by its dimensions.
    BufferSize {
        /// The required size in bytes.
        expected: usize,
        /// The actual size in bytes.
        found: usize,
    },
    /// The page has a zero dimension or dimensions that do not match the
    /// requested rotation.
    InvalidDimensions,
}

/// Errors related to decoding a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The coder failed to decode the layer data.
    Codec,
    /// The decoded layer is larger than the page.
    LargerThanPage,
    /// The decoded layer is smaller than the page and resampling is disabled.
    SmallerThanPage,
    /// No decoder is available for the layer.
    UnsupportedCoder,
    /// The layer chunk disappeared from the page.
    MissingChunk,
}

/// Errors related to combining layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeError {
    /// A mask was decoded on top of a background, but there is no foreground
    /// to apply it to.
    MaskWithoutForeground,
    /// The foreground stage was reached without a retained mask and background.
    ForegroundWithoutMask,
    /// The renderer was advanced after it finished.
    Finished,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::Layout(e) => write!(f, "{e}"),
            Self::Decode(e) => write!(f, "{e}"),
            Self::Compose(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInfo => write!(f, "page does not start with an INFO chunk"),
            Self::NoLayer => write!(f, "page has no decodable background or mask"),
            Self::BufferSize { expected, found } => {
                write!(f, "buffer has {found} bytes, expected {expected}")
            }
            Self::InvalidDimensions => write!(f, "invalid image dimensions"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec => write!(f, "failed to decode layer"),
            Self::LargerThanPage => write!(f, "layer is larger than the page"),
            Self::SmallerThanPage => write!(f, "layer is smaller than the page"),
            Self::UnsupportedCoder => write!(f, "unsupported layer coder"),
            Self::MissingChunk => write!(f, "layer chunk is missing"),
        }
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaskWithoutForeground => {
                write!(f, "mask over a background requires a foreground")
            }
            Self::ForegroundWithoutMask => {
                write!(f, "foreground requires a mask and a background")
            }
            Self::Finished => write!(f, "renderer already finished"),
        }
    }
}

impl core::error::Error for RenderError {}
impl core::error::Error for LayoutError {}
impl core::error::Error for DecodeError {}
impl core::error::Error for ComposeError {}

impl From<djvu_syntax::Error> for RenderError {
    fn from(e: djvu_syntax::Error) -> Self {
        Self::Syntax(e)
    }
}

impl From<LayoutError> for RenderError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<DecodeError> for RenderError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<ComposeError> for RenderError {
    fn from(e: ComposeError) -> Self {
        Self::Compose(e)
    }
}

/// Result type for page composition.
pub type Result<T> = core::result::Result<T, RenderError>;

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

pub(crate) use bail;
