//! Error types for reading and writing chunk trees.

use core::fmt;
use std::io;

/// The main error type for chunk tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Errors related to reading raw bytes.
    Parse(ParseError),
    /// Errors related to the structure of a chunk or its payload.
    Format(FormatError),
    /// An error reported by the underlying byte source or sink.
    Io(io::ErrorKind),
    /// An offset or length does not fit into its integer type.
    Overflow,
    /// The caller was built against an incompatible chunk layout.
    Incompatible {
        /// The compatibility tag of this library.
        expected: u32,
        /// The compatibility tag that was presented.
        found: u32,
    },
    /// An index or lookup did not resolve to anything.
    NotFound,
    /// Feature not yet implemented.
    Unsupported,
}

/// Errors related to reading raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected end of input.
    UnexpectedEof,
    /// The document does not start with the `AT&T` magic.
    InvalidMagic,
    /// A chunk carried a different signature than expected.
    SignatureMismatch,
}

/// Errors related to the structure of a chunk or its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A child chunk extends past the end of its container.
    LengthExceedsContainer,
    /// A leaf was created with the container signature.
    LeafWithContainerSignature,
    /// A multi-page document has no directory as its first child.
    MissingDirectory,
    /// The directory payload is truncated.
    MalformedDirectory,
    /// The INFO payload does not have the expected length.
    MalformedInfo,
    /// The root chunk is neither a page nor a multi-page document.
    NotADocument,
    /// A child was inserted past the end of a container.
    IndexOutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Format(e) => write!(f, "{e}"),
            Self::Io(kind) => write!(f, "i/o error: {kind}"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::Incompatible { expected, found } => write!(
                f,
                "incompatible chunk layout (expected tag {expected:#010x}, found {found:#010x})"
            ),
            Self::NotFound => write!(f, "not found"),
            Self::Unsupported => write!(f, "unsupported feature"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidMagic => write!(f, "missing AT&T magic"),
            Self::SignatureMismatch => write!(f, "unexpected chunk signature"),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthExceedsContainer => write!(f, "chunk extends past its container"),
            Self::LeafWithContainerSignature => {
                write!(f, "leaf chunks cannot use the container signature")
            }
            Self::MissingDirectory => write!(f, "multi-page document without directory"),
            Self::MalformedDirectory => write!(f, "malformed directory chunk"),
            Self::MalformedInfo => write!(f, "malformed INFO chunk"),
            Self::NotADocument => write!(f, "root chunk is not a document"),
            Self::IndexOutOfRange => write!(f, "child index out of range"),
        }
    }
}

impl core::error::Error for Error {}
impl core::error::Error for ParseError {}
impl core::error::Error for FormatError {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::Parse(ParseError::UnexpectedEof),
            kind => Self::Io(kind),
        }
    }
}

/// Result type for chunk tree operations.
pub type Result<T> = core::result::Result<T, Error>;

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

macro_rules! err {
    ($err:expr) => {
        Err($err.into())
    };
}

pub(crate) use bail;
pub(crate) use err;
