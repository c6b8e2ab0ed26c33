//! Library version and the chunk layout compatibility tag.

use crate::chunk::Chunk;
use crate::error::{Error, Result, bail};

/// The version of this library.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version {
    /// The major version.
    pub major: u32,
    /// The minor version.
    pub minor: u32,
    /// The revision.
    pub revision: u32,
}

const MAJOR: u32 = 0;
const MINOR: u32 = 1;
const REVISION: u32 = 0;

/// Return the version of this library.
pub fn version() -> Version {
    Version {
        major: MAJOR,
        minor: MINOR,
        revision: REVISION,
    }
}

/// Return the compatibility tag of the chunk layout used by this library.
///
/// The high 16 bits hold the in-memory size of [`Chunk`], the low 16 bits the
/// major version. Components that exchange chunks with this library (such as
/// [`ExternalFiles`](crate::ExternalFiles) implementations) report the tag they
/// were built against, and mismatches are rejected before any chunk is touched.
pub fn compat_tag() -> u32 {
    let size = (size_of::<Chunk>() % (u16::MAX as usize + 1)) as u32;

    (size << 16) | (MAJOR & 0xffff)
}

/// Check a compatibility tag against the one of this library.
pub fn check_compat(tag: u32) -> Result<()> {
    let expected = compat_tag();

    if tag != expected {
        bail!(Error::Incompatible {
            expected,
            found: tag,
        });
    }

    Ok(())
}
