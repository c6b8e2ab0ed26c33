use super::{Chunk, Container, HEADER_LEN, Leaf};
use crate::error::{Error, FormatError, ParseError, Result, bail, err};
use crate::log::ltrace;
use crate::signature::Signature;
use std::io::{Read, Seek, SeekFrom};

// Lengths are carried in 31 bits so that every offset computed from them stays
// representable as a signed 32-bit seek.
const MAX_LEAF_LEN: u32 = 0x7fff_ffff;

pub(super) fn read_chunk<R: Read + Seek>(r: &mut R) -> Result<Chunk> {
    align(r)?;

    let signature = peek_signature(r)?;

    if signature.is_container() {
        read_container(r).map(Chunk::Container)
    } else {
        read_leaf(r).map(Chunk::Leaf)
    }
}

fn read_container<R: Read + Seek>(r: &mut R) -> Result<Container> {
    let start = r.stream_position()?;
    let (signature, len) = read_header(r)?;

    if !signature.is_container() {
        bail!(ParseError::SignatureMismatch);
    }

    let end = start
        .checked_add(HEADER_LEN as u64)
        .and_then(|v| v.checked_add(u64::from(len)))
        .ok_or(Error::Overflow)?;

    if len < 4 {
        bail!(FormatError::LengthExceedsContainer);
    }

    let subsign = Signature(read_array(r)?);
    let mut container = Container::new(subsign);

    ltrace!("container {} spans {}..{}", subsign, start, end);

    loop {
        let pos = r.stream_position()?;

        // The pad byte after an odd-length last child belongs to the parent.
        if pos + pos % 2 >= end {
            break;
        }

        let child = read_chunk(r)?;

        if r.stream_position()? > end {
            bail!(FormatError::LengthExceedsContainer);
        }

        container.push(child);
    }

    Ok(container)
}

fn read_leaf<R: Read + Seek>(r: &mut R) -> Result<Leaf> {
    let (signature, len) = read_header(r)?;

    if len > MAX_LEAF_LEN {
        bail!(Error::Overflow);
    }

    let len = len as usize;
    let mut data = Vec::new();
    r.by_ref().take(len as u64).read_to_end(&mut data)?;

    if data.len() != len {
        return err!(ParseError::UnexpectedEof);
    }

    Leaf::new(signature, data)
}

fn read_header<R: Read>(r: &mut R) -> Result<(Signature, u32)> {
    let signature = Signature(read_array(r)?);
    let len = u32::from_be_bytes(read_array(r)?);

    Ok((signature, len))
}

fn read_array<const N: usize, R: Read>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0; N];
    r.read_exact(&mut buf)?;

    Ok(buf)
}

fn peek_signature<R: Read + Seek>(r: &mut R) -> Result<Signature> {
    let signature = Signature(read_array(r)?);
    r.seek(SeekFrom::Current(-4))?;

    Ok(signature)
}

/// Skip the pad byte in front of a chunk that would otherwise start at an odd
/// offset.
fn align<R: Read + Seek>(r: &mut R) -> Result<()> {
    if r.stream_position()? % 2 == 1 {
        // A missing pad byte at the very end of a container is tolerated, the
        // caller notices the end of input on the next header read.
        let mut pad = [0; 1];
        let _ = r.read(&mut pad)?;
    }

    Ok(())
}
