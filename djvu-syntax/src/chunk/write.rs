use super::{Chunk, Container, HEADER_LEN, Leaf};
use crate::error::{Error, Result};
use crate::signature::Signature;
use std::io::{Seek, SeekFrom, Write};

pub(super) fn write_chunk<W: Write + Seek>(chunk: &Chunk, w: &mut W) -> Result<()> {
    match chunk {
        Chunk::Leaf(leaf) => write_leaf(leaf, w),
        Chunk::Container(container) => write_container(container, w),
    }
}

fn write_leaf<W: Write + Seek>(leaf: &Leaf, w: &mut W) -> Result<()> {
    write_framed(leaf.signature(), w, |w| Ok(w.write_all(leaf.data())?))
}

pub(super) fn write_container<W: Write + Seek>(container: &Container, w: &mut W) -> Result<()> {
    write_framed(Signature::FORM, w, |w| {
        w.write_all(container.subsign().as_bytes())?;

        for child in container.children() {
            write_chunk(child, w)?;
        }

        Ok(())
    })
}

fn write_framed<W, F>(signature: Signature, w: &mut W, payload: F) -> Result<()>
where
    W: Write + Seek,
    F: FnOnce(&mut W) -> Result<()>,
{
    let mut start = w.stream_position()?;

    if start % 2 == 1 {
        w.write_all(&[0])?;
        start += 1;
    }

    w.write_all(signature.as_bytes())?;
    // Patched once the payload has been written.
    w.write_all(&[0; 4])?;

    payload(w)?;

    let end = w.stream_position()?;
    let len = end
        .checked_sub(start + HEADER_LEN as u64)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(Error::Overflow)?;

    w.seek(SeekFrom::Start(start + 4))?;
    w.write_all(&len.to_be_bytes())?;
    w.seek(SeekFrom::Start(end))?;

    Ok(())
}
