//! The chunk tree.
//!
//! A chunk is either a [`Leaf`], which carries an opaque payload, or a
//! [`Container`], which carries a sub-form tag and an ordered list of child
//! chunks. On disk, every chunk consists of a four-byte signature, a big-endian
//! length and the payload, and starts at an even offset.

mod read;
mod write;

use crate::error::{FormatError, Result, bail};
use crate::signature::Signature;
use core::fmt;
use std::io::{Read, Seek, Write};

/// The size of a chunk header (signature and length).
pub const HEADER_LEN: usize = 8;

/// A node of the chunk tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A chunk with an opaque payload.
    Leaf(Leaf),
    /// A chunk with child chunks.
    Container(Container),
}

impl Chunk {
    /// Decode a chunk (and all of its children) from the current position of `r`.
    ///
    /// A pad byte is skipped first if the current position is odd. On failure,
    /// nothing that was decoded so far is returned.
    pub fn read<R: Read + Seek>(r: &mut R) -> Result<Self> {
        read::read_chunk(r)
    }

    /// Encode the chunk at the current position of `w`.
    ///
    /// A pad byte is emitted first if the current position is odd. The length
    /// fields are patched after the payload has been written, so `w` must be
    /// seekable.
    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        write::write_chunk(self, w)
    }

    /// Return the signature of the chunk.
    pub fn signature(&self) -> Signature {
        match self {
            Self::Leaf(l) => l.signature,
            Self::Container(_) => Signature::FORM,
        }
    }

    /// Return the number of bytes the chunk occupies when encoded, including
    /// its header but excluding any pad byte in front of it.
    pub fn size(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    fn payload_len(&self) -> usize {
        match self {
            Self::Leaf(l) => l.data.len(),
            Self::Container(c) => c.payload_len(),
        }
    }

    /// Return the chunk as a leaf, if it is one.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(l) => Some(l),
            Self::Container(_) => None,
        }
    }

    /// Return the chunk as a mutable leaf, if it is one.
    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Self::Leaf(l) => Some(l),
            Self::Container(_) => None,
        }
    }

    /// Return the chunk as a container, if it is one.
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }

    /// Return the chunk as a mutable container, if it is one.
    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Self::Container(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }

    /// Whether the chunk has the given signature and, if provided, sub-form tag.
    ///
    /// A sub-form tag only matches containers.
    pub fn matches(&self, signature: Signature, subsign: Option<Signature>) -> bool {
        if self.signature() != signature {
            return false;
        }

        match subsign {
            Some(subsign) => self.as_container().is_some_and(|c| c.subsign == subsign),
            None => true,
        }
    }

    /// Whether the chunk is a page container.
    pub fn is_page(&self) -> bool {
        self.as_container().is_some_and(Container::is_page)
    }

    /// Return a value that displays the chunk as an indented tree.
    pub fn tree(&self) -> Tree<'_> {
        Tree(self)
    }
}

impl From<Leaf> for Chunk {
    fn from(value: Leaf) -> Self {
        Self::Leaf(value)
    }
}

impl From<Container> for Chunk {
    fn from(value: Container) -> Self {
        Self::Container(value)
    }
}

/// A chunk with an opaque payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Leaf {
    signature: Signature,
    data: Vec<u8>,
}

impl Leaf {
    /// Create a new leaf.
    ///
    /// Fails if `signature` is the container signature, since such a chunk
    /// could not be decoded as a leaf again.
    pub fn new(signature: Signature, data: impl Into<Vec<u8>>) -> Result<Self> {
        if signature.is_container() {
            bail!(FormatError::LeafWithContainerSignature);
        }

        Ok(Self {
            signature,
            data: data.into(),
        })
    }

    /// Create a leaf with a signature known not to be the container signature.
    pub(crate) fn from_parts(signature: Signature, data: Vec<u8>) -> Self {
        debug_assert!(!signature.is_container());

        Self { signature, data }
    }

    /// Return the signature of the leaf.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Return the payload of the leaf.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return the payload of the leaf for in-place modification.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the leaf, returning its payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("signature", &self.signature)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A chunk with a sub-form tag and an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    subsign: Signature,
    children: Vec<Chunk>,
}

impl Container {
    /// Create a new, empty container with the given sub-form tag.
    pub fn new(subsign: Signature) -> Self {
        Self {
            subsign,
            children: Vec::new(),
        }
    }

    /// Create a new, empty page container.
    pub fn new_page() -> Self {
        Self::new(Signature::DJVU)
    }

    /// Return the sub-form tag of the container.
    pub fn subsign(&self) -> Signature {
        self.subsign
    }

    /// Whether the container has the given sub-form tag.
    pub fn is(&self, subsign: Signature) -> bool {
        self.subsign == subsign
    }

    /// Whether the container is a page.
    pub fn is_page(&self) -> bool {
        self.is(Signature::DJVU)
    }

    /// Return the children of the container.
    pub fn children(&self) -> &[Chunk] {
        &self.children
    }

    /// Return the number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Return the child at the given index.
    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.children.get(index)
    }

    /// Return the child at the given index for modification.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Chunk> {
        self.children.get_mut(index)
    }

    /// Insert a child at `index`, shifting all later children.
    ///
    /// `index` may be equal to the current number of children, in which case
    /// the chunk is appended.
    pub fn insert(&mut self, index: usize, chunk: impl Into<Chunk>) -> Result<()> {
        if index > self.children.len() {
            bail!(FormatError::IndexOutOfRange);
        }

        self.children.insert(index, chunk.into());

        Ok(())
    }

    /// Append a child.
    pub fn push(&mut self, chunk: impl Into<Chunk>) {
        self.children.push(chunk.into());
    }

    /// Find the first child at or after `start` with the given signature and,
    /// if provided, sub-form tag. Returns the index of the child with it.
    pub fn find(
        &self,
        signature: Signature,
        subsign: Option<Signature>,
        start: usize,
    ) -> Option<(usize, &Chunk)> {
        self.children
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, c)| c.matches(signature, subsign))
    }

    /// Count the children with the given signature and, if provided, sub-form tag.
    pub fn count(&self, signature: Signature, subsign: Option<Signature>) -> usize {
        self.children
            .iter()
            .filter(|c| c.matches(signature, subsign))
            .count()
    }

    /// Encode the container at the current position of `w`.
    ///
    /// See [`Chunk::write`].
    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        write::write_container(self, w)
    }

    /// Return the number of bytes the container occupies when encoded.
    pub fn size(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }

    // The payload starts at an even offset, so the parity of the running
    // length is the parity of the absolute position.
    fn payload_len(&self) -> usize {
        self.children.iter().fold(4, |len, child| {
            padded(len) + child.size()
        })
    }
}

/// Round `offset` up to the next even number.
#[inline]
pub(crate) fn padded(offset: usize) -> usize {
    offset + (offset & 1)
}

/// Displays a chunk and all of its children, one per line.
pub struct Tree<'a>(&'a Chunk);

impl Tree<'_> {
    fn fmt_level(chunk: &Chunk, level: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..level {
            f.write_str("-")?;
        }

        match chunk {
            Chunk::Leaf(l) => writeln!(f, "Chunk {}", l.signature),
            Chunk::Container(c) => {
                writeln!(f, "Chunk {}:{}", Signature::FORM, c.subsign)?;

                for child in &c.children {
                    Self::fmt_level(child, level + 1, f)?;
                }

                Ok(())
            }
        }
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_level(self.0, 0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(sign: &[u8; 4], data: &[u8]) -> Leaf {
        Leaf::new(Signature(*sign), data).unwrap()
    }

    #[test]
    fn leaf_size() {
        assert_eq!(Chunk::from(leaf(b"TEST", b"AB")).size(), 10);
        assert_eq!(Chunk::from(leaf(b"TEST", b"")).size(), 8);
    }

    #[test]
    fn container_size_pads_between_children() {
        let mut c = Container::new(Signature::DJVU);
        assert_eq!(c.size(), 12);

        c.push(leaf(b"ODD1", b"abc"));
        assert_eq!(c.size(), 12 + 11);

        // The second child starts after a pad byte, the trailing odd child does not pad.
        c.push(leaf(b"ODD2", b"x"));
        assert_eq!(c.size(), 12 + 11 + 1 + 9);
    }

    #[test]
    fn container_signature_is_reserved() {
        assert_eq!(
            Leaf::new(Signature::FORM, vec![]),
            Err(FormatError::LeafWithContainerSignature.into())
        );
    }

    #[test]
    fn insert_at_index() {
        let mut c = Container::new_page();
        c.insert(0, leaf(b"BBBB", b"")).unwrap();
        c.insert(0, leaf(b"AAAA", b"")).unwrap();
        c.insert(2, leaf(b"CCCC", b"")).unwrap();

        assert_eq!(
            c.insert(4, leaf(b"DDDD", b"")),
            Err(FormatError::IndexOutOfRange.into())
        );

        let order: Vec<_> = c.children().iter().map(|c| c.signature()).collect();
        assert_eq!(
            order,
            [Signature(*b"AAAA"), Signature(*b"BBBB"), Signature(*b"CCCC")]
        );
    }

    #[test]
    fn find_and_count() {
        let mut c = Container::new(Signature::DJVM);
        c.push(leaf(b"DIRM", b"\x80\x00\x00"));
        c.push(Container::new_page());
        c.push(Container::new(Signature(*b"DJVI")));
        c.push(Container::new_page());

        assert_eq!(c.count(Signature::FORM, None), 3);
        assert_eq!(c.count(Signature::FORM, Some(Signature::DJVU)), 2);
        assert_eq!(c.count(Signature::DIRM, Some(Signature::DJVU)), 0);

        let (idx, _) = c.find(Signature::FORM, Some(Signature::DJVU), 2).unwrap();
        assert_eq!(idx, 3);
        assert!(c.find(Signature::INFO, None, 0).is_none());
    }

    #[test]
    fn tree_dump() {
        let mut page = Container::new_page();
        page.push(leaf(b"INFO", &[0; 10]));
        let mut doc = Container::new(Signature::DJVM);
        doc.push(leaf(b"DIRM", b""));
        doc.push(page);

        assert_eq!(
            Chunk::from(doc).tree().to_string(),
            "Chunk FORM:DJVM\n-Chunk DIRM\n-Chunk FORM:DJVU\n--Chunk INFO\n"
        );
    }
}
