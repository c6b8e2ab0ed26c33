//! The directory of a multi-page document.
//!
//! The directory is the first child of a multi-page document. It lists the
//! component files of the document and, for bundled documents, the offset of
//! each of them within the file. Resolving a directory binds each entry to the
//! top-level chunk that starts at its offset.

use crate::byte_reader::Reader;
use crate::chunk::{Chunk, HEADER_LEN, Leaf, padded};
use crate::error::{Error, FormatError, ParseError, Result, bail};
use crate::log::{ldebug, ltrace};
use crate::signature::Signature;
use crate::util::OptionLog;
use bitflags::bitflags;
use smallvec::SmallVec;

/// The offset of the first top-level chunk of a document: the `AT&T` magic,
/// the root chunk header and its sub-form tag.
pub const FIRST_CHILD_OFFSET: usize = 16;

bitflags! {
    /// The flags byte of a directory.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct DirFlags: u8 {
        /// All component files are stored inside the document.
        const BUNDLED = 0x80;
    }
}

/// The role of a component file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FileKind {
    /// Data shared between pages (or a file whose role is unknown).
    #[default]
    Shared,
    /// A page.
    Page,
    /// Thumbnail images.
    Thumbnail,
}

/// An entry of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    /// The index of the top-level chunk holding the file, if it was found.
    pub chunk: Option<usize>,
    /// The role of the file.
    pub kind: FileKind,
    /// The identifier of the file.
    ///
    /// Identifiers, names and titles live in a compressed table that is not
    /// decoded, so these are always empty.
    pub id: String,
    /// The file name.
    pub name: String,
    /// The display title.
    pub title: String,
}

/// A resolved directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    flags: DirFlags,
    files: Vec<FileEntry>,
}

impl Directory {
    /// Create a directory from its entries.
    pub fn new(flags: DirFlags, files: Vec<FileEntry>) -> Self {
        Self { flags, files }
    }

    /// Resolve the directory stored in `leaf` against the top-level chunks of
    /// its document.
    ///
    /// `siblings` must be all children of the document in order, including the
    /// directory itself, which lives at [`FIRST_CHILD_OFFSET`].
    pub fn resolve(leaf: &Leaf, siblings: &[Chunk]) -> Result<Self> {
        if leaf.signature() != Signature::DIRM {
            bail!(ParseError::SignatureMismatch);
        }

        let mut r = Reader::new(leaf.data());
        let flags = r
            .read_byte()
            .warn_none("directory is empty")
            .ok_or(FormatError::MalformedDirectory)?;
        let flags = DirFlags::from_bits_retain(flags);
        let count = r
            .read_u16()
            .warn_none("directory lacks a file count")
            .ok_or(FormatError::MalformedDirectory)? as usize;

        let mut files = vec![FileEntry::default(); count];

        if flags.contains(DirFlags::BUNDLED) {
            let offsets = (0..count)
                .map(|_| r.read_u32().map(|o| o as usize))
                .collect::<Option<SmallVec<[usize; 16]>>>()
                .warn_none("directory offsets are truncated")
                .ok_or(FormatError::MalformedDirectory)?;

            bind(&mut files, &offsets, siblings);
        } else {
            ldebug!("indirect document, skipping offset binding");
        }

        for file in &mut files {
            if file
                .chunk
                .and_then(|idx| siblings.get(idx))
                .is_some_and(Chunk::is_page)
            {
                file.kind = FileKind::Page;
            }
        }

        Ok(Self { flags, files })
    }

    /// Return the flags of the directory.
    pub fn flags(&self) -> DirFlags {
        self.flags
    }

    /// Whether the component files are stored inside the document.
    pub fn is_bundled(&self) -> bool {
        self.flags.contains(DirFlags::BUNDLED)
    }

    /// Return the entries of the directory.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Return an iterator over the entries that are pages, in directory order.
    pub fn pages(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.files.iter().filter(|f| f.kind == FileKind::Page)
    }

    /// Return the number of pages.
    pub fn count_pages(&self) -> usize {
        self.pages().count()
    }

    /// Return the entry of the page with the given index.
    pub fn page(&self, index: usize) -> Option<&FileEntry> {
        self.pages().nth(index)
    }
}

fn bind(files: &mut [FileEntry], offsets: &[usize], siblings: &[Chunk]) {
    let mut offset = FIRST_CHILD_OFFSET;

    for (idx, sibling) in siblings.iter().enumerate() {
        offset = padded(offset);

        // Only the first entry with a matching offset is bound.
        if let Some(pos) = offsets.iter().position(|o| *o == offset) {
            ltrace!("binding file {} to chunk {} at {}", pos, idx, offset);
            files[pos].chunk = Some(idx);
        }

        offset += sibling.size();
    }
}

/// Encode a bundled directory for the given top-level chunks.
///
/// The first chunk of the document is the directory itself, so `files` are the
/// chunks that follow it. No name table is emitted.
pub(crate) fn encode_bundled(files: &[Chunk]) -> Result<Leaf> {
    let count = u16::try_from(files.len()).map_err(|_| Error::Overflow)?;
    let dir_len = 3 + 4 * files.len();

    let mut data = Vec::with_capacity(dir_len);
    data.push(DirFlags::BUNDLED.bits());
    data.extend_from_slice(&count.to_be_bytes());

    let mut offset = padded(FIRST_CHILD_OFFSET + HEADER_LEN + dir_len);

    for file in files {
        let o = u32::try_from(offset).map_err(|_| Error::Overflow)?;
        data.extend_from_slice(&o.to_be_bytes());
        offset = padded(offset + file.size());
    }

    Ok(Leaf::from_parts(Signature::DIRM, data))
}
