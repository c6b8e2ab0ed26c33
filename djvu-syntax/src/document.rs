//! Documents and access to their pages.
//!
//! A document is either a single page or a multi-page document whose first
//! child is a [`Directory`]. Pages of bundled documents are children of the
//! root chunk. Pages of indirect documents live in separate files, which are
//! opened through a caller-supplied [`ExternalFiles`] implementation.

use crate::chunk::{Chunk, Container};
use crate::directory::{self, Directory};
use crate::error::{Error, FormatError, ParseError, Result, bail};
use crate::log::{ldebug, lwarn};
use crate::signature::Signature;
use crate::version::{check_compat, compat_tag};
use core::ops::Deref;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, Write};
use std::path::PathBuf;

/// Access to the component files of an indirect document.
pub trait ExternalFiles {
    /// The handle of an opened file.
    type Handle: Read + Write + Seek;

    /// Open the file with the given name, for writing if `write` is set.
    ///
    /// Files opened for writing are truncated.
    fn open(&mut self, name: &str, write: bool) -> Option<Self::Handle>;

    /// Close a handle returned by [`ExternalFiles::open`].
    fn close(&mut self, handle: Self::Handle) {
        drop(handle);
    }

    /// The compatibility tag this implementation was built against.
    fn compat_tag(&self) -> u32 {
        compat_tag()
    }
}

/// An [`ExternalFiles`] implementation that has no files.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoExternalFiles;

impl ExternalFiles for NoExternalFiles {
    type Handle = Cursor<Vec<u8>>;

    fn open(&mut self, _: &str, _: bool) -> Option<Self::Handle> {
        None
    }
}

/// An [`ExternalFiles`] implementation that resolves names relative to a
/// directory of the file system.
#[derive(Debug, Clone)]
pub struct FsFiles {
    base: PathBuf,
}

impl FsFiles {
    /// Create a new instance resolving names relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ExternalFiles for FsFiles {
    type Handle = File;

    fn open(&mut self, name: &str, write: bool) -> Option<Self::Handle> {
        let path = self.base.join(name);

        let result = if write {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
        } else {
            File::open(&path)
        };

        result
            .inspect_err(|_e| {
                lwarn!("failed to open {}: {}", path.display(), _e);
            })
            .ok()
    }
}

/// A page retrieved from a [`Document`].
#[derive(Debug)]
pub enum Page<'a> {
    /// A page stored inside the document.
    Borrowed(&'a Container),
    /// A page that was loaded from an external file.
    Owned {
        /// The name of the file the page was loaded from.
        name: String,
        /// The page.
        page: Container,
    },
}

impl Deref for Page<'_> {
    type Target = Container;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(page) => page,
            Self::Owned { page, .. } => page,
        }
    }
}

/// A decoded document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Container,
    directory: Option<Directory>,
}

impl Document {
    /// Decode a document, starting with the `AT&T` magic.
    pub fn read<R: Read + Seek>(r: &mut R) -> Result<Self> {
        Self::from_root(read_root(r)?)
    }

    /// Decode a document from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(data))
    }

    /// Create a document from its root chunk.
    ///
    /// The root must be a page or a multi-page document whose first child is a
    /// directory.
    pub fn from_root(root: Chunk) -> Result<Self> {
        let Chunk::Container(root) = root else {
            bail!(FormatError::NotADocument);
        };

        if root.is_page() {
            return Ok(Self {
                root,
                directory: None,
            });
        }

        if !root.is(Signature::DJVM) {
            bail!(FormatError::NotADocument);
        }

        let dirm = root
            .get(0)
            .and_then(Chunk::as_leaf)
            .filter(|l| l.signature() == Signature::DIRM)
            .ok_or(FormatError::MissingDirectory)?;
        let directory = Directory::resolve(dirm, root.children())?;

        ldebug!(
            "resolved directory with {} files, {} pages",
            directory.files().len(),
            directory.count_pages()
        );

        Ok(Self {
            root,
            directory: Some(directory),
        })
    }

    /// Create a document from a directory and a root chunk whose layout the
    /// directory describes.
    ///
    /// This is useful for indirect documents whose file names are known from
    /// elsewhere.
    pub fn from_parts(root: Container, directory: Directory) -> Self {
        Self {
            root,
            directory: Some(directory),
        }
    }

    /// Create a single-page document.
    pub fn single(page: Container) -> Result<Self> {
        if !page.is_page() {
            bail!(FormatError::NotADocument);
        }

        Ok(Self {
            root: page,
            directory: None,
        })
    }

    /// Create a bundled multi-page document holding `files` in order.
    ///
    /// A directory with the offsets of all files is generated.
    pub fn bundled(files: Vec<Chunk>) -> Result<Self> {
        let dirm = directory::encode_bundled(&files)?;

        let mut root = Container::new(Signature::DJVM);
        root.push(dirm);

        for file in files {
            root.push(file);
        }

        Self::from_root(root.into())
    }

    /// Encode the document, including the `AT&T` magic.
    ///
    /// Changing the size of pages of a bundled document invalidates the
    /// offsets in its directory, which is written back unchanged.
    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        write_root(&self.root, w)
    }

    /// Encode the document into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;

        Ok(cursor.into_inner())
    }

    /// Return the root chunk.
    pub fn root(&self) -> &Container {
        &self.root
    }

    /// Consume the document, returning its root chunk.
    pub fn into_root(self) -> Container {
        self.root
    }

    /// Return the directory, if this is a multi-page document.
    pub fn directory(&self) -> Option<&Directory> {
        self.directory.as_ref()
    }

    /// Return the number of pages.
    pub fn count_pages(&self) -> usize {
        match &self.directory {
            None => 1,
            Some(dir) => dir.count_pages(),
        }
    }

    /// Return the page with the given index.
    ///
    /// `files` is only consulted for indirect documents.
    pub fn get_page<F: ExternalFiles>(&self, index: usize, files: &mut F) -> Result<Page<'_>> {
        check_compat(files.compat_tag())?;

        let Some(dir) = &self.directory else {
            return if index == 0 {
                Ok(Page::Borrowed(&self.root))
            } else {
                Err(Error::NotFound)
            };
        };

        let entry = dir.page(index).ok_or(Error::NotFound)?;

        if dir.is_bundled() {
            return entry
                .chunk
                .and_then(|idx| self.root.get(idx))
                .and_then(Chunk::as_container)
                .filter(|c| c.is_page())
                .map(Page::Borrowed)
                .ok_or(Error::NotFound);
        }

        if entry.name.is_empty() {
            ldebug!("page {} of indirect document has no file name", index);

            bail!(Error::NotFound);
        }

        let mut handle = files.open(&entry.name, false).ok_or(Error::NotFound)?;
        let root = read_root(&mut handle);
        files.close(handle);

        match root? {
            Chunk::Container(page) if page.is_page() => Ok(Page::Owned {
                name: entry.name.clone(),
                page,
            }),
            _ => Err(FormatError::NotADocument.into()),
        }
    }

    /// Return the page with the given index for modification.
    ///
    /// Only pages stored inside the document can be modified in place.
    pub fn get_page_mut(&mut self, index: usize) -> Result<&mut Container> {
        let idx = match &self.directory {
            None if index == 0 => return Ok(&mut self.root),
            None => bail!(Error::NotFound),
            Some(dir) if !dir.is_bundled() => bail!(Error::Unsupported),
            Some(dir) => dir
                .page(index)
                .and_then(|e| e.chunk)
                .ok_or(Error::NotFound)?,
        };

        self.root
            .get_mut(idx)
            .and_then(Chunk::as_container_mut)
            .filter(|c| c.is_page())
            .ok_or(Error::NotFound)
    }

    /// Give back a page retrieved with [`Document::get_page`].
    ///
    /// Pages stored inside the document stay owned by it. Pages loaded from
    /// an external file are released, after being written back to their file
    /// if `changed` is set.
    pub fn put_page<F: ExternalFiles>(
        &self,
        page: Page<'_>,
        changed: bool,
        files: &mut F,
    ) -> Result<()> {
        check_compat(files.compat_tag())?;

        match page {
            Page::Borrowed(page) => {
                let owned = match &self.directory {
                    None => core::ptr::eq(page, &self.root),
                    Some(_) => self
                        .root
                        .children()
                        .iter()
                        .filter_map(Chunk::as_container)
                        .any(|c| core::ptr::eq(c, page)),
                };

                if owned { Ok(()) } else { Err(Error::NotFound) }
            }
            Page::Owned { name, page } => {
                if !changed {
                    return Ok(());
                }

                let mut handle = files.open(&name, true).ok_or(Error::NotFound)?;
                let result = write_root(&page, &mut handle);
                files.close(handle);

                result
            }
        }
    }
}

fn read_root<R: Read + Seek>(r: &mut R) -> Result<Chunk> {
    let mut magic = [0; 4];
    r.read_exact(&mut magic)?;

    if Signature(magic) != Signature::ATNT {
        bail!(ParseError::InvalidMagic);
    }

    Chunk::read(r)
}

fn write_root<W: Write + Seek>(root: &Container, w: &mut W) -> Result<()> {
    w.write_all(Signature::ATNT.as_bytes())?;

    root.write(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirFlags, FileEntry, FileKind};
    use crate::{Leaf, PageInfo};
    use std::collections::HashMap;

    fn page(width: u16) -> Container {
        let mut page = Container::new_page();
        page.push(PageInfo::new(width, 1).to_chunk());
        page.push(Leaf::new(Signature::BGJP, b"jpeg".as_slice()).unwrap());

        page
    }

    #[derive(Default)]
    struct MemFiles {
        files: HashMap<String, Vec<u8>>,
        open: Option<String>,
    }

    impl ExternalFiles for MemFiles {
        type Handle = Cursor<Vec<u8>>;

        fn open(&mut self, name: &str, write: bool) -> Option<Self::Handle> {
            let data = if write {
                Vec::new()
            } else {
                self.files.get(name)?.clone()
            };
            self.open = Some(name.to_string());

            Some(Cursor::new(data))
        }

        fn close(&mut self, handle: Self::Handle) {
            if let Some(name) = self.open.take() {
                self.files.insert(name, handle.into_inner());
            }
        }
    }

    #[test]
    fn single_page() {
        let doc = Document::single(page(3)).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let doc = Document::from_bytes(&bytes).unwrap();

        assert_eq!(doc.count_pages(), 1);
        let p = doc.get_page(0, &mut NoExternalFiles).unwrap();
        assert!(core::ptr::eq(&*p, doc.root()));
        assert_eq!(doc.put_page(p, false, &mut NoExternalFiles), Ok(()));
        assert_eq!(
            doc.get_page(1, &mut NoExternalFiles).unwrap_err(),
            Error::NotFound
        );
    }

    #[test]
    fn put_foreign_page() {
        let doc = Document::single(page(3)).unwrap();
        let other = page(3);

        assert_eq!(
            doc.put_page(Page::Borrowed(&other), false, &mut NoExternalFiles),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn bundled_round_trip() {
        let doc = Document::bundled(vec![page(1).into(), page(2).into()]).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let doc = Document::from_bytes(&bytes).unwrap();

        assert_eq!(doc.count_pages(), 2);

        let second = doc.get_page(1, &mut NoExternalFiles).unwrap();
        let info = PageInfo::from_chunk(second.get(0).unwrap()).unwrap();
        assert_eq!(info.width, 2);
        assert!(doc.put_page(second, false, &mut NoExternalFiles).is_ok());
    }

    #[test]
    fn bad_magic() {
        assert_eq!(
            Document::from_bytes(b"AT&XFORM\x00\x00\x00\x04DJVU").unwrap_err(),
            ParseError::InvalidMagic.into()
        );
    }

    #[test]
    fn missing_directory() {
        let mut root = Container::new(Signature::DJVM);
        root.push(page(1));

        assert_eq!(
            Document::from_root(root.into()).unwrap_err(),
            FormatError::MissingDirectory.into()
        );
    }

    #[test]
    fn edit_in_place() {
        let mut doc = Document::bundled(vec![page(1).into()]).unwrap();
        let page = doc.get_page_mut(0).unwrap();
        let leaf = page.get_mut(0).and_then(Chunk::as_leaf_mut).unwrap();
        let mut info = PageInfo::from_leaf(leaf).unwrap();
        info.dpi = 72;
        info.write_to(leaf).unwrap();

        let info = PageInfo::from_chunk(
            doc.get_page(0, &mut NoExternalFiles)
                .unwrap()
                .get(0)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(info.dpi, 72);
    }

    #[test]
    fn incompatible_hook() {
        struct Foreign;

        impl ExternalFiles for Foreign {
            type Handle = Cursor<Vec<u8>>;

            fn open(&mut self, _: &str, _: bool) -> Option<Self::Handle> {
                None
            }

            fn compat_tag(&self) -> u32 {
                compat_tag().wrapping_add(1)
            }
        }

        let doc = Document::single(page(1)).unwrap();

        assert!(matches!(
            doc.get_page(0, &mut Foreign),
            Err(Error::Incompatible { .. })
        ));
    }

    #[test]
    fn indirect_pages() {
        let mut root = Container::new(Signature::DJVM);
        root.push(Leaf::new(Signature::DIRM, [0x00, 0, 1]).unwrap());

        let decoded = Document::from_root(root.clone().into()).unwrap();
        assert_eq!(decoded.count_pages(), 0);
        assert_eq!(
            decoded.get_page(0, &mut NoExternalFiles).unwrap_err(),
            Error::NotFound
        );

        let mut files = MemFiles::default();
        files.files.insert(
            "p1.djvu".to_string(),
            Document::single(page(7)).unwrap().to_bytes().unwrap(),
        );

        let dir = Directory::new(
            DirFlags::empty(),
            vec![FileEntry {
                kind: FileKind::Page,
                name: "p1.djvu".to_string(),
                ..FileEntry::default()
            }],
        );
        let doc = Document::from_parts(root, dir);

        let page = doc.get_page(0, &mut files).unwrap();
        assert!(files.open.is_none());
        assert!(matches!(&page, Page::Owned { name, .. } if name == "p1.djvu"));

        doc.put_page(page, true, &mut files).unwrap();
        let written = Document::from_bytes(&files.files["p1.djvu"]).unwrap();
        assert_eq!(
            PageInfo::from_chunk(written.root().get(0).unwrap())
                .unwrap()
                .width,
            7
        );
    }
}
