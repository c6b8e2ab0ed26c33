/*!
A low-level crate for reading and writing DjVu chunk trees.

DjVu files are built from chunks in the style of IFF: every chunk starts with a
four-byte signature and a big-endian length, and container chunks (`FORM`)
hold a sub-form tag followed by child chunks. This crate provides

- a [`Chunk`] tree with a seek-based codec that round-trips byte for byte,
- [`PageInfo`] for the geometry stored in `INFO` chunks,
- [`Directory`] resolution, which maps the top-level chunks of a multi-page
  document to its pages,
- a [`Document`] API for retrieving pages of single-page, bundled and
  indirect documents.

Decoding the image layers of a page is left to `djvu-render`.

# Example
```rust,no_run
use djvu_syntax::{Document, NoExternalFiles};

let data = std::fs::read("book.djvu").unwrap();
let doc = Document::from_bytes(&data).unwrap();

for i in 0..doc.count_pages() {
    let page = doc.get_page(i, &mut NoExternalFiles).unwrap();
    println!("{}", djvu_syntax::Chunk::from((*page).clone()).tree());
}
```

# Cargo features
- `logging`: Emit diagnostics through the `log` crate.

# Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

pub mod byte_reader;
pub mod chunk;
pub mod directory;
pub mod document;
mod error;
pub mod info;
pub(crate) mod log;
pub mod signature;
mod util;
pub mod version;

pub use chunk::{Chunk, Container, Leaf};
pub use directory::{DirFlags, Directory, FileEntry, FileKind};
pub use document::{Document, ExternalFiles, FsFiles, NoExternalFiles, Page};
pub use error::{Error, FormatError, ParseError, Result};
pub use info::{PageInfo, Rotation};
pub use signature::Signature;
pub use version::{Version, check_compat, compat_tag, version};
