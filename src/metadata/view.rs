//! Top-level access to one metadata root.
//!
//! [`MetadataView`] borrows a byte slice beginning at the metadata root (`BSJB`), parses
//! the stream directory and wires the heaps and the table stream together: cells decoded
//! from table rows can be resolved against the heaps, and simple or coded references can
//! be dereferenced to their target rows. [`MetadataFile`] is the owning variant, pinning
//! a [`Backend`] together with the view that borrows from it.

use ouroboros::self_referencing;
use std::path::Path;

use widestring::U16String;

use crate::{
    file::{Backend, Memory, Physical},
    metadata::{
        root::Root,
        streams::{Blob, Guid, Strings, TableStream, UserStrings},
        tables::{Cell, CellValue, ColumnKind, RowRc, TableId},
    },
    Error::Empty,
    Result,
};

/// A parsed metadata root: stream directory, heaps and tables over borrowed bytes.
///
/// The table stream is mandatory; each heap is optional and exposed as an `Option`.
/// All decoding stays lazy: constructing the view parses only the directory and the
/// table stream header, rows and heap entries materialize on first access.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{MetadataView, TableId};
///
/// # fn example(data: &[u8]) -> cilmeta::Result<()> {
/// let view = MetadataView::from_slice(data)?;
///
/// let module = view.tables().row(TableId::Module, 0)?;
/// let name = view.string_of(module.cell_by_name("Name")?)?;
/// println!("module: {:?}", name);
/// # Ok(())
/// # }
/// ```
pub struct MetadataView<'a> {
    root: Root,
    strings: Option<Strings<'a>>,
    user_strings: Option<UserStrings<'a>>,
    blob: Option<Blob<'a>>,
    guids: Option<Guid<'a>>,
    tables: TableStream<'a>,
}

impl<'a> MetadataView<'a> {
    /// Parse a metadata root from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The bytes beginning at the metadata root (`BSJB` magic)
    ///
    /// # Errors
    /// Returns an error if the root or any present stream is malformed, or if the
    /// mandatory table stream is missing.
    pub fn from_slice(data: &'a [u8]) -> Result<MetadataView<'a>> {
        let root = Root::read(data)?;

        let mut strings = None;
        let mut user_strings = None;
        let mut blob = None;
        let mut guids = None;
        let mut tables = None;

        for header in &root.stream_headers {
            let start = header.offset as usize;
            let end = start + header.size as usize;
            let stream_data = &data[start..end];

            match header.name.as_str() {
                "#Strings" => strings = Some(Strings::from(stream_data)?),
                "#US" => user_strings = Some(UserStrings::from(stream_data)?),
                "#Blob" => blob = Some(Blob::from(stream_data)?),
                "#GUID" => guids = Some(Guid::from(stream_data)?),
                _ => tables = Some(TableStream::from(stream_data)?),
            }
        }

        let Some(tables) = tables else {
            return Err(malformed_error!("Metadata root has no table stream"));
        };

        Ok(MetadataView {
            root,
            strings,
            user_strings,
            blob,
            guids,
            tables,
        })
    }

    /// The metadata root header and stream directory.
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// The table stream.
    #[must_use]
    pub fn tables(&self) -> &TableStream<'a> {
        &self.tables
    }

    /// The `#Strings` heap, if present.
    #[must_use]
    pub fn strings(&self) -> Option<&Strings<'a>> {
        self.strings.as_ref()
    }

    /// The `#US` heap, if present.
    #[must_use]
    pub fn user_strings(&self) -> Option<&UserStrings<'a>> {
        self.user_strings.as_ref()
    }

    /// The `#Blob` heap, if present.
    #[must_use]
    pub fn blob(&self) -> Option<&Blob<'a>> {
        self.blob.as_ref()
    }

    /// The `#GUID` heap, if present.
    #[must_use]
    pub fn guids(&self) -> Option<&Guid<'a>> {
        self.guids.as_ref()
    }

    /// Resolve a string-index cell against the `#Strings` heap.
    ///
    /// The null sentinel resolves to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the cell is not a string index or the
    /// referenced heap is absent, and the heap's errors for bad offsets.
    pub fn string_of(&self, cell: &Cell) -> Result<Option<&'a str>> {
        match cell.value {
            CellValue::StringRef(offset) => {
                let Some(heap) = self.strings.as_ref() else {
                    return Err(malformed_error!("Referenced #Strings heap is not present"));
                };
                Ok(Some(heap.get(offset as usize)?))
            }
            CellValue::Null if cell.column.kind == ColumnKind::StringIdx => Ok(None),
            _ => Err(malformed_error!(
                "Cell {} is not a string index",
                cell.column.name
            )),
        }
    }

    /// Resolve a blob-index cell against the `#Blob` heap.
    ///
    /// The null sentinel resolves to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the cell is not a blob index or the
    /// referenced heap is absent, and the heap's errors for bad offsets.
    pub fn blob_of(&self, cell: &Cell) -> Result<Option<&'a [u8]>> {
        match cell.value {
            CellValue::BlobRef(offset) => {
                let Some(heap) = self.blob.as_ref() else {
                    return Err(malformed_error!("Referenced #Blob heap is not present"));
                };
                Ok(Some(heap.get(offset as usize)?))
            }
            CellValue::Null if cell.column.kind == ColumnKind::BlobIdx => Ok(None),
            _ => Err(malformed_error!(
                "Cell {} is not a blob index",
                cell.column.name
            )),
        }
    }

    /// Resolve a GUID-index cell against the `#GUID` heap.
    ///
    /// The null sentinel resolves to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the cell is not a GUID index or the
    /// referenced heap is absent, and the heap's errors for bad indexes.
    pub fn guid_of(&self, cell: &Cell) -> Result<Option<uguid::Guid>> {
        match cell.value {
            CellValue::GuidRef(index) => {
                let Some(heap) = self.guids.as_ref() else {
                    return Err(malformed_error!("Referenced #GUID heap is not present"));
                };
                Ok(Some(heap.get(index as usize)?))
            }
            CellValue::Null if cell.column.kind == ColumnKind::GuidIdx => Ok(None),
            _ => Err(malformed_error!(
                "Cell {} is not a GUID index",
                cell.column.name
            )),
        }
    }

    /// Resolve a user string by its `#US` heap offset (as carried by `ldstr` tokens).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is absent, and the heap's errors
    /// for bad offsets.
    pub fn user_string(&self, offset: usize) -> Result<U16String> {
        let Some(heap) = self.user_strings.as_ref() else {
            return Err(malformed_error!("Referenced #US heap is not present"));
        };

        heap.get(offset)
    }

    /// Dereference a simple or coded reference cell to its target row.
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] for the null sentinel,
    /// [`crate::Error::Malformed`] for non-reference cells, and
    /// [`crate::Error::OutOfBounds`] if the target row does not exist.
    pub fn deref(&self, cell: &Cell) -> Result<(TableId, RowRc)> {
        self.tables.deref(&cell.value)
    }
}

#[self_referencing]
/// An owned metadata root: backing bytes plus the parsed [`MetadataView`] over them.
///
/// Use this when nothing else keeps the raw bytes alive - the file pins the backend
/// (an in-memory buffer or a memory-mapped file) together with the view borrowing it.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::MetadataFile;
///
/// let file = MetadataFile::from_file("metadata.bin".as_ref())?;
/// println!("version: {}", file.view().root().version);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct MetadataFile {
    /// The underlying data source (memory or mapped file).
    data: Box<dyn Backend>,
    /// The parsed view, referencing the data.
    #[borrows(data)]
    #[covariant]
    view: MetadataView<'this>,
}

impl MetadataFile {
    /// Loads a raw metadata dump from the given path via memory mapping.
    ///
    /// # Arguments
    /// * `file` - Path to the metadata dump on disk (bytes beginning at `BSJB`)
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is empty, or does not parse as a
    /// metadata root.
    pub fn from_file(file: &Path) -> Result<MetadataFile> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a metadata root from an in-memory buffer.
    ///
    /// # Arguments
    /// * `data` - The bytes of the metadata root
    ///
    /// # Errors
    /// Returns an error if the buffer is empty or does not parse as a metadata root.
    pub fn from_mem(data: Vec<u8>) -> Result<MetadataFile> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    fn load<T: Backend + 'static>(data: T) -> Result<MetadataFile> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data: Box<dyn Backend> = Box::new(data);

        MetadataFile::try_new(data, |data| MetadataView::from_slice(data.data()))
    }

    /// The parsed metadata view over the owned bytes.
    #[must_use]
    pub fn view(&self) -> &MetadataView<'_> {
        self.borrow_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(matches!(MetadataFile::from_mem(Vec::new()), Err(Empty)));
    }

    #[test]
    fn garbage_input() {
        assert!(MetadataFile::from_mem(vec![0xCC; 64]).is_err());
    }
}
