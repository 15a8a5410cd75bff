//! Table Stream (`#~`/`#-`) for .NET Metadata
//!
//! The table stream holds every metadata table back-to-back, with a single header
//! describing which tables are present and how many rows each has. Because a table's
//! row width depends on other tables' row counts, the layout is computed in two strict
//! passes: all row counts first, then widths and byte offsets in ascending ordinal
//! order. Getting either pass wrong silently corrupts every subsequent row, so both
//! are validated against the stream bounds.
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{CellValue, RowRc, Table, TableId, TableInfo, TableInfoRef},
    Error::{NullReference, OutOfBounds},
    Result,
};

/// The decoded table stream: header fields plus one lazily-decoded [`Table`] per
/// present table kind.
///
/// ## Header layout
///
/// `{reserved: u32, major: u8, minor: u8, heap_sizes: u8, reserved: u8, valid: u64,
/// sorted: u64}` followed by one little-endian `u32` row count per set bit of `valid`,
/// in ascending ordinal order. Absent tables contribute no rows and no bytes.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{TableStream, TableId};
///
/// # fn example(data: &[u8]) -> cilmeta::Result<()> {
/// let stream = TableStream::from(data)?;
///
/// println!("schema version {}.{}", stream.major_version, stream.minor_version);
/// for id in stream.present_tables() {
///     println!("{:?}: {} rows", id, stream.row_count(id));
/// }
///
/// let first_type = stream.row(TableId::TypeDef, 0)?;
/// println!("first type: {:?}", first_type.cell_by_name("TypeName")?.value);
/// # Ok(())
/// # }
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6 && II.22
pub struct TableStream<'a> {
    /// Major version of the table schema, shall be 2
    pub major_version: u8,
    /// Minor version of the table schema, shall be 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths for all tables
    pub info: TableInfoRef,
    /// Decoded tables, indexed by ordinal
    tables: Vec<Option<Table<'a>>>,
}

impl<'a> TableStream<'a> {
    /// Create a `TableStream` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice of the full stream, with the header at offset 0
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header or any declared table span
    /// exceeds the stream, [`crate::Error::Malformed`] if no table has rows, and
    /// [`crate::Error::NotSupported`] for presence bits outside the mapped ordinals.
    pub fn from(data: &'a [u8]) -> Result<TableStream<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid_bitvec = read_le::<u64>(&data[8..])?;
        if valid_bitvec == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        // Phase 1: all row counts. Phase 2 below needs the complete count table
        // before any width can be computed.
        let info: TableInfoRef = Arc::new(TableInfo::new(data, valid_bitvec)?);

        let mut stream = TableStream {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid: valid_bitvec,
            sorted: read_le::<u64>(&data[16..])?,
            info: info.clone(),
            tables: Vec::new(),
        };
        stream
            .tables
            .resize_with(TableId::GenericParamConstraint as usize + 1, || None);

        // Phase 2: widths and offsets in ascending ordinal order.
        let mut offset = (24 + valid_bitvec.count_ones() * 4) as usize;
        for table_id in TableId::iter() {
            let rows = info.get(table_id).rows;
            if rows == 0 {
                continue;
            }

            if offset > data.len() {
                return Err(OutOfBounds);
            }

            let table = Table::new(&data[offset..], table_id, rows, info.clone())?;
            offset += table.size() as usize;

            stream.tables[table_id as usize] = Some(table);
        }

        Ok(stream)
    }

    /// Get the number of present tables
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Check if a specific table is present
    ///
    /// ## Arguments
    /// * `table_id` - The table to check for presence
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        (self.valid & (1_u64 << (table_id as u8))) != 0
    }

    /// Get the row count for a specific table (0 if the table is absent)
    ///
    /// ## Arguments
    /// * `table_id` - The table to get the row count for
    #[must_use]
    pub fn row_count(&self, table_id: TableId) -> u32 {
        self.info.get(table_id).rows
    }

    /// Get a present table for row access
    ///
    /// ## Arguments
    /// * `table_id` - The table to look up
    ///
    /// ## Returns
    /// * `Some(&Table)` - Reference to the table if present
    /// * `None` - If the table is not present in this stream
    #[must_use]
    pub fn table(&self, table_id: TableId) -> Option<&Table<'a>> {
        self.tables
            .get(table_id as usize)
            .and_then(Option::as_ref)
    }

    /// Get a row by table kind and 0-based index.
    ///
    /// ## Arguments
    /// * `table_id` - The table to read from
    /// * `index` - 0-based row index
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the table is absent or the index is
    /// past its row count.
    pub fn row(&self, table_id: TableId, index: u32) -> Result<RowRc> {
        match self.table(table_id) {
            Some(table) => table.row(index),
            None => Err(OutOfBounds),
        }
    }

    /// Dereference a decoded cell value to its target row.
    ///
    /// Works for simple and coded references alike, returning the target table kind
    /// together with the materialized row.
    ///
    /// ## Arguments
    /// * `value` - The cell value to dereference
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] for the null sentinel,
    /// [`crate::Error::Malformed`] for cells that are not references, and
    /// [`crate::Error::OutOfBounds`] if the target row does not exist.
    pub fn deref(&self, value: &CellValue) -> Result<(TableId, RowRc)> {
        match value {
            CellValue::RowRef(table_id, index) | CellValue::CodedRef(table_id, index) => {
                Ok((*table_id, self.row(*table_id, *index)?))
            }
            CellValue::Null => Err(NullReference),
            _ => Err(malformed_error!(
                "Cell value is not a table reference - {:?}",
                value
            )),
        }
    }

    /// Get an iterator over all present tables
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|table_id| self.table(*table_id).is_some())
    }
}
