use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::{schema, CodedIndexType, ColumnKind, TableId},
    Error::{NotSupported, OutOfBounds},
    Result,
};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::max`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    ///
    /// Automatically calculates the number of bits required to represent
    /// indices into a table with the specified number of rows.
    ///
    /// # Arguments
    /// * `rows` - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds the row counts and reference index widths of all tables in one
/// table stream.
///
/// This is the size context that resolves the apparent layout circularity of the
/// format: row widths depend on other tables' row counts, so construction is strictly
/// two-phase. Phase 1 reads every row count behind the stream header without decoding
/// anything else; phase 2 derives per-column widths and the cached coded-index widths
/// from the now-complete count table. Constructed once per table stream and shared via
/// [`TableInfoRef`].
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Build a new `TableInfo` struct from the table stream bytes.
    ///
    /// ## Arguments
    /// * `data` - The full table stream, with the header at offset 0
    /// * `valid_bitvec` - The presence bitmask from the header
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row count vector is truncated, or
    /// [`crate::Error::NotSupported`] if the presence bitmask declares tables outside
    /// the ordinal range this library maps.
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        if (valid_bitvec >> (TableId::GenericParamConstraint as u64 + 1)) != 0 {
            return Err(NotSupported);
        }

        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if (valid_bitvec & (1 << table_id as usize)) == 0 {
                continue;
            }

            if data.len() < next_row_offset + 4 {
                return Err(OutOfBounds);
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            if row_count == 0 {
                // Empty tables are omitted at compilation time and should not be present
                continue;
            }

            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        };

        table_info.calculate_coded_index_bits();

        Ok(table_info)
    }

    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * `valid_tables` - A slice of tuples providing (`table_id`, `row_count`) of the valid tables
    /// * `large_str` - Specify if the #String heap indexes are 4 or 2 bytes
    /// * `large_guid` - Specify if the #GUID heap indexes are 4 or 2 bytes
    /// * `large_blob` - Specify if the #Blob heap indexes are 4 or 2 bytes
    #[cfg(test)]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for valid_table in valid_tables {
            table_info.rows[valid_table.0 as usize] = TableRowInfo::new(valid_table.1);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Returns true if a requested table has 2^16 rows or more and hence requires
    /// 4-byte instead of 2-byte indexes
    ///
    /// ## Arguments
    /// * `id` - The `TableId` to query
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the `#Strings` heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the `#GUID` heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the `#Blob` heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Returns the metadata for a specific table.
    ///
    /// # Arguments
    /// * `table` - The `TableId` for which to retrieve metadata
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the number of bytes an index into a specific table occupies.
    ///
    /// # Arguments
    /// * `table_id` - The `TableId` for which to calculate the index size
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the number of bytes a coded index of the given family occupies.
    ///
    /// # Arguments
    /// * `family` - The `CodedIndexType` for which to retrieve the size
    #[must_use]
    pub fn coded_index_bytes(&self, family: CodedIndexType) -> u8 {
        if self.coded_indexes[family as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the number of bytes one column of the given kind occupies.
    ///
    /// # Arguments
    /// * `kind` - The column kind to size
    #[must_use]
    pub fn column_width(&self, kind: ColumnKind) -> u8 {
        match kind {
            ColumnKind::Fixed16 => 2,
            ColumnKind::Fixed32 => 4,
            ColumnKind::StringIdx => {
                if self.is_large_index_str {
                    4
                } else {
                    2
                }
            }
            ColumnKind::GuidIdx => {
                if self.is_large_index_guid {
                    4
                } else {
                    2
                }
            }
            ColumnKind::BlobIdx => {
                if self.is_large_index_blob {
                    4
                } else {
                    2
                }
            }
            ColumnKind::SimpleRef(target) => self.table_index_bytes(target),
            ColumnKind::CodedRef(family) => self.coded_index_bytes(family),
        }
    }

    /// Returns the byte width of one row of the given table.
    ///
    /// A pure function of the heap-size flags and the row counts; the same size context
    /// always yields the same width.
    ///
    /// # Arguments
    /// * `table_id` - The table to size
    #[must_use]
    pub fn row_width(&self, table_id: TableId) -> u32 {
        schema::columns(table_id)
            .iter()
            .map(|column| u32::from(self.column_width(column.kind)))
            .sum()
    }

    /// Calculates the number of bits required for a specific coded index family.
    fn calculate_coded_index_size(&self, family: CodedIndexType) -> u8 {
        let max_bits = family
            .tables()
            .iter()
            .map(|table| self.rows[*table as usize].bits)
            .max()
            .unwrap_or(1);

        max_bits + family.tag_bits()
    }

    /// Calculates and caches the bit sizes required for all coded index families.
    fn calculate_coded_index_bits(&mut self) {
        for family in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(family);
            self.coded_indexes[family as usize] = size;
        }
    }
}
