//! Generic row and cell materialization.
//!
//! Rows are decoded on demand from a table's byte span, driven by the static column
//! schema: each column is read left-to-right with a forward cursor, with no inter-column
//! padding. Raw reference values are normalized during materialization - the wire format
//! is 1-based with 0 as the null sentinel, while decoded cells carry 0-based ordinals or
//! an explicit [`CellValue::Null`].

use std::sync::Arc;

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{schema, CodedIndex, Column, ColumnKind, TableId, TableInfoRef},
        token::Token,
    },
    Error::OutOfBounds,
    Result,
};

/// Shared handle to a materialized row.
pub type RowRc = Arc<Row>;

/// The decoded value of one table cell.
///
/// Fixed columns pass their integers through; heap and table references are normalized:
/// a raw value of 0 decodes to [`CellValue::Null`], non-null row references carry the
/// 0-based row index of their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValue {
    /// A fixed 2-byte value
    U16(u16),
    /// A fixed 4-byte value
    U32(u32),
    /// A non-null byte offset into the `#Strings` heap
    StringRef(u32),
    /// A non-null index into the `#GUID` heap (1-based, as the heap is indexed)
    GuidRef(u32),
    /// A non-null byte offset into the `#Blob` heap
    BlobRef(u32),
    /// A non-null reference to a row of a fixed target table (0-based index)
    RowRef(TableId, u32),
    /// A non-null decoded coded reference (0-based index)
    CodedRef(TableId, u32),
    /// The null sentinel of a 0-valued reference column
    Null,
}

/// One decoded cell: the column it belongs to plus raw and decoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The schema column this cell was decoded from
    pub column: Column,
    /// The raw wire value of the column, before normalization
    pub raw: u32,
    /// The decoded value
    pub value: CellValue,
}

impl Cell {
    /// Decode one cell at the cursor, advancing it by the column's width.
    ///
    /// # Arguments
    /// * `data` - The table's byte span
    /// * `offset` - Forward cursor into `data`, advanced after reading
    /// * `column` - The schema column to decode
    /// * `info` - Size context resolving dynamic column widths
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on a truncated row or
    /// [`crate::Error::Malformed`] for a coded tag without a family member.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        column: Column,
        info: &TableInfoRef,
    ) -> Result<Cell> {
        let (raw, value) = match column.kind {
            ColumnKind::Fixed16 => {
                let value = read_le_at::<u16>(data, offset)?;
                (u32::from(value), CellValue::U16(value))
            }
            ColumnKind::Fixed32 => {
                let value = read_le_at::<u32>(data, offset)?;
                (value, CellValue::U32(value))
            }
            ColumnKind::StringIdx => {
                let raw = read_le_at_dyn(data, offset, info.is_large_str())?;
                let value = if raw == 0 {
                    CellValue::Null
                } else {
                    CellValue::StringRef(raw)
                };
                (raw, value)
            }
            ColumnKind::GuidIdx => {
                let raw = read_le_at_dyn(data, offset, info.is_large_guid())?;
                let value = if raw == 0 {
                    CellValue::Null
                } else {
                    CellValue::GuidRef(raw)
                };
                (raw, value)
            }
            ColumnKind::BlobIdx => {
                let raw = read_le_at_dyn(data, offset, info.is_large_blob())?;
                let value = if raw == 0 {
                    CellValue::Null
                } else {
                    CellValue::BlobRef(raw)
                };
                (raw, value)
            }
            ColumnKind::SimpleRef(target) => {
                let raw = read_le_at_dyn(data, offset, info.is_large(target))?;
                let value = if raw == 0 {
                    CellValue::Null
                } else {
                    CellValue::RowRef(target, raw - 1)
                };
                (raw, value)
            }
            ColumnKind::CodedRef(family) => {
                let raw = read_le_at_dyn(data, offset, info.coded_index_bytes(family) == 4)?;
                let index = CodedIndex::decode(raw, family)?;
                let value = if index.row == 0 {
                    CellValue::Null
                } else {
                    CellValue::CodedRef(index.table, index.row - 1)
                };
                (raw, value)
            }
        };

        Ok(Cell {
            column,
            raw,
            value,
        })
    }
}

/// One materialized table row.
///
/// A `Row` is addressed by `(table, index)` with a 0-based index; its token carries the
/// wire-level 1-based row id. Equality is value equality on `(table, index)` only - the
/// same logical row reached via direct indexing and via coded-token dereference compares
/// equal even though the instances were materialized independently.
#[derive(Debug, Clone)]
pub struct Row {
    /// The table this row belongs to
    pub table: TableId,
    /// 0-based row index
    pub index: u32,
    /// The metadata token of this row
    pub token: Token,
    cells: Vec<Cell>,
}

impl Row {
    /// Decode one row from a table's byte span.
    ///
    /// # Arguments
    /// * `data` - The table's byte span
    /// * `offset` - Forward cursor positioned at the row start
    /// * `table` - The table being decoded
    /// * `index` - 0-based row index within the table
    /// * `info` - Size context resolving dynamic column widths
    ///
    /// # Errors
    /// Returns an error if any cell of the row fails to decode.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        table: TableId,
        index: u32,
        info: &TableInfoRef,
    ) -> Result<Row> {
        let columns = schema::columns(table);
        let mut cells = Vec::with_capacity(columns.len());

        for column in columns {
            cells.push(Cell::read(data, offset, *column, info)?);
        }

        Ok(Row {
            table,
            index,
            token: Token::new((u32::from(table as u8) << 24) | (index + 1)),
            cells,
        })
    }

    /// Returns the cell at a column position.
    ///
    /// # Arguments
    /// * `index` - 0-based column index
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the position is past the schema.
    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.cells.get(index).ok_or(OutOfBounds)
    }

    /// Returns the cell of the named column.
    ///
    /// # Arguments
    /// * `name` - The column name as printed in ECMA-335 II.22
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the schema has no such column.
    pub fn cell_by_name(&self, name: &str) -> Result<&Cell> {
        self.cells
            .iter()
            .find(|cell| cell.column.name == name)
            .ok_or(OutOfBounds)
    }

    /// Returns all cells of this row in column order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.index == other.index
    }
}

impl Eq for Row {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::TableInfo;
    use std::sync::Arc;

    fn small_info() -> TableInfoRef {
        Arc::new(TableInfo::new_test(
            &[
                (TableId::TypeDef, 2),
                (TableId::TypeRef, 1),
                (TableId::Field, 4),
                (TableId::MethodDef, 4),
            ],
            false,
            false,
            false,
        ))
    }

    #[test]
    fn typedef_row_decodes() {
        let info = small_info();

        #[rustfmt::skip]
        let data = [
            /* Flags */         0x01, 0x00, 0x10, 0x00,
            /* TypeName */      0x2A, 0x00,
            /* TypeNamespace */ 0x00, 0x00,
            /* Extends */       0x05, 0x00, // tag 1 -> TypeRef, row 1
            /* FieldList */     0x01, 0x00,
            /* MethodList */    0x03, 0x00,
        ];

        let mut offset = 0;
        let row = Row::read(&data, &mut offset, TableId::TypeDef, 0, &info).unwrap();

        assert_eq!(offset, 14);
        assert_eq!(row.token.value(), 0x0200_0001);
        assert_eq!(row.cell(0).unwrap().value, CellValue::U32(0x0010_0001));
        assert_eq!(
            row.cell_by_name("TypeName").unwrap().value,
            CellValue::StringRef(0x2A)
        );
        assert_eq!(row.cell_by_name("TypeNamespace").unwrap().value, CellValue::Null);
        assert_eq!(
            row.cell_by_name("Extends").unwrap().value,
            CellValue::CodedRef(TableId::TypeRef, 0)
        );
        assert_eq!(
            row.cell_by_name("FieldList").unwrap().value,
            CellValue::RowRef(TableId::Field, 0)
        );
        assert_eq!(
            row.cell_by_name("MethodList").unwrap().value,
            CellValue::RowRef(TableId::MethodDef, 2)
        );

        assert!(row.cell(6).is_err());
        assert!(row.cell_by_name("NoSuchColumn").is_err());
    }

    #[test]
    fn null_references() {
        let info = small_info();

        // InterfaceImpl: Class (SimpleRef TypeDef), Interface (TypeDefOrRef)
        let data = [0x00, 0x00, 0x00, 0x00];
        let mut offset = 0;
        let row = Row::read(&data, &mut offset, TableId::InterfaceImpl, 0, &info).unwrap();

        assert_eq!(row.cell(0).unwrap().value, CellValue::Null);
        assert_eq!(row.cell(1).unwrap().value, CellValue::Null);
        assert_eq!(row.cell(1).unwrap().raw, 0);
    }

    #[test]
    fn truncated_row() {
        let info = small_info();
        let data = [0x01, 0x00, 0x10];

        let mut offset = 0;
        assert!(matches!(
            Row::read(&data, &mut offset, TableId::TypeDef, 0, &info),
            Err(OutOfBounds)
        ));
    }

    #[test]
    fn equality_is_identity_by_position() {
        let info = small_info();
        let data = [0u8; 14];

        let mut offset = 0;
        let first = Row::read(&data, &mut offset, TableId::TypeDef, 0, &info).unwrap();

        let mut offset = 0;
        let again = Row::read(&data, &mut offset, TableId::TypeDef, 0, &info).unwrap();
        let mut offset = 0;
        let other = Row::read(&data, &mut offset, TableId::TypeDef, 1, &info).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
    }
}
