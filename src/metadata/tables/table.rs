//! Lazy, cached access to one metadata table.
//!
//! A [`Table`] wraps the byte span of a single table inside the table stream. Rows are
//! never decoded eagerly - declared row counts can be large - but materialized on first
//! access and cached per index. The cache is write-once-per-key and idempotent (rows are
//! a pure function of the immutable backing bytes), guarded by a concurrent map so that
//! parallel iteration is safe.

use dashmap::DashMap;
use rayon::iter::{plumbing, IndexedParallelIterator, ParallelIterator};

use crate::{
    metadata::tables::{schema, Column, Row, RowRc, TableId, TableInfoRef},
    Error::OutOfBounds,
    Result,
};
use std::sync::Arc;

/// One metadata table: kind, byte span, row geometry and the lazy row cache.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::{MetadataView, TableId};
///
/// # fn example(view: &MetadataView) -> cilmeta::Result<()> {
/// if let Some(types) = view.tables().table(TableId::TypeDef) {
///     for row in types.iter() {
///         println!("{}: {:?}", row.token, row.cell_by_name("TypeName")?.value);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Table<'a> {
    id: TableId,
    data: &'a [u8],
    row_count: u32,
    row_width: u32,
    info: TableInfoRef,
    cache: DashMap<u32, RowRc>,
}

impl<'a> Table<'a> {
    /// Create a table over its byte span.
    ///
    /// # Arguments
    /// * `data` - The byte span of exactly this table's rows
    /// * `id` - The table kind
    /// * `row_count` - Number of rows the header declared for this table
    /// * `info` - Size context resolving row geometry
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the declared rows exceed the span.
    pub fn new(
        data: &'a [u8],
        id: TableId,
        row_count: u32,
        info: TableInfoRef,
    ) -> Result<Table<'a>> {
        let row_width = info.row_width(id);
        if (row_count as u64 * u64::from(row_width)) > data.len() as u64 {
            return Err(OutOfBounds);
        }

        Ok(Table {
            id,
            data,
            row_count,
            row_width,
            info,
            cache: DashMap::new(),
        })
    }

    /// The kind of this table.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// The number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// The byte width of one row.
    #[must_use]
    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    /// The total byte size of this table.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_width)
    }

    /// The column schema of this table.
    #[must_use]
    pub fn columns(&self) -> &'static [Column] {
        schema::columns(self.id)
    }

    /// Returns the row at a 0-based index, materializing and caching it on first access.
    ///
    /// # Arguments
    /// * `index` - 0-based row index
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index is past the row count, or a
    /// decode error if the row is malformed.
    pub fn row(&self, index: u32) -> Result<RowRc> {
        if index >= self.row_count {
            return Err(OutOfBounds);
        }

        if let Some(row) = self.cache.get(&index) {
            return Ok(row.value().clone());
        }

        let mut offset = index as usize * self.row_width as usize;
        let row = Arc::new(Row::read(
            self.data,
            &mut offset,
            self.id,
            index,
            &self.info,
        )?);

        let entry = self.cache.entry(index).or_insert(row);
        Ok(entry.value().clone())
    }

    /// Creates a sequential iterator over all rows.
    ///
    /// Rows are materialized on demand as the iterator advances; iteration ends early
    /// if a row fails to decode.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a> {
        TableIterator {
            table: self,
            current_row: 0,
        }
    }

    /// Creates a rayon parallel iterator over all rows.
    ///
    /// Work is split across threads by row ranges; rows that fail to decode are skipped.
    #[must_use]
    pub fn par_iter(&self) -> TableParIterator<'_, 'a> {
        TableParIterator {
            table: self,
            range: 0..self.row_count,
        }
    }
}

impl<'s, 'a> IntoIterator for &'s Table<'a> {
    type Item = RowRc;
    type IntoIter = TableIterator<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of one [`Table`].
pub struct TableIterator<'s, 'a> {
    table: &'s Table<'a>,
    current_row: u32,
}

impl<'s, 'a> Iterator for TableIterator<'s, 'a> {
    type Item = RowRc;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        match self.table.row(self.current_row) {
            Ok(row) => {
                self.current_row += 1;
                Some(row)
            }
            Err(_) => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count - self.current_row) as usize;
        (0, Some(remaining))
    }
}

/// Parallel iterator over the rows of one [`Table`].
///
/// Integrates with the rayon framework through the producer/consumer plumbing, so all
/// standard parallel iterator operations are available.
pub struct TableParIterator<'s, 'a> {
    table: &'s Table<'a>,
    range: std::ops::Range<u32>,
}

impl<'s, 'a> ParallelIterator for TableParIterator<'s, 'a> {
    type Item = RowRc;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: plumbing::UnindexedConsumer<Self::Item>,
    {
        plumbing::bridge(self, consumer)
    }
}

impl<'s, 'a> IndexedParallelIterator for TableParIterator<'s, 'a> {
    fn len(&self) -> usize {
        self.range.len()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: plumbing::Consumer<Self::Item>,
    {
        plumbing::bridge(self, consumer)
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: plumbing::ProducerCallback<Self::Item>,
    {
        callback.callback(TableProducer {
            table: self.table,
            range: self.range,
        })
    }
}

/// Internal producer distributing row ranges across rayon worker threads.
struct TableProducer<'s, 'a> {
    table: &'s Table<'a>,
    range: std::ops::Range<u32>,
}

impl<'s, 'a> plumbing::Producer for TableProducer<'s, 'a> {
    type Item = RowRc;
    type IntoIter = TableProducerIterator<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        TableProducerIterator {
            table: self.table,
            range: self.range,
        }
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        // Index represents table row positions which are expected to fit in u32
        #[allow(clippy::cast_possible_truncation)]
        let mid = self.range.start + index as u32;
        let left = TableProducer {
            table: self.table,
            range: self.range.start..mid,
        };
        let right = TableProducer {
            table: self.table,
            range: mid..self.range.end,
        };
        (left, right)
    }
}

/// Internal iterator over one chunk of a parallel row range.
struct TableProducerIterator<'s, 'a> {
    table: &'s Table<'a>,
    range: std::ops::Range<u32>,
}

impl<'s, 'a> Iterator for TableProducerIterator<'s, 'a> {
    type Item = RowRc;

    fn next(&mut self) -> Option<Self::Item> {
        if self.range.start >= self.range.end {
            return None;
        }

        let row_index = self.range.start;
        self.range.start += 1;

        self.table.row(row_index).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.range.len();
        (len, Some(len))
    }
}

impl<'s, 'a> ExactSizeIterator for TableProducerIterator<'s, 'a> {}

impl<'s, 'a> DoubleEndedIterator for TableProducerIterator<'s, 'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.range.start >= self.range.end {
            return None;
        }

        self.range.end -= 1;

        self.table.row(self.range.end).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{CellValue, TableInfo};
    use rayon::iter::ParallelIterator;

    fn field_table(data: &[u8], rows: u32) -> Table<'_> {
        let info = Arc::new(TableInfo::new_test(
            &[(TableId::Field, rows)],
            false,
            false,
            false,
        ));
        Table::new(data, TableId::Field, rows, info).unwrap()
    }

    #[test]
    fn row_access_and_bounds() {
        // Field rows: Flags(2) + Name(2) + Signature(2)
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x0A, 0x00, 0x05, 0x00,
            0x02, 0x00, 0x14, 0x00, 0x00, 0x00,
        ];

        let table = field_table(&data, 2);
        assert_eq!(table.row_width(), 6);
        assert_eq!(table.size(), 12);

        let first = table.row(0).unwrap();
        assert_eq!(first.cell(0).unwrap().value, CellValue::U16(1));
        assert_eq!(first.token.value(), 0x0400_0001);

        let second = table.row(1).unwrap();
        assert_eq!(second.cell_by_name("Signature").unwrap().value, CellValue::Null);

        assert!(matches!(table.row(2), Err(OutOfBounds)));
    }

    #[test]
    fn rows_are_cached() {
        let data = [0x01, 0x00, 0x0A, 0x00, 0x05, 0x00];
        let table = field_table(&data, 1);

        let first = table.row(0).unwrap();
        let again = table.row(0).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn declared_rows_must_fit() {
        let data = [0x00_u8; 6];
        let info = Arc::new(TableInfo::new_test(
            &[(TableId::Field, 2)],
            false,
            false,
            false,
        ));

        assert!(matches!(
            Table::new(&data, TableId::Field, 2, info),
            Err(OutOfBounds)
        ));
    }

    #[test]
    fn sequential_iteration() {
        let mut data = Vec::new();
        for i in 0..8_u16 {
            data.extend_from_slice(&i.to_le_bytes());
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        }

        let table = field_table(&data, 8);
        let flags: Vec<u32> = table.iter().map(|row| row.cell(0).unwrap().raw).collect();
        assert_eq!(flags, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn parallel_iteration() {
        let mut data = Vec::new();
        for i in 0..64_u16 {
            data.extend_from_slice(&i.to_le_bytes());
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        }

        let table = field_table(&data, 64);
        let sum: u32 = table.par_iter().map(|row| row.cell(0).unwrap().raw).sum();
        assert_eq!(sum, (0..64).sum::<u32>());
    }
}
