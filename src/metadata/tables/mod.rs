//! # Metadata Tables Module
//!
//! Schema-driven decoding of the ECMA-335 metadata tables. The physical format stores
//! rows with no per-row framing: layout is fully determined by the static column schema
//! of each table kind plus a size context (heap-size flags and every table's row count).
//! This module provides that machinery:
//!
//! - [`TableId`] - the physical table ordinals
//! - [`ColumnKind`] / [`Column`] / [`schema::columns`] - the static column lists (II.22)
//! - [`CodedIndexType`] / [`CodedIndex`] - coded token families and their codec
//! - [`TableInfo`] - row counts and column/row width resolution
//! - [`Table`] - lazy, cached row access with sequential and parallel iteration
//! - [`Row`] / [`Cell`] / [`CellValue`] - materialized rows
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Sections 22 and 24.2.6

mod codedindex;
mod row;
pub mod schema;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use row::{Cell, CellValue, Row, RowRc};
pub use schema::{Column, ColumnKind};
pub use table::{Table, TableIterator, TableParIterator};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};
