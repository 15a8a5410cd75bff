//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust,no_run
//! use cilmeta::prelude::*;
//!
//! # fn example(data: &[u8]) -> cilmeta::Result<()> {
//! let view = MetadataView::from_slice(data)?;
//! println!("{} tables", view.tables().table_count());
//! # Ok(())
//! # }
//! ```

pub use crate::{
    metadata::{
        method::{ExceptionHandler, ExceptionHandlerFlags, MethodBody},
        streams::{Blob, Guid, Strings, TableStream, UserStrings},
        tables::{Cell, CellValue, CodedIndex, CodedIndexType, Row, RowRc, Table, TableId},
        token::Token,
        view::{MetadataFile, MetadataView},
    },
    Error, Result,
};
