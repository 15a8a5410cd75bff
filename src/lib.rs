// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # cilmeta
//!
//! A decoder for the ECMA-335 metadata streams and CIL method bodies embedded in .NET
//! PE images. Built in pure Rust, `cilmeta` parses the table stream (`#~`/`#-`), the
//! four companion heaps (`#Strings`, `#US`, `#Blob`, `#GUID`) and the tiny/fat method
//! body format, without requiring Windows or the .NET runtime.
//!
//! The hard part of this format is that row layout is not statically fixed: a column's
//! byte width depends on the heap-size flags and on other tables' row counts, including
//! coded-token columns that multiplex references across up to 22 table kinds with a
//! bit-packed tag. `cilmeta` computes the layout in two strict passes (all row counts
//! first, then widths and offsets) and decodes rows lazily against static column
//! schemas, so nothing is ever guessed and errors surface exactly where malformed data
//! is first used.
//!
//! ## Scope
//!
//! This library starts where the PE plumbing ends: its inputs are the byte range of a
//! metadata root (located via the CLR runtime header of a PE image) and, for method
//! bodies, the bytes at a `MethodDef` row's RVA. PE/COFF parsing, RVA translation and
//! the native resource directories are the domain of a PE library. Metadata is
//! strictly read-only; writing is out of scope.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cilmeta::{MetadataView, TableId};
//!
//! # fn example(metadata: &[u8]) -> cilmeta::Result<()> {
//! let view = MetadataView::from_slice(metadata)?;
//!
//! // Walk the type definitions
//! if let Some(types) = view.tables().table(TableId::TypeDef) {
//!     for row in types.iter() {
//!         let name = view.string_of(row.cell_by_name("TypeName")?)?;
//!         println!("{}: {:?}", row.token, name);
//!     }
//! }
//!
//! // Follow a coded reference
//! let first = view.tables().row(TableId::TypeDef, 0)?;
//! match view.deref(first.cell_by_name("Extends")?) {
//!     Ok((table, row)) => println!("extends {:?} {}", table, row.token),
//!     Err(cilmeta::Error::NullReference) => println!("extends nothing"),
//!     Err(other) => return Err(other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::root`] - the `BSJB` root header and stream directory
//! - [`metadata::streams`] - the heaps and the table stream
//! - [`metadata::tables`] - table schemas, coded tokens, layout and row materialization
//! - [`metadata::method`] - tiny/fat method bodies and exception sections
//! - [`metadata::view`] - borrowed and owned entry points
//! - [`Error`] and [`Result`] - the crate-wide error taxonomy

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

pub mod metadata;
pub mod prelude;

/// Crate-wide error type covering every decoding failure
pub use error::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

pub use file::{Backend, Memory, Parser, Physical};
pub use metadata::{
    method::{ExceptionHandler, ExceptionHandlerFlags, MethodBody, MethodBodyFlags, SectionFlags},
    root::Root,
    streams::{Blob, Guid, StreamHeader, Strings, TableStream, UserStrings},
    tables::{
        Cell, CellValue, CodedIndex, CodedIndexType, Column, ColumnKind, Row, RowRc, Table,
        TableId, TableInfo, TableInfoRef,
    },
    token::Token,
    view::{MetadataFile, MetadataView},
};
