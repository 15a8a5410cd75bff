//! The physical metadata streams.
//!
//! A metadata root carries up to five streams: the table stream (`#~` or `#-`) holding
//! every metadata table, and the four heaps holding the variable-length data the table
//! rows reference by index:
//!
//! - [`Strings`] - `#Strings`, NUL-terminated UTF-8 identifiers
//! - [`UserStrings`] - `#US`, length-prefixed UTF-16 string literals
//! - [`Blob`] - `#Blob`, length-prefixed binary data (signatures, constants)
//! - [`Guid`] - `#GUID`, fixed 16-byte slots
//! - [`TableStream`] - `#~`/`#-`, the table stream itself
//!
//! The table stream is mandatory; the heaps are optional and any subset may be absent.
//!
//! # Reference
//! - [ECMA-335 II.24.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablestream;
mod userstrings;

pub use blob::Blob;
pub use guid::Guid;
pub use streamheader::StreamHeader;
pub use strings::Strings;
pub use tablestream::TableStream;
pub use userstrings::UserStrings;
