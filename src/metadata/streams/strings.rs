//! String Heap (`#Strings`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#Strings` heap, which stores identifier strings in UTF-8 encoding.
//! This module exposes the [`Strings`] struct for safe access and parsing of identifier strings referenced by metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// `#Strings` holds the identifiers referenced from the metadata tables: type names,
/// namespaces, method and field names.
///
/// Entries are NUL-terminated UTF-8. Offsets are not required to land on an entry start:
/// an offset into the middle of an entry resolves to that entry's suffix, which the
/// NUL-terminated framing yields naturally by reading from the offset to the next NUL.
///
/// # Examples
///
/// ```rust
/// use cilmeta::Strings;
/// let data = &[0u8, b'H', b'e', b'l', b'l', b'o', 0u8];
/// let strings = Strings::from(data).unwrap();
/// assert_eq!(strings.get(1).unwrap(), "Hello");
/// assert_eq!(strings.get(3).unwrap(), "llo");
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.3
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the string heap data is empty
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Get a view into the string contained at the provided offset.
    ///
    /// ## Arguments
    /// * `index` - The byte offset within the heap to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset is at or past the heap size,
    /// or [`crate::Error::Malformed`] if the entry is unterminated or not valid UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}
