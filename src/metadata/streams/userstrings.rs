//! User String Heap (`#US`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#US` heap, which stores user-defined string literals in UTF-16 encoding.
//! This module exposes the [`UserStrings`] struct for safe access and parsing of user strings referenced
//! by `ldstr` instructions and metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

use widestring::U16String;

/// The `#US` heap frames its entries exactly like `#Blob` (compressed length prefix), but
/// each entry's payload is a UTF-16LE string followed by one terminal flag byte. The flag
/// byte records whether the string needs special handling when printed; it is not part of
/// the string and is dropped during decoding.
///
/// # Examples
///
/// ```rust
/// use cilmeta::UserStrings;
/// let data = &[0u8, 0x03, 0x41, 0x00, 0x00];
/// let us = UserStrings::from(data).unwrap();
/// assert_eq!(us.get(1).unwrap().to_string().unwrap(), "A");
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.4
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the user string heap data is empty
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.is_empty() {
            return Err(malformed_error!("Provided #US heap is empty"));
        }

        Ok(UserStrings { data })
    }

    /// Decode the user string entry at the provided offset.
    ///
    /// Reads the compressed length prefix, drops the terminal flag byte and re-decodes
    /// the remaining bytes as UTF-16LE code units.
    ///
    /// ## Arguments
    /// * `index` - The byte offset within the heap to be accessed (comes from `ldstr` tokens)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset or the referenced bytes lie
    /// past the heap, and [`crate::Error::Malformed`] for an invalid length prefix or an
    /// entry whose payload is not framed in whole UTF-16 code units.
    pub fn get(&self, index: usize) -> Result<U16String> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let length = parser.read_compressed_uint()? as usize;

        let Some(data_start) = index.checked_add(parser.pos()) else {
            return Err(OutOfBounds);
        };
        let Some(data_end) = data_start.checked_add(length) else {
            return Err(OutOfBounds);
        };
        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        // Entries store 2n UTF-16 bytes plus one flag byte; the empty entry has no flag.
        let payload = match length % 2 {
            0 => &self.data[data_start..data_end],
            _ => &self.data[data_start..data_end - 1],
        };

        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(U16String::from_vec(units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 29] = [
            0x00,
            0x1B,
            0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00, 0x2C, 0x00, 0x20, 0x00,
            0x57, 0x00, 0x6F, 0x00, 0x72, 0x00, 0x6C, 0x00, 0x64, 0x00, 0x21, 0x00,
            0x00,
        ];

        let us = UserStrings::from(&data).unwrap();
        assert_eq!(us.get(1).unwrap().to_string().unwrap(), "Hello, World!");
    }

    #[test]
    fn empty_entry() {
        let data = [0x00, 0x00];
        let us = UserStrings::from(&data).unwrap();
        assert_eq!(us.get(1).unwrap().to_string().unwrap(), "");
    }

    #[test]
    fn flag_byte_is_dropped() {
        // "A" encoded as one code unit plus a flag byte of 0x01
        let data = [0x00, 0x03, 0x41, 0x00, 0x01];
        let us = UserStrings::from(&data).unwrap();
        assert_eq!(us.get(1).unwrap().to_string().unwrap(), "A");
    }

    #[test]
    fn invalid() {
        assert!(UserStrings::from(&[]).is_err());

        // Entry claims more bytes than the heap holds
        let data = [0x00, 0x1B, 0x48, 0x00];
        let us = UserStrings::from(&data).unwrap();
        assert!(matches!(us.get(1), Err(OutOfBounds)));

        // Offset past the heap
        assert!(matches!(us.get(64), Err(OutOfBounds)));
    }
}
