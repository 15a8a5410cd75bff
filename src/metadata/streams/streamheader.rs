//! Stream Header for .NET Metadata Streams
//!
//! Provides parsing and access to stream headers, which describe the name, offset, and size of each metadata stream.
//! This module exposes the [`StreamHeader`] struct for reading and validating stream header information.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// A stream header provides the name, position and length of one metadata stream. The
/// length of a stream header structure is not fixed: the name is a null-terminated
/// string, padded to the next 4-byte boundary.
///
/// Both `#~` (compressed) and `#-` (uncompressed) name the table stream; they decode
/// identically in this library.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.2
///
/// # Examples
///
/// ```rust
/// use cilmeta::StreamHeader;
/// let data = [0x6C, 0x00, 0x00, 0x00, 0xA4, 0x45, 0x00, 0x00, 0x23, 0x7E, 0x00];
/// let header = StreamHeader::from(&data).unwrap();
/// assert_eq!(header.name, "#~");
/// ```
pub struct StreamHeader {
    /// Offset of the stream, relative to the start of the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4
    pub size: u32,
    /// Name of the stream, max 32 characters
    pub name: String,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the stream name is not one of the
    /// names defined by the standard.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let mut name = String::with_capacity(32);
        for counter in 0..std::cmp::min(32, data.len() - 8) {
            let name_char = read_le::<u8>(&data[8 + counter..])?;
            if name_char == 0 {
                break;
            }

            name.push(char::from(name_char));
        }

        if !["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"]
            .iter()
            .any(|valid_name| name == *valid_name)
        {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Returns true if this header names the table stream (`#~` or `#-`).
    #[must_use]
    pub fn is_table_stream(&self) -> bool {
        self.name == "#~" || self.name == "#-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
        assert!(parsed_header.is_table_stream());
    }

    #[test]
    fn uncompressed_table_stream_name() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x2D, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();
        assert_eq!(parsed_header.name, "#-");
        assert!(parsed_header.is_table_stream());
    }

    #[test]
    fn crafted_invalid() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
    }

    #[test]
    fn too_short() {
        assert!(matches!(StreamHeader::from(&[0x00; 8]), Err(OutOfBounds)));
    }
}
