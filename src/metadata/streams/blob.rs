//! Blob Heap (`#Blob`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#Blob` heap, which stores binary data such as signatures and custom attributes.
//! This module exposes the [`Blob`] struct for safe access and parsing of blobs referenced by metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// Byte range of one discovered heap entry.
#[derive(Debug, Clone, Copy)]
struct BlobEntry {
    /// Offset of the length prefix
    start: usize,
    /// Offset of the first value byte
    data_start: usize,
    /// Offset one past the last value byte
    data_end: usize,
}

/// `#Blob` points to streams of bytes. Each entry carries its size encoded in its first
/// bytes, using the ECMA-335 compressed unsigned integer format:
///
/// * If the first byte is `0bbbbbbb`, the entry holds `bbbbbbb` bytes of data (1-byte prefix).
/// * If the first two bytes are `10bbbbbb x`, the entry holds `(bbbbbb << 8 | x)` bytes (2-byte prefix).
/// * If the first four bytes are `110bbbbb x y z`, the entry holds
///   `(bbbbb << 24 | x << 16 | y << 8 | z)` bytes (4-byte prefix).
///
/// Construction performs one linear scan discovering entry boundaries. Offsets that land
/// on an entry start resolve to the full entry value; offsets into the middle of an entry
/// resolve to the entry's suffix from that byte to the entry's end. Offsets at or past
/// the heap size are out of range.
///
/// # Examples
///
/// ```rust
/// use cilmeta::Blob;
/// let data = &[0u8, 0x03, 0x41, 0x42, 0x43];
/// let blob = Blob::from(data).unwrap();
/// assert_eq!(blob.get(1).unwrap(), &[0x41, 0x42, 0x43]);
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.4
pub struct Blob<'a> {
    data: &'a [u8],
    entries: Vec<BlobEntry>,
}

impl<'a> Blob<'a> {
    /// Create a `Blob` object from a sequence of bytes.
    ///
    /// Scans the heap once, recording the boundaries of every decodable entry. The scan
    /// stops at the first byte that is not a valid length prefix (typically trailing
    /// padding); offsets past that point fall back to direct prefix parsing.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is empty
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() {
            return Err(malformed_error!("Provided #Blob heap is empty"));
        }

        let mut entries = Vec::new();
        let mut position = 0_usize;
        while position < data.len() {
            let mut parser = Parser::new(&data[position..]);
            let Ok(length) = parser.read_compressed_uint() else {
                break;
            };

            let data_start = position + parser.pos();
            let Some(data_end) = data_start.checked_add(length as usize) else {
                break;
            };
            if data_end > data.len() {
                break;
            }

            entries.push(BlobEntry {
                start: position,
                data_start,
                data_end,
            });
            position = data_end;
        }

        Ok(Blob { data, entries })
    }

    /// Get a view of the bytes referenced by the provided offset.
    ///
    /// An offset on an entry start yields the entry's full value. An offset inside an
    /// entry discovered by the initial scan yields the suffix from that byte to the
    /// entry's end. Offsets beyond the scanned region are parsed directly as a length
    /// prefix.
    ///
    /// ## Arguments
    /// * `offset` - The byte offset within the heap to be accessed (comes from metadata tables)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset is at or past the heap size or
    /// the referenced bytes exceed it, and [`crate::Error::Malformed`] for an invalid
    /// length prefix.
    pub fn get(&self, offset: usize) -> Result<&'a [u8]> {
        if offset >= self.data.len() {
            return Err(OutOfBounds);
        }

        match self.entries.binary_search_by_key(&offset, |entry| entry.start) {
            Ok(found) => {
                let entry = &self.entries[found];
                Ok(&self.data[entry.data_start..entry.data_end])
            }
            Err(insertion) => {
                if insertion > 0 {
                    let entry = &self.entries[insertion - 1];
                    if offset < entry.data_end {
                        return Ok(&self.data[offset..entry.data_end]);
                    }
                }

                self.parse_at(offset)
            }
        }
    }

    /// Returns an iterator over the entries discovered by the initial scan.
    ///
    /// Each iteration yields `(start offset, value bytes)`, zero-copy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilmeta::Blob;
    ///
    /// let data = &[0u8, 0x02, 0x41, 0x42, 0x01, 0x43];
    /// let blob = Blob::from(data).unwrap();
    ///
    /// let entries: Vec<_> = blob.iter().collect();
    /// assert_eq!(entries, vec![(0, &[][..]), (1, &[0x41, 0x42][..]), (4, &[0x43][..])]);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a [u8])> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.start, &self.data[entry.data_start..entry.data_end]))
    }

    /// Decode a length-prefixed entry directly at an offset, without the scan index.
    fn parse_at(&self, offset: usize) -> Result<&'a [u8]> {
        let mut parser = Parser::new(&self.data[offset..]);
        let length = parser.read_compressed_uint()? as usize;

        let Some(data_start) = offset.checked_add(parser.pos()) else {
            return Err(OutOfBounds);
        };
        let Some(data_end) = data_start.checked_add(length) else {
            return Err(OutOfBounds);
        };
        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = {
            let mut data = vec![0xCC_u8; 66075];
            /* 0    - empty                 */ data[0] = 0x00;
            /* 1    - len 10                */ data[1] = 0x0A;
            /* 1    - len 10                */ data[2..12].copy_from_slice(&[0x0A; 10]);
            /* 12   - len 5                 */ data[12] = 0x05;
            /* 12   - len 5                 */ data[13..18].copy_from_slice(&[0xAB; 5]);
            /* 18   - invalid prefix        */ data[18] = 0xFF;
            /* 19   - len 257, 2-byte prefix*/ data[19] = 0x81;
            /* 19   - len 257               */ data[20] = 0x01;
            /* 19   - len 257               */ data[21..278].copy_from_slice(&[0xBA; 257]);
            /* 278  - len 65793, 4-byte     */ data[278] = 0xC0;
            /* 278  -                       */ data[279] = 0x01;
            /* 278  -                       */ data[280] = 0x01;
            /* 278  -                       */ data[281] = 0x01;
            /* 278  -                       */ data[282..66075].copy_from_slice(&[0xBA; 65793]);
            data
        };

        let blob = Blob::from(&data).unwrap();

        assert_eq!(blob.get(0).unwrap().len(), 0);
        assert_eq!(blob.get(1).unwrap(), &[0x0A; 10]);
        assert_eq!(blob.get(12).unwrap(), &[0xAB; 5]);
        assert!(blob.get(18).is_err());
        assert_eq!(blob.get(19).unwrap(), &[0xBA; 257]);
        assert_eq!(blob.get(278).unwrap().len(), 65793);
    }

    #[test]
    fn entry_without_leading_null() {
        // A single entry occupying the whole heap, starting at offset 0
        let data = [0x04, 0xAA, 0xBB, 0xCC, 0xDD];
        let blob = Blob::from(&data).unwrap();

        assert_eq!(blob.get(0).unwrap(), &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(matches!(blob.get(5), Err(OutOfBounds)));
    }

    #[test]
    fn mid_entry_suffix() {
        let data = [0x00, 0x04, 0xAA, 0xBB, 0xCC, 0xDD];
        let blob = Blob::from(&data).unwrap();

        assert_eq!(blob.get(1).unwrap(), &[0xAA, 0xBB, 0xCC, 0xDD]);
        // Offsets inside the entry resolve to its suffix
        assert_eq!(blob.get(3).unwrap(), &[0xBB, 0xCC, 0xDD]);
        assert_eq!(blob.get(5).unwrap(), &[0xDD]);
    }

    #[test]
    fn truncated_entry() {
        // Entry claims 5 bytes but only 3 are present
        let data = [0x00, 0x05, 0x41, 0x42, 0x43];
        let blob = Blob::from(&data).unwrap();

        assert!(blob.get(1).is_err());
    }

    #[test]
    fn iterator() {
        let data = [0x00, 0x02, 0x41, 0x42, 0x01, 0x43];
        let blob = Blob::from(&data).unwrap();
        let mut iter = blob.iter();

        assert_eq!(iter.next().unwrap(), (0, &[][..]));
        assert_eq!(iter.next().unwrap(), (1, &[0x41, 0x42][..]));
        assert_eq!(iter.next().unwrap(), (4, &[0x43][..]));
        assert!(iter.next().is_none());
    }

    #[test]
    fn empty_heap() {
        assert!(Blob::from(&[]).is_err());
    }
}
