//! GUID Heap (`#GUID`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#GUID` heap, which stores 128-bit GUIDs for module identity.
//! This module exposes the [`Guid`] struct for safe access to GUIDs referenced by metadata tables.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// `#GUID` is a sequence of fixed 16-byte slots, indexed 1-based from the metadata
/// tables: index `i` maps to slot `i - 1`. Index 0 is reserved and yields the zero GUID.
///
/// # Examples
///
/// ```rust
/// use cilmeta::Guid;
/// let data = &[0xAA_u8; 16];
/// let guid_heap = Guid::from(data).unwrap();
/// assert_eq!(guid_heap.get(0).unwrap(), uguid::Guid::from_bytes([0; 16]));
/// assert_eq!(guid_heap.get(1).unwrap(), uguid::Guid::from_bytes([0xAA; 16]));
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.5
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` object from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too small to contain a valid GUID (less than 16 bytes)
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() < 16 {
            return Err(malformed_error!("Data for #GUID heap is too small"));
        }

        Ok(Guid { data })
    }

    /// Returns the GUID at the specified 1-based index.
    ///
    /// Index 0 is the reserved null slot and always yields the zero GUID.
    ///
    /// ## Arguments
    /// * `index` - The 1-based GUID index (comes from metadata tables)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the slot lies past the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Ok(uguid::Guid::from_bytes([0_u8; 16]));
        }

        let offset_start = (index - 1) * 16;
        let Some(offset_end) = offset_start.checked_add(16) else {
            return Err(OutOfBounds);
        };
        if offset_end > self.data.len() {
            return Err(OutOfBounds);
        }

        let mut buffer = [0_u8; 16];
        buffer.copy_from_slice(&self.data[offset_start..offset_end]);

        Ok(uguid::Guid::from_bytes(buffer))
    }
}
