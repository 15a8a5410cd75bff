//! Memory-mapped backend for metadata dumps on disk.
//!
//! [`Physical`] implements the [`crate::file::Backend`] trait over a read-only memory
//! mapping. Pages are loaded on demand, so large metadata dumps can be decoded without
//! reading the whole file upfront, while random access stays cheap.

use crate::{file::Backend, Error::OutOfBounds, Result};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A [`Backend`] that memory-maps a file on disk.
///
/// The file is mapped read-only and shared. All access operations include bounds
/// checking, so truncated files surface as [`crate::Error::OutOfBounds`] at the point
/// of use instead of faulting.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the metadata dump on disk. Accepts `&Path`, `&str`, `String`, or `PathBuf`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path)?;

        let mmap = unsafe { Mmap::map(&file) }?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if offset_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn physical() {
        let mut path = std::env::temp_dir();
        path.push("cilmeta_physical_test.bin");

        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(&[0x42, 0x53, 0x4A, 0x42, 0xCC, 0xCC]).unwrap();
        }

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 6);
        assert_eq!(physical.data_slice(0, 4).unwrap(), b"BSJB");
        assert!(physical.data_slice(4, 4).is_err());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file() {
        assert!(Physical::new("/nonexistent/cilmeta.bin").is_err());
    }
}
