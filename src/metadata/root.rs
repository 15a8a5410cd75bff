//! Metadata root header and stream directory for .NET assemblies.
//!
//! This module defines the [`Root`] struct, which represents the root metadata header and
//! stream directory as specified by ECMA-335. The root is the entry point for reading
//! metadata: it carries the version string and the directory locating every stream
//! (`#~`/`#-`, `#Strings`, `#US`, `#Blob`, `#GUID`) relative to the root itself.
//!
//! # References
//!
//! - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The MAGIC value indicating the CIL metadata header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The header of the present metadata, providing the version string and the stream
/// directory required to locate and decode every metadata stream.
///
/// # Example
///
/// ```rust
/// use cilmeta::Root;
/// let root = Root::read(&[
///     0x42, 0x53, 0x4A, 0x42,
///     0x01, 0x00,
///     0x01, 0x00,
///     0x00, 0x00, 0x00, 0x00,
///     0x04, 0x00, 0x00, 0x00,
///     b'v', b'4', b'.', b'0',
///     0x00, 0x00,
///     0x01, 0x00,
///     0x1C, 0x00, 0x00, 0x00, // stream offset
///     0x04, 0x00, 0x00, 0x00, // stream size
///     0x23, 0x7E, 0x00, 0x00, // "#~"
/// ])?;
/// assert_eq!(root.version, "v4.0");
/// assert_eq!(root.stream_headers.len(), 1);
/// # Ok::<(), cilmeta::Error>(())
/// ```
///
/// ## Reference
/// - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string
    pub length: u32,
    /// The version string, without trailing NULs
    pub version: String,
    /// Reserved flag word, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Reads a [`Root`] metadata header from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice beginning at the metadata root
    ///
    /// # Errors
    /// Returns an error if the data is too short, the signature is invalid, or the
    /// stream directory is malformed.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {:#x}",
                signature
            ));
        }

        let version_length = read_le::<u32>(&data[12..])? as usize;
        let Some(version_end) = version_length.checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causes integer overflow - {}",
                version_length
            ));
        };
        if version_end > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..version_end];
        let version = match version_bytes.iter().position(|byte| *byte == 0) {
            Some(terminator) => &version_bytes[..terminator],
            None => version_bytes,
        };
        let version = String::from_utf8_lossy(version).into_owned();

        let mut cursor = version_end;
        let flags = read_le_at::<u16>(data, &mut cursor)?;
        let stream_count = read_le_at::<u16>(data, &mut cursor)?;
        if stream_count == 0 || stream_count > 5 {
            // Table stream plus at most four heaps
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams = Vec::with_capacity(stream_count as usize);
        for _ in 0..stream_count {
            if cursor > data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[cursor..])?;
            match u32::checked_add(new_stream.offset, new_stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(OutOfBounds);
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            let name_aligned = ((new_stream.name.len() + 1) + 3) & !3;
            cursor += 8 + name_aligned;

            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_length as u32,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crafted_root() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&CIL_HEADER_MAGIC.to_le_bytes());
        data.extend_from_slice(&1_u16.to_le_bytes()); // major
        data.extend_from_slice(&1_u16.to_le_bytes()); // minor
        data.extend_from_slice(&0_u32.to_le_bytes()); // reserved
        data.extend_from_slice(&12_u32.to_le_bytes()); // version length
        data.extend_from_slice(b"v4.0.30319\0\0");
        data.extend_from_slice(&0_u16.to_le_bytes()); // flags
        data.extend_from_slice(&2_u16.to_le_bytes()); // stream count

        // "#~" at offset 64, 32 bytes
        data.extend_from_slice(&64_u32.to_le_bytes());
        data.extend_from_slice(&32_u32.to_le_bytes());
        data.extend_from_slice(b"#~\0\0");

        // "#Strings" at offset 96, 16 bytes
        data.extend_from_slice(&96_u32.to_le_bytes());
        data.extend_from_slice(&16_u32.to_le_bytes());
        data.extend_from_slice(b"#Strings\0\0\0\0");

        data.resize(112, 0);
        data
    }

    #[test]
    fn crafted() {
        let data = crafted_root();
        let root = Root::read(&data).unwrap();

        assert_eq!(root.signature, CIL_HEADER_MAGIC);
        assert_eq!(root.major_version, 1);
        assert_eq!(root.minor_version, 1);
        assert_eq!(root.version, "v4.0.30319");
        assert_eq!(root.stream_number, 2);
        assert_eq!(root.stream_headers.len(), 2);
        assert_eq!(root.stream_headers[0].name, "#~");
        assert_eq!(root.stream_headers[0].offset, 64);
        assert_eq!(root.stream_headers[1].name, "#Strings");
        assert_eq!(root.stream_headers[1].size, 16);
    }

    #[test]
    fn bad_signature() {
        let mut data = crafted_root();
        data[0] = 0x00;

        assert!(Root::read(&data).is_err());
    }

    #[test]
    fn stream_past_data() {
        let mut data = crafted_root();
        data.truncate(100);

        assert!(Root::read(&data).is_err());
    }

    #[test]
    fn too_short() {
        assert!(matches!(Root::read(&[0x42, 0x53, 0x4A, 0x42]), Err(OutOfBounds)));
    }
}
