//! Decoding of CIL method bodies.
//!
//! A method body begins at the RVA stored in its `MethodDef` row (an RVA of 0 means the
//! method has no body). The low two bits of the first byte select the header format:
//! `10` is the tiny format, where that single byte is the whole header and carries the
//! code size; `11` is the fat format with a fixed 12-byte header. IL bytes follow the
//! header and are exposed as an opaque slice; exception handling sections, when present,
//! follow the IL bytes 4-byte aligned.
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format

use crate::{
    file::io::{read_le, read_le_at},
    metadata::method::{ExceptionHandler, ExceptionHandlerFlags, MethodBodyFlags, SectionFlags},
    Error::OutOfBounds,
    Result,
};

/// One decoded method body: header fields, IL bytes and exception clauses.
///
/// # Examples
///
/// ```rust
/// use cilmeta::MethodBody;
///
/// // Tiny format: 0x0A = (code size 2) << 2 | 0b10
/// let data = [0x0A, 0x16, 0x2A];
/// let body = MethodBody::from(&data)?;
///
/// assert!(!body.is_fat);
/// assert_eq!(body.code(), &[0x16, 0x2A]);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct MethodBody<'a> {
    /// The raw IL bytes of the method, without the header
    code: &'a [u8],
    /// Size of the method header in bytes
    pub size_header: usize,
    /// Metadata token of the local variable signature, 0 if the method has no locals
    pub local_var_sig_token: u32,
    /// Maximum number of items on the operand stack
    pub max_stack: usize,
    /// Flag indicating the fat header format
    pub is_fat: bool,
    /// Flag indicating that all local variables are zero-initialized
    pub is_init_local: bool,
    /// The exception handling clauses of this method
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl<'a> MethodBody<'a> {
    /// Create a `MethodBody` object from the bytes at a method's RVA.
    ///
    /// # Arguments
    /// * `data` - The byte slice starting at the method's RVA
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the first byte is neither a tiny nor a fat
    /// header, or an exception section is not an exception table, and
    /// [`crate::Error::OutOfBounds`] if the declared code or section sizes exceed the data.
    pub fn from(data: &'a [u8]) -> Result<MethodBody<'a>> {
        if data.is_empty() {
            return Err(malformed_error!("Provided data for body parsing is empty"));
        }

        let first_byte = read_le::<u8>(data)?;
        match MethodBodyFlags::from_bits_truncate(u16::from(first_byte & 0b_0000_0011_u8)) {
            MethodBodyFlags::TINY_FORMAT => {
                let size_code = (first_byte >> 2) as usize;
                if size_code + 1 > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBody {
                    code: &data[1..1 + size_code],
                    size_header: 1,
                    local_var_sig_token: 0,
                    max_stack: 0,
                    is_fat: false,
                    is_init_local: false,
                    exception_handlers: Vec::new(),
                })
            }
            MethodBodyFlags::FAT_FORMAT => {
                if data.len() < 12 {
                    return Err(OutOfBounds);
                }

                let first_duo = read_le::<u16>(data)?;

                let size_header = ((first_duo >> 12) * 4) as usize;
                let size_code = read_le::<u32>(&data[4..])? as usize;
                if size_header < 12 {
                    return Err(malformed_error!(
                        "Fat method header size below 12 - {}",
                        size_header
                    ));
                }
                if data.len() < size_code + size_header {
                    return Err(OutOfBounds);
                }

                let max_stack = read_le::<u16>(&data[2..])? as usize;
                let local_var_sig_token = read_le::<u32>(&data[8..])?;
                let flags_header =
                    MethodBodyFlags::from_bits_truncate(first_duo & 0b_0000_1111_1111_1111_u16);

                let exception_handlers = if flags_header.contains(MethodBodyFlags::MORE_SECTS) {
                    read_sections(data, size_header + size_code)?
                } else {
                    Vec::new()
                };

                Ok(MethodBody {
                    code: &data[size_header..size_header + size_code],
                    size_header,
                    local_var_sig_token,
                    max_stack,
                    is_fat: true,
                    is_init_local: flags_header.contains(MethodBodyFlags::INIT_LOCALS),
                    exception_handlers,
                })
            }
            _ => Err(malformed_error!(
                "MethodHeader is neither FAT nor TINY - {}",
                first_byte
            )),
        }
    }

    /// The raw IL bytes of the method, without the header.
    #[must_use]
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// Size of the IL code in bytes.
    #[must_use]
    pub fn size_code(&self) -> usize {
        self.code.len()
    }

    /// Get the full size of this method (header plus code).
    #[must_use]
    pub fn size(&self) -> usize {
        self.code.len() + self.size_header
    }

    /// Flag indicating whether this method has exception handlers.
    #[must_use]
    pub fn has_exception_handlers(&self) -> bool {
        !self.exception_handlers.is_empty()
    }
}

/// Decode the method data sections following the IL bytes (ECMA-335 II.25.4.5/6).
///
/// Sections start 4-byte aligned and chain through the `MORE_SECTS` flag. Only
/// exception handling tables are defined; any other section kind is an error.
fn read_sections(data: &[u8], end_of_code: usize) -> Result<Vec<ExceptionHandler>> {
    let mut exception_handlers = Vec::new();
    let mut cursor = end_of_code;

    loop {
        cursor = (cursor + 3) & !3;
        if cursor + 4 > data.len() {
            return Err(OutOfBounds);
        }

        let section_flags = SectionFlags::from_bits_truncate(read_le::<u8>(&data[cursor..])?);
        if !section_flags.contains(SectionFlags::EHTABLE) {
            return Err(malformed_error!(
                "Method data section is not an exception table - {:?}",
                section_flags
            ));
        }

        if section_flags.contains(SectionFlags::FAT_FORMAT) {
            let section_size = (read_le::<u32>(&data[cursor..])? >> 8) as usize;
            if section_size < 4 {
                return Err(malformed_error!(
                    "Method data section size below header size - {}",
                    section_size
                ));
            }
            if cursor + section_size > data.len() {
                return Err(OutOfBounds);
            }

            cursor += 4;
            for _ in 0..(section_size - 4) / 24 {
                // The clause flags field is 4 bytes on disk but only the low bits are defined
                #[allow(clippy::cast_possible_truncation)]
                let flags = ExceptionHandlerFlags::from_bits_truncate(read_le_at::<u32>(
                    data,
                    &mut cursor,
                )? as u16);

                exception_handlers.push(ExceptionHandler {
                    flags,
                    try_offset: read_le_at::<u32>(data, &mut cursor)?,
                    try_length: read_le_at::<u32>(data, &mut cursor)?,
                    handler_offset: read_le_at::<u32>(data, &mut cursor)?,
                    handler_length: read_le_at::<u32>(data, &mut cursor)?,
                    class_token_or_filter: read_le_at::<u32>(data, &mut cursor)?,
                });
            }
        } else {
            let section_size = usize::from(read_le::<u8>(&data[cursor + 1..])?);
            if section_size < 4 {
                return Err(malformed_error!(
                    "Method data section size below header size - {}",
                    section_size
                ));
            }
            if cursor + section_size > data.len() {
                return Err(OutOfBounds);
            }

            cursor += 4;
            for _ in 0..(section_size - 4) / 12 {
                exception_handlers.push(ExceptionHandler {
                    flags: ExceptionHandlerFlags::from_bits_truncate(read_le_at::<u16>(
                        data,
                        &mut cursor,
                    )?),
                    try_offset: u32::from(read_le_at::<u16>(data, &mut cursor)?),
                    try_length: u32::from(read_le_at::<u8>(data, &mut cursor)?),
                    handler_offset: u32::from(read_le_at::<u16>(data, &mut cursor)?),
                    handler_length: u32::from(read_le_at::<u8>(data, &mut cursor)?),
                    class_token_or_filter: read_le_at::<u32>(data, &mut cursor)?,
                });
            }
        }

        if !section_flags.contains(SectionFlags::MORE_SECTS) {
            return Ok(exception_handlers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny() {
        // 0x1A = (code size 6) << 2 | 0b10
        let data = [0x1A, 0x00, 0x2A, 0x16, 0x2A, 0x17, 0x2A];

        let body = MethodBody::from(&data).unwrap();

        assert!(!body.is_fat);
        assert!(!body.is_init_local);
        assert!(!body.has_exception_handlers());
        assert_eq!(body.max_stack, 0);
        assert_eq!(body.size_header, 1);
        assert_eq!(body.size_code(), 6);
        assert_eq!(body.size(), 7);
        assert_eq!(body.local_var_sig_token, 0);
        assert_eq!(body.code(), &data[1..7]);
    }

    #[test]
    fn tiny_empty() {
        // 0x02: low two bits 10, code size 0
        let data = [0x02];
        let body = MethodBody::from(&data).unwrap();

        assert!(!body.is_fat);
        assert_eq!(body.size_code(), 0);
        assert_eq!(body.code(), &[] as &[u8]);
    }

    #[test]
    fn tiny_truncated() {
        // Claims 6 code bytes, provides 2
        let data = [0x1A, 0x00, 0x2A];
        assert!(matches!(MethodBody::from(&data), Err(OutOfBounds)));
    }

    #[test]
    fn fat() {
        #[rustfmt::skip]
        let data = [
            /* flags | size << 12 */ 0x13, 0x30,
            /* max stack */          0x02, 0x00,
            /* code size */          0x04, 0x00, 0x00, 0x00,
            /* locals token */       0x01, 0x00, 0x00, 0x11,
            /* code */               0x00, 0x2A, 0x26, 0x2A,
        ];

        let body = MethodBody::from(&data).unwrap();

        assert!(body.is_fat);
        assert!(body.is_init_local);
        assert!(!body.has_exception_handlers());
        assert_eq!(body.max_stack, 2);
        assert_eq!(body.size_header, 12);
        assert_eq!(body.size_code(), 4);
        assert_eq!(body.size(), 16);
        assert_eq!(body.local_var_sig_token, 0x1100_0001);
        assert_eq!(body.code(), &[0x00, 0x2A, 0x26, 0x2A]);
    }

    #[test]
    fn fat_small_exception_section() {
        #[rustfmt::skip]
        let data = [
            /* flags | size << 12 */ 0x1B, 0x30,
            /* max stack */          0x01, 0x00,
            /* code size */          0x04, 0x00, 0x00, 0x00,
            /* locals token */       0x00, 0x00, 0x00, 0x00,
            /* code */               0x00, 0x00, 0x00, 0x2A,
            /* section header */     0x01, 0x10, 0x00, 0x00,
            /* clause: finally */    0x02, 0x00,
            /* try offset */         0x00, 0x00,
            /* try length */         0x02,
            /* handler offset */     0x02, 0x00,
            /* handler length */     0x02,
            /* class/filter */       0x00, 0x00, 0x00, 0x00,
        ];

        let body = MethodBody::from(&data).unwrap();

        assert!(body.is_fat);
        assert!(body.has_exception_handlers());
        assert_eq!(body.exception_handlers.len(), 1);

        let handler = &body.exception_handlers[0];
        assert!(handler.flags.contains(ExceptionHandlerFlags::FINALLY));
        assert_eq!(handler.try_offset, 0);
        assert_eq!(handler.try_length, 2);
        assert_eq!(handler.handler_offset, 2);
        assert_eq!(handler.handler_length, 2);
        assert_eq!(handler.class_token_or_filter, 0);
    }

    #[test]
    fn fat_fat_exception_section() {
        #[rustfmt::skip]
        let mut data = vec![
            /* flags | size << 12 */ 0x1B, 0x30,
            /* max stack */          0x01, 0x00,
            /* code size */          0x03, 0x00, 0x00, 0x00,
            /* locals token */       0x00, 0x00, 0x00, 0x00,
            /* code */               0x00, 0x00, 0x2A,
            /* align pad */          0xCC,
            /* section: fat EH, size 4 + 2*24 = 52 */
            0x41, 0x34, 0x00, 0x00,
        ];

        for clause in 0_u32..2 {
            data.extend_from_slice(&0_u32.to_le_bytes()); // flags: exception
            data.extend_from_slice(&(clause * 8).to_le_bytes()); // try offset
            data.extend_from_slice(&4_u32.to_le_bytes()); // try length
            data.extend_from_slice(&(clause * 8 + 4).to_le_bytes()); // handler offset
            data.extend_from_slice(&4_u32.to_le_bytes()); // handler length
            data.extend_from_slice(&0x0100_0010_u32.to_le_bytes()); // class token
        }

        let body = MethodBody::from(&data).unwrap();

        assert_eq!(body.exception_handlers.len(), 2);
        assert!(body.exception_handlers[0]
            .flags
            .contains(ExceptionHandlerFlags::EXCEPTION));
        assert_eq!(body.exception_handlers[0].try_offset, 0);
        assert_eq!(body.exception_handlers[1].try_offset, 8);
        assert_eq!(body.exception_handlers[1].handler_offset, 12);
        assert_eq!(body.exception_handlers[1].class_token_or_filter, 0x0100_0010);
    }

    #[test]
    fn chained_sections() {
        #[rustfmt::skip]
        let data = [
            /* flags | size << 12 */ 0x1B, 0x30,
            /* max stack */          0x01, 0x00,
            /* code size */          0x04, 0x00, 0x00, 0x00,
            /* locals token */       0x00, 0x00, 0x00, 0x00,
            /* code */               0x00, 0x00, 0x00, 0x2A,
            /* section 1: EH | MORE_SECTS */
            0x81, 0x10, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, 0x02, 0x02, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00,
            /* section 2: EH */
            0x01, 0x10, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x04, 0x04, 0x00, 0x04, 0x10, 0x00, 0x00, 0x01,
        ];

        let body = MethodBody::from(&data).unwrap();

        assert_eq!(body.exception_handlers.len(), 2);
        assert!(body.exception_handlers[0]
            .flags
            .contains(ExceptionHandlerFlags::FINALLY));
        assert!(body.exception_handlers[1]
            .flags
            .contains(ExceptionHandlerFlags::EXCEPTION));
        assert_eq!(body.exception_handlers[1].class_token_or_filter, 0x0100_0010);
    }

    #[test]
    fn non_ehtable_section_rejected() {
        #[rustfmt::skip]
        let data = [
            0x1B, 0x30,
            0x01, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x2A,
            /* section kind: OPT_ILTABLE */
            0x02, 0x10, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        assert!(matches!(
            MethodBody::from(&data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn invalid_header_bits() {
        // Low two bits 00 and 01 are neither tiny nor fat
        assert!(MethodBody::from(&[0x00, 0x00]).is_err());
        assert!(MethodBody::from(&[0x01, 0x00]).is_err());
        assert!(MethodBody::from(&[]).is_err());
    }

    #[test]
    fn fat_truncated_code() {
        #[rustfmt::skip]
        let data = [
            0x13, 0x30,
            0x01, 0x00,
            0x20, 0x00, 0x00, 0x00, // claims 32 code bytes
            0x00, 0x00, 0x00, 0x00,
            0x2A,
        ];

        assert!(matches!(MethodBody::from(&data), Err(OutOfBounds)));
    }

    #[test]
    fn fat_truncated_section() {
        #[rustfmt::skip]
        let data = [
            0x1B, 0x30,
            0x01, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x2A,
            /* section claims 16 bytes, 4 present */
            0x01, 0x10, 0x00, 0x00,
        ];

        assert!(matches!(MethodBody::from(&data), Err(OutOfBounds)));
    }
}
