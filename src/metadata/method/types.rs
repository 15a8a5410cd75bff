//! Flags and constants for CIL method bodies.
//!
//! This module defines the bitflags used when decoding method headers, method data
//! sections and exception handling clauses, per ECMA-335 II.25.4.

use bitflags::bitflags;

bitflags! {
    /// Flags of the method body header (low 12 bits of the fat header's first word).
    ///
    /// The low two bits of the first header byte select the header format; the
    /// remaining flag bits only exist in the fat format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodBodyFlags: u16 {
        /// The method is encoded with a tiny header (the whole header is one byte)
        const TINY_FORMAT = 0x2;
        /// The method is encoded with a fat header (12 bytes)
        const FAT_FORMAT = 0x3;
        /// More sections (exception handling data) follow the IL bytes
        const MORE_SECTS = 0x8;
        /// Call the default constructor on all local variables
        const INIT_LOCALS = 0x10;
    }
}

bitflags! {
    /// Flags of one method data section header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u8 {
        /// The section holds an exception handling table
        const EHTABLE = 0x1;
        /// Reserved: the section holds an optimized IL table
        const OPT_ILTABLE = 0x2;
        /// The section uses the fat format (3-byte size, 24-byte clauses)
        const FAT_FORMAT = 0x40;
        /// Another section follows this one
        const MORE_SECTS = 0x80;
    }
}

bitflags! {
    /// Exception handler flags defining the type of exception handling clause.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExceptionHandlerFlags: u16 {
        /// A typed exception clause; the class token field names the caught type
        const EXCEPTION = 0x0000;
        /// An exception filter clause; the filter offset field locates the filter code
        const FILTER = 0x0001;
        /// A finally clause, executed on every exit of the protected region
        const FINALLY = 0x0002;
        /// A fault clause, executed only when an exception is thrown
        const FAULT = 0x0004;
    }
}

/// Exception handler defining one try/handler region within a method.
///
/// Each handler specifies the protected region (try block) and the handling code
/// location, in byte offsets relative to the start of the IL code.
///
/// # Layout in IL
///
/// ```text
/// try {
///     // try_offset .. try_offset + try_length
/// }
/// catch (ExceptionType) {
///     // handler_offset .. handler_offset + handler_length
/// }
/// ```
///
/// # References
/// - ECMA-335 6th Edition, Partition II, Section 25.4.6 - Exception Handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Flags describing the type of exception handler (catch, filter, finally, fault)
    pub flags: ExceptionHandlerFlags,
    /// Offset in bytes of the try block from the start of the IL code
    pub try_offset: u32,
    /// Length in bytes of the try block
    pub try_length: u32,
    /// Offset in bytes of the handler from the start of the IL code
    pub handler_offset: u32,
    /// Length in bytes of the handler code
    pub handler_length: u32,
    /// Metadata token of the caught exception type, or the filter code offset,
    /// depending on `flags`
    pub class_token_or_filter: u32,
}
