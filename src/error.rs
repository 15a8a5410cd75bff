use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Each variant corresponds to one failure class of metadata decoding. Decoding is lazy, so
/// errors surface at first use of the malformed element; a bad reference fails only that
/// lookup and does not prevent decoding of unrelated rows or heap entries.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::Malformed`] - Corrupted or invalid stream, table or method body structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond stream, heap or table boundaries
/// - [`Error::NotSupported`] - Table kinds or stream layouts this library does not decode
///
/// ## Reference Errors
/// - [`Error::NullReference`] - Dereferencing a null (0-valued) simple or coded index
///
/// ## I/O Errors
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use cilmeta::{Error, MetadataView};
///
/// match MetadataView::from_slice(&[0xCC; 16]) {
///     Ok(view) => println!("{} streams", view.root().stream_headers.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed metadata: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata is damaged and could not be parsed.
    ///
    /// Covers invalid compressed-length patterns, unknown stream names, coded-index
    /// tags without a family member, unrecognized tiny/fat method header bits and
    /// non-exception-table method data sections. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding.
    ///
    /// Raised for row and column indexes past a table's bounds, heap offsets past
    /// a heap's declared size, and stream spans that exceed the underlying data.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This metadata layout is not supported.
    ///
    /// Raised when the presence bitmask declares tables outside the ordinal range
    /// this library maps (e.g. Portable-PDB debug tables).
    #[error("This metadata layout is not supported")]
    NotSupported,

    /// A null simple or coded index was dereferenced.
    ///
    /// Reference columns use 0 as the null sentinel; resolving such a cell to a
    /// row is an error rather than a silent default.
    #[error("Dereferenced a null metadata reference")]
    NullReference,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while memory-mapping metadata
    /// dumps from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
