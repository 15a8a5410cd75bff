//! CIL method body decoding.
//!
//! Types and logic for decoding method headers, IL byte ranges and exception handling
//! regions from the bytes at a method's RVA, as specified by ECMA-335 II.25.4. The IL
//! bytes themselves are exposed opaquely; instruction-level decoding is outside the
//! scope of this library.

mod body;
mod types;

pub use body::MethodBody;
pub use types::{ExceptionHandler, ExceptionHandlerFlags, MethodBodyFlags, SectionFlags};
