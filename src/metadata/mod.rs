//! ECMA-335 metadata decoding.
//!
//! Everything under this module decodes the physical metadata format: the root header
//! and stream directory ([`root`]), the heaps and the table stream ([`streams`]), the
//! schema-driven table machinery ([`tables`]), method bodies ([`method`]) and the
//! wired-together entry points ([`view`]).
//!
//! Decoding is lazy throughout. Constructing a view parses directories and headers
//! only; rows, heap entries and method bodies materialize on first access and errors
//! surface at that point, never earlier and never silently.

pub mod method;
pub mod root;
pub mod streams;
pub mod tables;
pub mod token;
pub mod view;
