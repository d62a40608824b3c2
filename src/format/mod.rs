//! The fixed binary layout of a serialized debug info section.

pub mod raw;
