//! Errors raised when parsing a serialized debug info section.

use thiserror::Error;

/// An error parsing a serialized debug info section.
///
/// Queries on a [`DebugInfo`](crate::DebugInfo) never fail: absent data is reported as `None`,
/// and contract violations by the caller panic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The buffer is too small to hold the header.
    #[error("header is too small")]
    HeaderTooSmall,
    /// The self-advertised size of the section does not match the buffer.
    #[error("incorrect buffer length: expected {expected} bytes, found {found}")]
    BadFormatLength {
        /// The size computed from the header.
        expected: usize,
        /// The size of the buffer.
        found: usize,
    },
    /// The section boundaries of the debug data are out of order or out of bounds.
    #[error("debug data sections out of order")]
    InvalidSectionOffsets,
    /// A filename entry points outside of the filename storage, or not at a UTF-8 boundary.
    #[error("filename entry {0} out of bounds")]
    InvalidFilenameEntry(u32),
    /// The filename storage is invalid UTF-8.
    #[error("filename storage contains invalid UTF-8")]
    InvalidFilenameData(#[source] std::str::Utf8Error),
    /// A file region refers to a filename that does not exist.
    #[error("file region {0} refers to an unknown filename")]
    InvalidFileRegion(u32),
}
