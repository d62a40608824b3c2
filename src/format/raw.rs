//! Raw records of a serialized debug info section.
//!
//! All integers are little-endian `u32`s. The section is laid out as:
//!
//! - the [`Header`],
//! - `filename_count` [`StringTableEntry`](crate::strings::StringTableEntry)s as
//!   `(offset, length)` pairs,
//! - `filename_storage_size` bytes of filename storage, padded to a multiple of four,
//! - `file_region_count` [`FileRegion`]s,
//! - `debug_data_size` bytes of debug data.

/// The size of the [`Header`] in bytes.
pub const HEADER_SIZE: usize = 7 * 4;

/// The size of one filename table entry in bytes.
pub const FILENAME_ENTRY_SIZE: usize = 2 * 4;

/// The size of one [`FileRegion`] in bytes.
pub const FILE_REGION_SIZE: usize = 3 * 4;

/// Marks a file region without a `sourceMappingURL`.
pub const NO_SOURCE_MAPPING_URL: u32 = u32::MAX;

/// The header of a serialized debug info section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Number of filename table entries.
    pub filename_count: u32,
    /// Total number of bytes used for filename storage, without padding.
    pub filename_storage_size: u32,
    /// Number of file regions.
    pub file_region_count: u32,
    /// Start of the lexical data within the debug data.
    pub lexical_data_offset: u32,
    /// Start of the textified callee table within the debug data.
    pub textified_callee_offset: u32,
    /// Start of the string table within the debug data.
    pub string_table_offset: u32,
    /// Total number of bytes of debug data.
    pub debug_data_size: u32,
}

/// A serialized [`DebugFileRegion`](crate::DebugFileRegion).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileRegion {
    /// Offset into the source locations section.
    pub from_address: u32,
    /// Index into the filename table.
    pub filename_id: u32,
    /// Index into the filename table, or [`NO_SOURCE_MAPPING_URL`].
    pub source_mapping_url_id: u32,
}

/// Returns the amount of padding needed after `len` bytes to reach a multiple of four.
pub fn align_to_four(len: usize) -> usize {
    let rem = len % 4;
    if rem == 0 {
        0
    } else {
        4 - rem
    }
}
