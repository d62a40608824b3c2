//! The records exchanged with the generator and returned by queries.

use crate::strings::Identifier;

/// The file name, line and column associated with a bytecode address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DebugSourceLocation {
    /// The bytecode offset, relative to the start of the owning function.
    pub address: u32,
    /// The index into the filename table.
    pub filename_id: u32,
    /// The `sourceMappingURL` of the file, as an index into the filename table.
    pub source_mapping_url_id: Option<u32>,
    /// The line, 1-based.
    pub line: u32,
    /// The column, 1-based.
    pub column: u32,
    /// The statement at this location, 1-based per function.
    ///
    /// `0` marks instructions that are not part of any user-written statement.
    pub statement: u32,
}

impl DebugSourceLocation {
    /// Creates a location without a `sourceMappingURL`.
    pub fn new(address: u32, filename_id: u32, line: u32, column: u32, statement: u32) -> Self {
        Self {
            address,
            filename_id,
            source_mapping_url_id: None,
            line,
            column,
            statement,
        }
    }
}

/// A textual name for the callee operand of the call instruction at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugTextifiedCallee {
    /// The bytecode offset of the call, relative to the start of the owning function.
    pub address: u32,
    /// The name shown for the callee.
    pub textified_callee: Identifier,
}

/// The offsets of one function's data in the debug info sections.
///
/// These are stored by the caller, typically in the bytecode function header, and are the entry
/// points for every later query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugOffsets {
    /// Offset into the source locations section.
    pub source_locations: u32,
    /// Offset into the lexical data section.
    pub lexical_data: u32,
    /// Offset into the textified callee section.
    pub textified_callees: u32,
}

impl DebugOffsets {
    /// Marks a function that produced no data for a section.
    pub const NO_OFFSET: u32 = u32::MAX;

    /// Creates a new set of offsets.
    pub fn new(source_locations: u32, lexical_data: u32, textified_callees: u32) -> Self {
        Self {
            source_locations,
            lexical_data,
            textified_callees,
        }
    }
}

impl Default for DebugOffsets {
    fn default() -> Self {
        Self::new(Self::NO_OFFSET, Self::NO_OFFSET, Self::NO_OFFSET)
    }
}

/// The result of searching a bytecode address for a source location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DebugSearchResult {
    /// The index of the function containing the instruction.
    pub function_index: u32,
    /// The offset of the instruction, relative to the start of its function.
    pub bytecode_offset: u32,
    /// The line that was found.
    pub line: u32,
    /// The column that was found.
    pub column: u32,
}

impl DebugSearchResult {
    /// Creates a new search result.
    pub fn new(function_index: u32, bytecode_offset: u32, line: u32, column: u32) -> Self {
        Self {
            function_index,
            bytecode_offset,
            line,
            column,
        }
    }
}

/// Attributes a span of the source locations section to a file.
///
/// The span starts at `from_address` and extends to the start of the next region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugFileRegion {
    /// The offset into the source locations section where this region starts.
    pub from_address: u32,
    /// The index into the filename table.
    pub filename_id: u32,
    /// The `sourceMappingURL` index into the filename table, if any.
    pub source_mapping_url_id: Option<u32>,
}
