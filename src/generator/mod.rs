//! Defines the [`DebugInfoGenerator`].

use std::convert::TryFrom;

mod locations;
mod serialize;

pub(crate) use locations::END_OF_FUNCTION;

use crate::leb128;
use crate::strings::{ConsecutiveStrings, FilenameTable, Identifier, StringTableBuilder};
use crate::types::{DebugFileRegion, DebugTextifiedCallee};

/// The offset of the most common entry in the lexical and textified callee sections.
///
/// In the lexical section it is the entry without a parent function and without variables, which
/// covers every function of a build without local variable info. In the textified callee
/// section it is the empty table.
pub const MOST_COMMON_ENTRY_OFFSET: u32 = 0;

/// The append-only builder of a [`DebugInfo`](crate::DebugInfo).
///
/// A generator is fed once per compilation unit, in function emission order. Every append
/// returns an offset that the caller stores with the function, and which later serves as the
/// entry point for queries. [`serialize_with_move`](Self::serialize_with_move) consumes the
/// generator and yields the immutable [`DebugInfo`](crate::DebugInfo).
#[derive(Debug)]
pub struct DebugInfoGenerator {
    /// Serialized source location streams, one per function.
    sources_data: Vec<u8>,
    /// The finalized filename storage.
    filenames: ConsecutiveStrings,
    /// Regions of `sources_data` attributed to one file each.
    files: Vec<DebugFileRegion>,
    /// Serialized lexical entries.
    lexical_data: Vec<u8>,
    /// Serialized textified callee tables.
    textified_callees: Vec<u8>,
    /// The string table shared by the lexical and textified callee sections.
    strings: StringTableBuilder,
}

impl DebugInfoGenerator {
    /// Creates a generator for a module referencing the files in `filenames`.
    pub fn new(filenames: FilenameTable) -> Self {
        let mut lexical_data = Vec::new();
        // no parent, no variables
        leb128::write_optional(&mut lexical_data, None);
        leb128::write_uleb128(&mut lexical_data, 0);

        let mut textified_callees = Vec::new();
        leb128::write_uleb128(&mut textified_callees, 0);

        Self {
            sources_data: Vec::new(),
            filenames: ConsecutiveStrings::from(filenames),
            files: Vec::new(),
            lexical_data,
            textified_callees,
            strings: StringTableBuilder::new(),
        }
    }

    /// Appends the lexical data of a function: its lexical parent and the names of its variables.
    ///
    /// Returns the offset of the entry in the lexical section.
    pub fn append_lexical_data(
        &mut self,
        parent_function_index: Option<u32>,
        names: &[Identifier],
    ) -> u32 {
        if parent_function_index.is_none() && names.is_empty() {
            return MOST_COMMON_ENTRY_OFFSET;
        }

        let start_offset = self.lexical_data.len() as u32;
        leb128::write_optional(&mut self.lexical_data, parent_function_index);
        leb128::write_uleb128(&mut self.lexical_data, names.len() as u64);
        for name in names {
            let offset = self.strings.intern(name);
            leb128::write_uleb128(&mut self.lexical_data, u64::from(offset));
        }

        log::trace!(
            "lexical entry at {:#x}: parent {:?}, {} names",
            start_offset,
            parent_function_index,
            names.len()
        );
        start_offset
    }

    /// Appends the textified callees of a function, ordered by address.
    ///
    /// Returns the offset of the table in the textified callee section.
    pub fn append_textified_callee_data(&mut self, textified_callees: &[DebugTextifiedCallee]) -> u32 {
        if textified_callees.is_empty() {
            return MOST_COMMON_ENTRY_OFFSET;
        }

        let start_offset = self.textified_callees.len() as u32;
        leb128::write_uleb128(&mut self.textified_callees, textified_callees.len() as u64);
        let mut previous_address = 0;
        for callee in textified_callees {
            assert!(
                callee.address >= previous_address,
                "textified callees must be appended in address order"
            );
            let offset = self.strings.intern(&callee.textified_callee);
            leb128::write_uleb128(
                &mut self.textified_callees,
                u64::from(callee.address - previous_address),
            );
            leb128::write_uleb128(&mut self.textified_callees, u64::from(offset));
            previous_address = callee.address;
        }

        log::trace!(
            "textified callee table at {:#x}: {} entries",
            start_offset,
            textified_callees.len()
        );
        start_offset
    }
}

/// The signed difference `to - from`, which must fit into 32 bits.
fn delta(to: u32, from: u32) -> i64 {
    let diff = i64::from(to) - i64::from(from);
    // lines or columns jumping by more than 2^31 would need a wider encoding
    assert!(
        i32::try_from(diff).is_ok(),
        "delta from {} to {} too large when encoding debug info",
        from,
        to
    );
    diff
}
