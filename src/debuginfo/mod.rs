//! The read-only [`DebugInfo`] and its queries.

mod disassemble;
mod lookup;
mod serialize;
mod source_map;

use crate::strings::{ConsecutiveStrings, StringTableEntry};
use crate::types::DebugFileRegion;

pub use lookup::{FunctionIter, SourceLocationIter};
pub use source_map::{SourceMapSink, SourceMapping};

/// Finalized debug info of a compiled module.
///
/// All data lives in a single buffer partitioned into four sections:
///
/// ```text
/// [source locations][lexical data][textified callees][string table]
///                   ^             ^                  ^ string_table_offset
///                   |             ^ textified_callee_offset
///                   ^ lexical_data_offset
/// ```
///
/// Offsets handed out by the [`DebugInfoGenerator`](crate::DebugInfoGenerator) are relative to
/// the start of their section. A `DebugInfo` is never mutated, and can be shared freely between
/// threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    filenames: ConsecutiveStrings,
    files: Vec<DebugFileRegion>,
    lexical_data_offset: u32,
    textified_callee_offset: u32,
    string_table_offset: u32,
    data: Vec<u8>,
}

impl DebugInfo {
    /// Assembles debug info from its parts.
    ///
    /// # Panics
    ///
    /// Panics unless `lexical_data_offset <= textified_callee_offset <= string_table_offset <=
    /// data.len()`.
    pub fn new(
        filenames: ConsecutiveStrings,
        files: Vec<DebugFileRegion>,
        lexical_data_offset: u32,
        textified_callee_offset: u32,
        string_table_offset: u32,
        data: Vec<u8>,
    ) -> Self {
        assert!(
            lexical_data_offset <= textified_callee_offset
                && textified_callee_offset <= string_table_offset
                && string_table_offset as usize <= data.len(),
            "debug info sections out of order"
        );
        Self {
            filenames,
            files,
            lexical_data_offset,
            textified_callee_offset,
            string_table_offset,
            data,
        }
    }

    /// The file regions of the source locations section.
    pub fn view_files(&self) -> &[DebugFileRegion] {
        &self.files
    }

    /// The complete data buffer.
    pub fn view_data(&self) -> &[u8] {
        &self.data
    }

    /// The filename table, locating each filename in [`filename_storage`](Self::filename_storage).
    pub fn filename_table(&self) -> &[StringTableEntry] {
        self.filenames.table()
    }

    /// The concatenated filenames.
    pub fn filename_storage(&self) -> &[u8] {
        self.filenames.storage().as_bytes()
    }

    /// The number of filenames.
    pub fn filename_count(&self) -> u32 {
        self.filenames.len() as u32
    }

    /// An iterator over all filenames, in id order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> + '_ {
        self.filenames.iter()
    }

    /// The filename with the given `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    pub fn get_filename_by_id(&self, id: u32) -> &str {
        match self.filenames.get(id) {
            Some(filename) => filename,
            None => panic!("filename id {} out of bounds", id),
        }
    }

    /// The start of the lexical data section.
    pub fn lexical_data_offset(&self) -> u32 {
        self.lexical_data_offset
    }

    /// The start of the textified callee section.
    pub fn textified_callee_offset(&self) -> u32 {
        self.textified_callee_offset
    }

    /// The start of the string table.
    pub fn string_table_offset(&self) -> u32 {
        self.string_table_offset
    }

    /// The size in bytes of the string table.
    pub fn get_string_table_size_bytes(&self) -> u32 {
        self.data.len() as u32 - self.string_table_offset
    }

    fn source_locations_data(&self) -> &[u8] {
        &self.data[..self.lexical_data_offset as usize]
    }

    fn lexical_data(&self) -> &[u8] {
        &self.data[self.lexical_data_offset as usize..self.textified_callee_offset as usize]
    }

    fn textified_callee_data(&self) -> &[u8] {
        &self.data[self.textified_callee_offset as usize..self.string_table_offset as usize]
    }

    fn string_table_data(&self) -> &[u8] {
        &self.data[self.string_table_offset as usize..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::FilenameTable;
    use crate::DebugInfoGenerator;

    fn empty_info() -> DebugInfo {
        let mut filenames = FilenameTable::new();
        filenames.add_filename("index.js");
        filenames.add_filename("lib/util.js");
        DebugInfoGenerator::new(filenames).serialize_with_move()
    }

    #[test]
    fn section_views() {
        let info = empty_info();
        assert!(info.source_locations_data().is_empty());
        assert_eq!(info.lexical_data(), [0, 0]);
        assert_eq!(info.textified_callee_data(), [0]);
        assert!(info.string_table_data().is_empty());
        assert_eq!(info.get_string_table_size_bytes(), 0);
    }

    #[test]
    fn filenames() {
        let info = empty_info();
        assert_eq!(info.filename_count(), 2);
        assert_eq!(info.get_filename_by_id(1), "lib/util.js");
        assert_eq!(info.filename_storage(), b"index.jslib/util.js");
        assert_eq!(
            info.filename_table(),
            [
                StringTableEntry {
                    offset: 0,
                    length: 8
                },
                StringTableEntry {
                    offset: 8,
                    length: 11
                },
            ]
        );
        assert_eq!(info.filenames().collect::<Vec<_>>(), ["index.js", "lib/util.js"]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn filename_out_of_bounds() {
        empty_info().get_filename_by_id(2);
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn rejects_unordered_sections() {
        DebugInfo::new(ConsecutiveStrings::default(), vec![], 2, 1, 3, vec![0; 4]);
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DebugInfo>();
    }
}
