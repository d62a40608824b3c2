//! Replays the source locations into a source map.

use super::DebugInfo;

/// One mapping from an absolute bytecode offset to a source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceMapping {
    /// The segment the bytecode belongs to.
    pub segment_id: u32,
    /// The offset of the instruction in the bytecode stream.
    pub generated_address: u32,
    /// The index into the filename table.
    pub filename_id: u32,
    /// The `sourceMappingURL` index into the filename table, if any.
    pub source_mapping_url_id: Option<u32>,
    /// The line, 1-based.
    pub line: u32,
    /// The column, 1-based.
    pub column: u32,
}

/// Receives the mappings produced by [`DebugInfo::populate_source_map`].
///
/// This is implemented for every `FnMut(SourceMapping)`.
pub trait SourceMapSink {
    /// Adds a single mapping.
    fn add_mapping(&mut self, mapping: SourceMapping);
}

impl<F: FnMut(SourceMapping)> SourceMapSink for F {
    fn add_mapping(&mut self, mapping: SourceMapping) {
        self(mapping)
    }
}

impl DebugInfo {
    /// Feeds every source location of every function to `sink`.
    ///
    /// `function_offsets` maps each function index to the function's start in the bytecode
    /// stream; it is added to each location's address.
    ///
    /// # Panics
    ///
    /// Panics if a function index has no entry in `function_offsets`.
    pub fn populate_source_map<S: SourceMapSink>(
        &self,
        mut sink: S,
        function_offsets: &[u32],
        segment_id: u32,
    ) {
        for function in self.functions() {
            let function_index = function.function_index();
            let function_offset = match function_offsets.get(function_index as usize) {
                Some(offset) => *offset,
                None => panic!("no bytecode offset for function {}", function_index),
            };
            for location in function {
                sink.add_mapping(SourceMapping {
                    segment_id,
                    generated_address: function_offset + location.address,
                    filename_id: location.filename_id,
                    source_mapping_url_id: location.source_mapping_url_id,
                    line: location.line,
                    column: location.column,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::FilenameTable;
    use crate::types::DebugSourceLocation;
    use crate::DebugInfoGenerator;

    fn info() -> DebugInfo {
        let mut filenames = FilenameTable::new();
        filenames.add_filename("bundle.js");
        let mut gen = DebugInfoGenerator::new(filenames);
        gen.append_source_locations(
            &DebugSourceLocation::new(0, 0, 3, 1, 0),
            1,
            &[DebugSourceLocation::new(5, 0, 4, 3, 1)],
        );
        gen.append_source_locations(&DebugSourceLocation::new(2, 0, 1, 1, 0), 0, &[]);
        gen.serialize_with_move()
    }

    #[test]
    fn replays_absolute_addresses() {
        let mut mappings = Vec::new();
        info().populate_source_map(|m| mappings.push(m), &[100, 200], 7);

        let simplified: Vec<_> = mappings
            .iter()
            .map(|m| (m.segment_id, m.generated_address, m.line, m.column))
            .collect();
        assert_eq!(simplified, [(7, 200, 3, 1), (7, 205, 4, 3), (7, 102, 1, 1)]);
    }

    #[test]
    #[should_panic(expected = "no bytecode offset")]
    fn missing_function_offset() {
        info().populate_source_map(|_| {}, &[100], 0);
    }
}
