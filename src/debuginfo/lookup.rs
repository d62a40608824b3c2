use std::convert::TryFrom;

use super::DebugInfo;
use crate::generator::END_OF_FUNCTION;
use crate::leb128::Reader;
use crate::strings::decode_string;
use crate::types::{DebugOffsets, DebugSearchResult, DebugSourceLocation};

impl DebugInfo {
    /// Looks up the source location of the instruction at `offset_in_function`, given the
    /// function's source locations offset.
    ///
    /// This is the last location whose address does not exceed `offset_in_function`, or `None`
    /// if the function's first location comes after it.
    pub fn get_location_for_address(
        &self,
        debug_offset: u32,
        offset_in_function: u32,
    ) -> Option<DebugSourceLocation> {
        let mut found = None;
        for location in self.source_locations(debug_offset)? {
            if location.address > offset_in_function {
                break;
            }
            found = Some(location);
        }
        found
    }

    /// Finds the first bytecode address at which `target_line` of file `filename_id` is listed.
    ///
    /// With a `target_column`, only a location with exactly that column matches. Otherwise the
    /// first location on the line matches regardless of its column. Matches are ordered by
    /// function index, then by address.
    ///
    /// This scans the source locations of every function.
    pub fn get_address_for_location(
        &self,
        filename_id: u32,
        target_line: u32,
        target_column: Option<u32>,
    ) -> Option<DebugSearchResult> {
        let mut found: Option<DebugSearchResult> = None;
        for function in self.functions() {
            let function_index = function.function_index();
            if found.map_or(false, |f| f.function_index <= function_index) {
                continue;
            }
            let mut locations = function;
            // addresses are non-decreasing, so the first match is the lowest one
            let matched = locations.find(|location| {
                location.filename_id == filename_id
                    && location.line == target_line
                    && target_column.map_or(true, |column| column == location.column)
            });
            if let Some(location) = matched {
                found = Some(DebugSearchResult::new(
                    function_index,
                    location.address,
                    location.line,
                    location.column,
                ));
            }
        }
        found
    }

    /// Looks up the textified name of the callee of the call at `offset_in_function`, given the
    /// function's textified callee offset.
    ///
    /// This is the name of the last entry whose address does not exceed `offset_in_function`.
    pub fn get_textified_callee_utf8(
        &self,
        debug_offset: u32,
        offset_in_function: u32,
    ) -> Option<&str> {
        let string_offset = self
            .textified_callees(debug_offset)?
            .0
            .into_iter()
            .take_while(|(address, _)| *address <= offset_in_function)
            .last()?
            .1;
        decode_string(self.string_table_data(), string_offset)
    }

    /// The names of the variables of the lexical entry at `offset`.
    pub fn get_variable_names(&self, offset: u32) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some((_, count, mut reader)) = self.lexical_entry(offset) {
            for _ in 0..count {
                match reader
                    .read_u32()
                    .and_then(|string_offset| decode_string(self.string_table_data(), string_offset))
                {
                    Some(name) => names.push(name),
                    None => break,
                }
            }
        }
        names
    }

    /// The lexical parent function of the lexical entry at `offset`.
    pub fn get_parent_function_id(&self, offset: u32) -> Option<u32> {
        self.lexical_entry(offset)?.0
    }

    /// The id of the file owning the source locations at `debug_offset`, according to the file
    /// regions.
    pub fn get_filename_for_address(&self, debug_offset: u32) -> Option<u32> {
        if debug_offset >= self.lexical_data_offset {
            return None;
        }
        let idx = match self
            .files
            .binary_search_by_key(&debug_offset, |region| region.from_address)
        {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        Some(self.files[idx].filename_id)
    }

    /// An iterator over the source locations of the function whose stream starts at
    /// `debug_offset`.
    ///
    /// Returns `None` for [`DebugOffsets::NO_OFFSET`].
    ///
    /// # Panics
    ///
    /// Panics if `debug_offset` lies outside of the source locations section.
    pub fn source_locations(&self, debug_offset: u32) -> Option<SourceLocationIter<'_>> {
        if debug_offset == DebugOffsets::NO_OFFSET {
            return None;
        }
        let data = self.source_locations_data();
        assert!(
            (debug_offset as usize) < data.len(),
            "source locations offset {:#x} out of range",
            debug_offset
        );
        SourceLocationIter::new(data, debug_offset as usize)
    }

    /// An iterator over the source location streams of all functions, in emission order.
    pub fn functions(&self) -> FunctionIter<'_> {
        FunctionIter {
            data: self.source_locations_data(),
            offset: Some(0),
        }
    }

    /// Decodes the lexical entry at `offset` up to its names.
    pub(super) fn lexical_entry(&self, offset: u32) -> Option<(Option<u32>, u32, Reader<'_>)> {
        if offset == DebugOffsets::NO_OFFSET {
            return None;
        }
        let data = self.lexical_data();
        assert!(
            (offset as usize) < data.len(),
            "lexical data offset {:#x} out of range",
            offset
        );
        let mut reader = Reader::new(data, offset as usize);
        let parent = reader.read_optional()?;
        let count = reader.read_u32()?;
        Some((parent, count, reader))
    }

    /// Decodes the textified callee table at `offset` into `(address, string offset)` pairs,
    /// along with the offset right behind the table.
    pub(super) fn textified_callees(&self, offset: u32) -> Option<(Vec<(u32, u32)>, usize)> {
        if offset == DebugOffsets::NO_OFFSET {
            return None;
        }
        let data = self.textified_callee_data();
        assert!(
            (offset as usize) < data.len(),
            "textified callee offset {:#x} out of range",
            offset
        );
        let mut reader = Reader::new(data, offset as usize);
        let count = reader.read_u32()?;
        let mut entries = Vec::new();
        let mut address = 0u32;
        for _ in 0..count {
            address = address.checked_add(reader.read_u32()?)?;
            entries.push((address, reader.read_u32()?));
        }
        Some((entries, reader.pos()))
    }
}

/// Applies a decoded delta to `value`.
fn apply_delta(value: u32, delta: i64) -> Option<u32> {
    i64::from(value)
        .checked_add(delta)
        .and_then(|v| u32::try_from(v).ok())
}

/// An iterator over the decoded source locations of one function.
///
/// The first item is the function's baseline location. Iteration stops at the end of the
/// function's stream, or early if the stream is malformed.
#[derive(Debug, Clone)]
pub struct SourceLocationIter<'data> {
    reader: Reader<'data>,
    function_index: u32,
    baseline: Option<DebugSourceLocation>,
    current: DebugSourceLocation,
    end_offset: Option<usize>,
    failed: bool,
}

impl<'data> SourceLocationIter<'data> {
    fn new(data: &'data [u8], offset: usize) -> Option<Self> {
        let mut reader = Reader::new(data, offset);
        let function_index = reader.read_u32()?;
        let baseline = DebugSourceLocation {
            address: reader.read_u32()?,
            filename_id: reader.read_u32()?,
            source_mapping_url_id: reader.read_optional()?,
            line: reader.read_u32()?,
            column: reader.read_u32()?,
            statement: reader.read_u32()?,
        };
        Some(Self {
            reader,
            function_index,
            baseline: Some(baseline),
            current: baseline,
            end_offset: None,
            failed: false,
        })
    }

    /// The index of the function these locations belong to.
    pub fn function_index(&self) -> u32 {
        self.function_index
    }

    /// The offset right behind this function's stream, once iteration reached its end.
    pub fn end_offset(&self) -> Option<usize> {
        self.end_offset
    }

    fn read_next(&mut self) -> Option<DebugSourceLocation> {
        let reader = &mut self.reader;
        let address_delta = reader.read_sleb128()?;
        if address_delta == END_OF_FUNCTION {
            self.end_offset = Some(reader.pos());
            return None;
        }
        let filename_delta = reader.read_sleb128()?;
        let source_mapping_url_id = if filename_delta & 1 != 0 {
            reader.read_optional()?
        } else {
            self.current.source_mapping_url_id
        };
        let line_delta = reader.read_sleb128()?;
        let column_delta = reader.read_sleb128()?;
        let statement_delta = if line_delta & 1 != 0 {
            reader.read_sleb128()?
        } else {
            0
        };

        let current = &self.current;
        Some(DebugSourceLocation {
            address: apply_delta(current.address, address_delta)?,
            filename_id: apply_delta(current.filename_id, filename_delta >> 1)?,
            source_mapping_url_id,
            line: apply_delta(current.line, line_delta >> 1)?,
            column: apply_delta(current.column, column_delta)?,
            statement: apply_delta(current.statement, statement_delta)?,
        })
    }
}

impl Iterator for SourceLocationIter<'_> {
    type Item = DebugSourceLocation;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(baseline) = self.baseline.take() {
            return Some(baseline);
        }
        if self.end_offset.is_some() || self.failed {
            return None;
        }
        match self.read_next() {
            Some(location) => {
                self.current = location;
                Some(location)
            }
            None => {
                self.failed = self.end_offset.is_none();
                None
            }
        }
    }
}

/// An iterator over the source location streams of all functions, see
/// [`DebugInfo::functions`].
#[derive(Debug, Clone)]
pub struct FunctionIter<'data> {
    data: &'data [u8],
    offset: Option<usize>,
}

impl<'data> Iterator for FunctionIter<'data> {
    type Item = SourceLocationIter<'data>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset.filter(|offset| *offset < self.data.len())?;
        let function = match SourceLocationIter::new(self.data, offset) {
            Some(function) => function,
            None => {
                self.offset = None;
                return None;
            }
        };

        let mut rest = function.clone();
        let _ = rest.by_ref().count();
        self.offset = rest.end_offset();
        Some(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::{FilenameTable, Identifier};
    use crate::types::DebugTextifiedCallee;
    use crate::DebugInfoGenerator;

    fn loc(address: u32, filename_id: u32, line: u32, column: u32, statement: u32) -> DebugSourceLocation {
        DebugSourceLocation::new(address, filename_id, line, column, statement)
    }

    fn generator() -> DebugInfoGenerator {
        let mut filenames = FilenameTable::new();
        filenames.add_filename("a.js");
        filenames.add_filename("b.js");
        DebugInfoGenerator::new(filenames)
    }

    #[test]
    fn forward_lookup() {
        let mut gen = generator();
        let offset = gen.append_source_locations(
            &loc(0, 1, 1, 1, 1),
            0,
            &[loc(10, 1, 2, 5, 2), loc(25, 1, 2, 9, 2)],
        );
        let info = gen.serialize_with_move();

        assert_eq!(info.get_location_for_address(offset, 15), Some(loc(10, 1, 2, 5, 2)));
        assert_eq!(info.get_location_for_address(offset, 25), Some(loc(25, 1, 2, 9, 2)));
        assert_eq!(info.get_location_for_address(offset, 3), Some(loc(0, 1, 1, 1, 1)));
        assert_eq!(info.get_location_for_address(offset, 1000), Some(loc(25, 1, 2, 9, 2)));
        assert_eq!(
            info.get_address_for_location(1, 2, Some(9)),
            Some(DebugSearchResult::new(0, 25, 2, 9))
        );
    }

    #[test]
    fn address_before_first_location() {
        let mut gen = generator();
        let offset = gen.append_source_locations(&loc(4, 0, 1, 1, 0), 0, &[loc(8, 0, 2, 1, 1)]);
        let info = gen.serialize_with_move();

        assert_eq!(info.get_location_for_address(offset, 3), None);
        assert_eq!(info.get_location_for_address(offset, 4), Some(loc(4, 0, 1, 1, 0)));
        assert_eq!(info.get_location_for_address(DebugOffsets::NO_OFFSET, 4), None);
    }

    #[test]
    fn decodes_negative_deltas_and_urls() {
        let mut gen = generator();
        let mut with_url = loc(6, 1, 3, 2, 1);
        with_url.source_mapping_url_id = Some(0);
        let offset = gen.append_source_locations(
            &loc(0, 0, 10, 40, 3),
            7,
            &[loc(2, 0, 9, 1, 0), with_url, loc(6, 0, 3, 2, 1)],
        );
        let info = gen.serialize_with_move();

        let iter = info.source_locations(offset).unwrap();
        assert_eq!(iter.function_index(), 7);
        assert_eq!(
            iter.collect::<Vec<_>>(),
            [
                loc(0, 0, 10, 40, 3),
                loc(2, 0, 9, 1, 0),
                with_url,
                loc(6, 0, 3, 2, 1),
            ]
        );
    }

    #[test]
    fn reverse_lookup_prefers_lowest_function_index() {
        let mut gen = generator();
        gen.append_source_locations(&loc(0, 0, 1, 1, 0), 3, &[loc(2, 0, 5, 7, 1)]);
        gen.append_source_locations(&loc(0, 0, 4, 1, 0), 1, &[loc(4, 0, 5, 9, 1), loc(8, 0, 5, 7, 2)]);
        let info = gen.serialize_with_move();

        assert_eq!(
            info.get_address_for_location(0, 5, None),
            Some(DebugSearchResult::new(1, 4, 5, 9))
        );
        assert_eq!(
            info.get_address_for_location(0, 5, Some(7)),
            Some(DebugSearchResult::new(1, 8, 5, 7))
        );
        assert_eq!(info.get_address_for_location(0, 5, Some(8)), None);
        assert_eq!(info.get_address_for_location(1, 5, None), None);
    }

    #[test]
    fn functions_are_walked_in_emission_order() {
        let mut gen = generator();
        gen.append_source_locations(&loc(0, 0, 1, 1, 0), 2, &[loc(1, 0, 1, 2, 1)]);
        gen.append_source_locations(&loc(0, 1, 1, 1, 0), 0, &[]);
        gen.append_source_locations(&loc(0, 0, 1, 1, 0), 1, &[loc(3, 0, 2, 1, 1)]);
        let info = gen.serialize_with_move();

        let functions: Vec<_> = info
            .functions()
            .map(|f| (f.function_index(), f.count()))
            .collect();
        assert_eq!(functions, [(2, 2), (0, 1), (1, 2)]);
    }

    #[test]
    fn file_regions() {
        let mut gen = generator();
        let first = gen.append_source_locations(&loc(0, 0, 1, 1, 0), 0, &[]);
        let second = gen.append_source_locations(&loc(0, 1, 1, 1, 0), 1, &[]);
        let info = gen.serialize_with_move();

        assert_eq!(info.get_filename_for_address(first), Some(0));
        assert_eq!(info.get_filename_for_address(second), Some(1));
        assert_eq!(info.get_filename_for_address(second + 1), Some(1));
        assert_eq!(info.get_filename_for_address(info.lexical_data_offset()), None);
    }

    #[test]
    fn lexical_data() {
        let mut gen = generator();
        let (x, y) = (Identifier::new("x"), Identifier::new("y"));
        let common = gen.append_lexical_data(None, &[]);
        let nested = gen.append_lexical_data(Some(4), &[x.clone(), y]);
        let only_names = gen.append_lexical_data(None, &[x]);
        let info = gen.serialize_with_move();

        assert!(info.get_variable_names(common).is_empty());
        assert_eq!(info.get_parent_function_id(common), None);
        assert_eq!(info.get_variable_names(nested), ["x", "y"]);
        assert_eq!(info.get_parent_function_id(nested), Some(4));
        assert_eq!(info.get_variable_names(only_names), ["x"]);
        assert_eq!(info.get_parent_function_id(only_names), None);
        assert!(info.get_variable_names(DebugOffsets::NO_OFFSET).is_empty());
    }

    #[test]
    fn textified_callees() {
        let mut gen = generator();
        let empty = gen.append_textified_callee_data(&[]);
        let offset = gen.append_textified_callee_data(&[
            DebugTextifiedCallee {
                address: 4,
                textified_callee: Identifier::new("console.log"),
            },
            DebugTextifiedCallee {
                address: 12,
                textified_callee: Identifier::new("Math.max"),
            },
        ]);
        let info = gen.serialize_with_move();

        assert_eq!(info.get_textified_callee_utf8(empty, 4), None);
        assert_eq!(info.get_textified_callee_utf8(offset, 3), None);
        assert_eq!(info.get_textified_callee_utf8(offset, 4), Some("console.log"));
        assert_eq!(info.get_textified_callee_utf8(offset, 11), Some("console.log"));
        assert_eq!(info.get_textified_callee_utf8(offset, 12), Some("Math.max"));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn source_locations_offset_out_of_range() {
        let mut gen = generator();
        gen.append_source_locations(&loc(0, 0, 1, 1, 0), 0, &[]);
        let info = gen.serialize_with_move();
        info.get_location_for_address(info.lexical_data_offset(), 0);
    }

    #[test]
    fn truncated_stream_stops_early() {
        let data = [0, 0, 0, 0, 1, 1, 0, 4, 0];
        let locations: Vec<_> = SourceLocationIter::new(&data, 0).unwrap().collect();
        assert_eq!(locations, [loc(0, 0, 1, 1, 0)]);
    }
}
