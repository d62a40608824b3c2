use super::{delta, DebugInfoGenerator};
use crate::leb128;
use crate::types::{DebugFileRegion, DebugSourceLocation};

/// The address delta terminating a function's source location stream.
pub(crate) const END_OF_FUNCTION: i64 = -1;

impl DebugInfoGenerator {
    /// Appends the source locations of the function `function_index`.
    ///
    /// `start` is the baseline location of the function and is stored with absolute values; every
    /// entry of `locations` is stored as a delta to its predecessor. Addresses must be
    /// non-decreasing across `start` and `locations`.
    ///
    /// Returns the offset of the function's stream in the source locations section.
    pub fn append_source_locations(
        &mut self,
        start: &DebugSourceLocation,
        function_index: u32,
        locations: &[DebugSourceLocation],
    ) -> u32 {
        let start_offset = self.sources_data.len() as u32;
        self.update_file_region(start_offset, start);

        let data = &mut self.sources_data;
        leb128::write_uleb128(data, u64::from(function_index));
        leb128::write_uleb128(data, u64::from(start.address));
        leb128::write_uleb128(data, u64::from(start.filename_id));
        leb128::write_optional(data, start.source_mapping_url_id);
        leb128::write_uleb128(data, u64::from(start.line));
        leb128::write_uleb128(data, u64::from(start.column));
        leb128::write_uleb128(data, u64::from(start.statement));

        let mut previous = start;
        for next in locations {
            assert!(
                next.address >= previous.address,
                "source locations of function {} must be appended in address order",
                function_index
            );
            let record_offset = self.sources_data.len() as u32;
            self.update_file_region(record_offset, next);

            let url_changed = next.source_mapping_url_id != previous.source_mapping_url_id;
            let address_delta = delta(next.address, previous.address);
            let filename_delta = delta(next.filename_id, previous.filename_id);
            let line_delta = delta(next.line, previous.line);
            let column_delta = delta(next.column, previous.column);
            let statement_delta = delta(next.statement, previous.statement);

            // The low bits flag the optional fields that follow.
            let data = &mut self.sources_data;
            leb128::write_sleb128(data, address_delta);
            leb128::write_sleb128(data, filename_delta << 1 | i64::from(url_changed));
            if url_changed {
                leb128::write_optional(data, next.source_mapping_url_id);
            }
            leb128::write_sleb128(data, line_delta << 1 | i64::from(statement_delta != 0));
            leb128::write_sleb128(data, column_delta);
            if statement_delta != 0 {
                leb128::write_sleb128(data, statement_delta);
            }

            previous = next;
        }
        leb128::write_sleb128(&mut self.sources_data, END_OF_FUNCTION);

        log::trace!(
            "source locations of function {} at {:#x}: {} records",
            function_index,
            start_offset,
            locations.len() + 1
        );
        start_offset
    }

    /// Opens a new file region at `offset` if `location` is in a different file than the
    /// previous region.
    fn update_file_region(&mut self, offset: u32, location: &DebugSourceLocation) {
        let same_file = self.files.last().map_or(false, |region| {
            region.filename_id == location.filename_id
                && region.source_mapping_url_id == location.source_mapping_url_id
        });
        if !same_file {
            self.files.push(DebugFileRegion {
                from_address: offset,
                filename_id: location.filename_id,
                source_mapping_url_id: location.source_mapping_url_id,
            });
        }
    }
}
