use super::DebugInfoGenerator;
use crate::DebugInfo;

impl DebugInfoGenerator {
    /// Finalizes the generator into an immutable [`DebugInfo`].
    ///
    /// The sections are concatenated into one buffer as
    /// `[source locations][lexical data][textified callees][string table]`.
    pub fn serialize_with_move(self) -> DebugInfo {
        let Self {
            sources_data,
            filenames,
            files,
            lexical_data,
            textified_callees,
            strings,
        } = self;

        let lexical_data_offset = sources_data.len() as u32;
        let textified_callee_offset = lexical_data_offset + lexical_data.len() as u32;
        let string_table_offset = textified_callee_offset + textified_callees.len() as u32;

        let mut data = sources_data;
        data.reserve(lexical_data.len() + textified_callees.len() + strings.len());
        data.extend_from_slice(&lexical_data);
        data.extend_from_slice(&textified_callees);
        data.extend_from_slice(&strings.into_bytes());

        log::debug!(
            "finalized debug info: {} filenames, {} file regions, {} bytes \
             (source locations {}, lexical {}, textified callees {}, strings {})",
            filenames.len(),
            files.len(),
            data.len(),
            lexical_data_offset,
            textified_callee_offset - lexical_data_offset,
            string_table_offset - textified_callee_offset,
            data.len() as u32 - string_table_offset,
        );

        DebugInfo::new(
            filenames,
            files,
            lexical_data_offset,
            textified_callee_offset,
            string_table_offset,
            data,
        )
    }
}
