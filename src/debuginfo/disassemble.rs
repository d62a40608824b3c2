//! A human readable dump of every section, for tooling and diagnostics.

use std::fmt::{self, Write};

use super::DebugInfo;
use crate::leb128::Reader;
use crate::strings::decode_string;

impl DebugInfo {
    /// Writes a textual dump of all debug info sections to `out`.
    pub fn disassemble<W: Write>(&self, out: &mut W) -> fmt::Result {
        self.disassemble_filenames(out)?;
        self.disassemble_files_and_offsets(out)?;
        self.disassemble_lexical_data(out)?;
        self.disassemble_textified_callees(out)?;
        self.disassemble_string_table(out)
    }

    fn disassemble_filenames<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Debug filename table:")?;
        for (id, filename) in self.filenames().enumerate() {
            writeln!(out, "  {}: {}", id, filename)?;
        }
        writeln!(out)
    }

    fn disassemble_files_and_offsets<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Debug file table:")?;
        for region in &self.files {
            write!(
                out,
                "  source table offset {:#06x}: filename id {}",
                region.from_address, region.filename_id
            )?;
            if let Some(url) = region.source_mapping_url_id {
                write!(out, ", source mapping url id {}", url)?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;

        writeln!(out, "Debug source table:")?;
        let mut end = 0;
        for function in self.functions() {
            writeln!(out, "  {:#06x}  function idx {}", end, function.function_index())?;
            let mut function = function;
            for location in function.by_ref() {
                write!(
                    out,
                    "    bc {}: line {} col {}",
                    location.address, location.line, location.column
                )?;
                if location.statement != 0 {
                    write!(out, " stmt {}", location.statement)?;
                }
                writeln!(out, " file {}", location.filename_id)?;
            }
            match function.end_offset() {
                Some(offset) => end = offset,
                None => break,
            }
        }
        writeln!(out, "  {:#06x}  end of debug source table", end)?;
        writeln!(out)
    }

    fn disassemble_lexical_data<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Debug lexical table:")?;
        let data = self.lexical_data();
        let mut offset = 0;
        while offset < data.len() {
            let (parent, count, mut reader) = match self.lexical_entry(offset as u32) {
                Some(entry) => entry,
                None => break,
            };
            write!(out, "  {:#06x}  lexical parent: ", offset)?;
            match parent {
                Some(parent) => write!(out, "{}", parent)?,
                None => write!(out, "none")?,
            }
            writeln!(out, ", variable count: {}", count)?;
            for _ in 0..count {
                match reader.read_u32() {
                    Some(string_offset) => self.write_string(out, "    ", string_offset)?,
                    None => break,
                }
            }
            offset = reader.pos();
        }
        writeln!(out, "  {:#06x}  end of debug lexical table", offset)?;
        writeln!(out)
    }

    fn disassemble_textified_callees<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Debug textified callee table:")?;
        let data = self.textified_callee_data();
        let mut offset = 0;
        while offset < data.len() {
            let (entries, end) = match self.textified_callees(offset as u32) {
                Some(table) => table,
                None => break,
            };
            writeln!(out, "  {:#06x}  entries: {}", offset, entries.len())?;
            for (address, string_offset) in entries {
                write!(out, "    bc {}: ", address)?;
                self.write_string(out, "", string_offset)?;
            }
            offset = end;
        }
        writeln!(out, "  {:#06x}  end of textified callees table", offset)?;
        writeln!(out)
    }

    fn disassemble_string_table<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "Debug string table:")?;
        let data = self.string_table_data();
        let mut reader = Reader::new(data, 0);
        while !reader.is_empty() {
            let offset = reader.pos();
            let len = match reader.read_uleb128() {
                Some(len) => len as usize,
                None => break,
            };
            if reader.read_bytes(len).is_none() {
                break;
            }
            write!(out, "  {:#06x}  ", offset)?;
            self.write_string(out, "", offset as u32)?;
        }
        writeln!(out, "  {:#06x}  end of debug string table", reader.pos())?;
        writeln!(out)
    }

    fn write_string<W: Write>(&self, out: &mut W, indent: &str, string_offset: u32) -> fmt::Result {
        match decode_string(self.string_table_data(), string_offset) {
            Some(s) => writeln!(out, "{}{:?}", indent, s),
            None => writeln!(out, "{}<invalid string at {:#06x}>", indent, string_offset),
        }
    }
}
