use std::io::Write;

use super::DebugInfo;
use crate::error::Error;
use crate::format::raw;
use crate::strings::{ConsecutiveStrings, StringTableEntry};
use crate::types::DebugFileRegion;

impl DebugInfo {
    /// Serializes the debug info into the fixed section layout described in [`raw`].
    ///
    /// Returns the number of bytes written.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        let mut writer = WriteWrapper::new(writer);

        let storage = self.filename_storage();
        let header = raw::Header {
            filename_count: self.filename_count(),
            filename_storage_size: storage.len() as u32,
            file_region_count: self.files.len() as u32,
            lexical_data_offset: self.lexical_data_offset,
            textified_callee_offset: self.textified_callee_offset,
            string_table_offset: self.string_table_offset,
            debug_data_size: self.data.len() as u32,
        };
        for value in &[
            header.filename_count,
            header.filename_storage_size,
            header.file_region_count,
            header.lexical_data_offset,
            header.textified_callee_offset,
            header.string_table_offset,
            header.debug_data_size,
        ] {
            writer.write_u32(*value)?;
        }

        for entry in self.filename_table() {
            writer.write_u32(entry.offset)?;
            writer.write_u32(entry.length)?;
        }
        writer.write(storage)?;
        writer.align()?;

        for region in &self.files {
            writer.write_u32(region.from_address)?;
            writer.write_u32(region.filename_id)?;
            writer.write_u32(
                region
                    .source_mapping_url_id
                    .unwrap_or(raw::NO_SOURCE_MAPPING_URL),
            )?;
        }

        writer.write(&self.data)?;
        Ok(writer.position)
    }

    /// Parses a section written by [`serialize`](Self::serialize).
    ///
    /// The buffer must hold exactly one section.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let mut reader = LeReader { data, pos: 0 };

        if data.len() < raw::HEADER_SIZE {
            return Err(Error::HeaderTooSmall);
        }
        let header = raw::Header {
            filename_count: reader.read_u32(),
            filename_storage_size: reader.read_u32(),
            file_region_count: reader.read_u32(),
            lexical_data_offset: reader.read_u32(),
            textified_callee_offset: reader.read_u32(),
            string_table_offset: reader.read_u32(),
            debug_data_size: reader.read_u32(),
        };

        let storage_size = header.filename_storage_size as usize;
        let expected = raw::HEADER_SIZE
            + header.filename_count as usize * raw::FILENAME_ENTRY_SIZE
            + storage_size
            + raw::align_to_four(storage_size)
            + header.file_region_count as usize * raw::FILE_REGION_SIZE
            + header.debug_data_size as usize;
        if expected != data.len() {
            return Err(Error::BadFormatLength {
                expected,
                found: data.len(),
            });
        }

        if !(header.lexical_data_offset <= header.textified_callee_offset
            && header.textified_callee_offset <= header.string_table_offset
            && header.string_table_offset <= header.debug_data_size)
        {
            return Err(Error::InvalidSectionOffsets);
        }

        let table: Vec<_> = (0..header.filename_count)
            .map(|_| StringTableEntry {
                offset: reader.read_u32(),
                length: reader.read_u32(),
            })
            .collect();
        let storage = std::str::from_utf8(reader.read_bytes(storage_size))
            .map_err(Error::InvalidFilenameData)?;
        reader.read_bytes(raw::align_to_four(storage_size));
        for (id, entry) in table.iter().enumerate() {
            let start = entry.offset as usize;
            let end = start + entry.length as usize;
            if end > storage.len() || !storage.is_char_boundary(start) || !storage.is_char_boundary(end) {
                return Err(Error::InvalidFilenameEntry(id as u32));
            }
        }

        let mut files = Vec::with_capacity(header.file_region_count as usize);
        for idx in 0..header.file_region_count {
            let region = raw::FileRegion {
                from_address: reader.read_u32(),
                filename_id: reader.read_u32(),
                source_mapping_url_id: reader.read_u32(),
            };
            if region.filename_id >= header.filename_count {
                return Err(Error::InvalidFileRegion(idx));
            }
            files.push(DebugFileRegion {
                from_address: region.from_address,
                filename_id: region.filename_id,
                source_mapping_url_id: Some(region.source_mapping_url_id)
                    .filter(|id| *id != raw::NO_SOURCE_MAPPING_URL),
            });
        }

        let debug_data = reader.read_bytes(header.debug_data_size as usize).to_vec();

        log::debug!(
            "parsed debug info: {} filenames, {} file regions, {} bytes of data",
            header.filename_count,
            header.file_region_count,
            header.debug_data_size
        );

        Ok(Self::new(
            ConsecutiveStrings::from_parts(table, storage.to_owned()),
            files,
            header.lexical_data_offset,
            header.textified_callee_offset,
            header.string_table_offset,
            debug_data,
        ))
    }
}

struct WriteWrapper<W> {
    writer: W,
    position: usize,
}

impl<W: Write> WriteWrapper<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.writer.write_all(data)?;
        self.position += data.len();
        Ok(data.len())
    }

    fn write_u32(&mut self, value: u32) -> std::io::Result<usize> {
        self.write(&value.to_le_bytes())
    }

    fn align(&mut self) -> std::io::Result<usize> {
        let buf = &[0u8; 3];
        let len = raw::align_to_four(self.position);
        self.write(&buf[0..len])
    }
}

/// Reads little-endian values from a buffer whose size has already been validated.
struct LeReader<'data> {
    data: &'data [u8],
    pos: usize,
}

impl<'data> LeReader<'data> {
    fn read_bytes(&mut self, len: usize) -> &'data [u8] {
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        bytes
    }

    fn read_u32(&mut self) -> u32 {
        let mut buf = [0; 4];
        buf.copy_from_slice(self.read_bytes(4));
        u32::from_le_bytes(buf)
    }
}
